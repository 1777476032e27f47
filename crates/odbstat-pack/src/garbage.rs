use std::fmt;
use std::path::{Path, PathBuf};

/// Why a filesystem entry under the object store was flagged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GarbageKind {
    /// Entry that does not follow any naming convention of the store.
    Unrecognized,
    /// Pack-family file whose `.idx` sibling is missing.
    NoCorrespondingIndex,
    /// Pack-family file whose `.pack` sibling is missing.
    NoCorrespondingPack,
    /// Pack-family file (`.keep`, `.bitmap`) with neither sibling present.
    NoCorrespondingIndexNorPack,
    /// Index file that exists but could not be opened or validated.
    CorruptIndex(String),
}

impl GarbageKind {
    pub fn description(&self) -> &str {
        match self {
            Self::Unrecognized => "garbage found",
            Self::NoCorrespondingIndex => "no corresponding .idx",
            Self::NoCorrespondingPack => "no corresponding .pack",
            Self::NoCorrespondingIndexNorPack => "no corresponding .idx nor .pack",
            Self::CorruptIndex(_) => "corrupt pack index",
        }
    }
}

/// A single piece of garbage found in the object store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Garbage {
    pub path: PathBuf,
    pub kind: GarbageKind,
}

impl Garbage {
    pub fn new(path: impl Into<PathBuf>, kind: GarbageKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Shorthand for an [`GarbageKind::Unrecognized`] entry.
    pub fn unrecognized(path: impl Into<PathBuf>) -> Self {
        Self::new(path, GarbageKind::Unrecognized)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Garbage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GarbageKind::CorruptIndex(reason) => {
                write!(f, "{}: {} ({reason})", self.kind.description(), self.path.display())
            }
            kind => write!(f, "{}: {}", kind.description(), self.path.display()),
        }
    }
}

/// Sink for garbage diagnostics.
///
/// Reporters are handed to each call that may discover garbage, for the
/// duration of that call only. Loose-object scanning and pack loading
/// report through the same sink.
pub trait GarbageReporter {
    fn report(&mut self, garbage: &Garbage);
}

impl<F> GarbageReporter for F
where
    F: FnMut(&Garbage),
{
    fn report(&mut self, garbage: &Garbage) {
        self(garbage)
    }
}

/// Reporter that drops every diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreGarbage;

impl GarbageReporter for IgnoreGarbage {
    fn report(&mut self, _garbage: &Garbage) {}
}

/// Forwards diagnostics to an inner reporter and counts them.
pub struct GarbageCounter<'a> {
    inner: &'a mut dyn GarbageReporter,
    count: u64,
}

impl<'a> GarbageCounter<'a> {
    pub fn new(inner: &'a mut dyn GarbageReporter) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl GarbageReporter for GarbageCounter<'_> {
    fn report(&mut self, garbage: &Garbage) {
        self.count += 1;
        self.inner.report(garbage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_display() {
        let g = Garbage::unrecognized("objects/ab/xyz");
        assert_eq!(g.to_string(), "garbage found: objects/ab/xyz");
    }

    #[test]
    fn missing_sibling_display() {
        let g = Garbage::new("pack/pack-1.pack", GarbageKind::NoCorrespondingIndex);
        assert_eq!(g.to_string(), "no corresponding .idx: pack/pack-1.pack");
        let g = Garbage::new("pack/pack-1.keep", GarbageKind::NoCorrespondingIndexNorPack);
        assert_eq!(g.to_string(), "no corresponding .idx nor .pack: pack/pack-1.keep");
    }

    #[test]
    fn corrupt_index_display_carries_reason() {
        let g = Garbage::new("pack/x.idx", GarbageKind::CorruptIndex("too small".into()));
        assert_eq!(g.to_string(), "corrupt pack index: pack/x.idx (too small)");
    }

    #[test]
    fn closures_are_reporters() {
        let mut seen = Vec::new();
        {
            let mut sink = |g: &Garbage| seen.push(g.clone());
            sink.report(&Garbage::unrecognized("a"));
            sink.report(&Garbage::unrecognized("b"));
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].path(), Path::new("b"));
    }

    #[test]
    fn counter_counts_and_forwards() {
        let mut seen = Vec::new();
        let mut sink = |g: &Garbage| seen.push(g.clone());
        let mut counter = GarbageCounter::new(&mut sink);
        counter.report(&Garbage::unrecognized("a"));
        counter.report(&Garbage::new("b", GarbageKind::NoCorrespondingPack));
        assert_eq!(counter.count(), 2);
        drop(counter);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn ignore_garbage_is_silent() {
        let mut ignore = IgnoreGarbage;
        let mut counter = GarbageCounter::new(&mut ignore);
        counter.report(&Garbage::unrecognized("a"));
        assert_eq!(counter.count(), 1);
    }
}
