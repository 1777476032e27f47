use std::io::{self, Write};

use serde::Serialize;

use crate::disk::kilobytes;

/// Statistics gathered by one scan of an object directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Number of loose objects.
    pub count: u64,
    /// On-disk bytes used by loose objects.
    pub size_bytes: u64,
    /// Pack and garbage statistics, present only for verbose scans.
    #[serde(flatten)]
    pub details: Option<VerboseDetails>,
}

/// The parts of a [`Report`] that only a verbose scan computes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerboseDetails {
    /// Objects stored in local packs.
    pub in_pack: u64,
    /// Number of local packs whose index opened.
    pub packs: u64,
    /// Combined pack and index bytes of those packs.
    pub size_pack_bytes: u64,
    /// Loose objects that also exist in a pack.
    pub prune_packable: u64,
    /// Malformed loose entries plus garbage reported by the pack layer.
    pub garbage: u64,
}

impl Report {
    pub fn is_verbose(&self) -> bool {
        self.details.is_some()
    }

    /// Labelled values in output order, sizes in kilobytes.
    pub fn fields(&self) -> Vec<(&'static str, u64)> {
        let mut fields = vec![("count", self.count), ("size", kilobytes(self.size_bytes))];
        if let Some(d) = &self.details {
            fields.extend([
                ("in-pack", d.in_pack),
                ("packs", d.packs),
                ("size-pack", kilobytes(d.size_pack_bytes)),
                ("prune-packable", d.prune_packable),
                ("garbage", d.garbage),
            ]);
        }
        fields
    }

    /// Write the plain-text report.
    ///
    /// Non-verbose: `N objects, K kilobytes`. Verbose: one `label: value`
    /// line per field.
    pub fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_verbose() {
            return writeln!(
                out,
                "{} objects, {} kilobytes",
                self.count,
                kilobytes(self.size_bytes)
            );
        }
        for (label, value) in self.fields() {
            writeln!(out, "{label}: {value}")?;
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
