use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use odbstat_types::ObjectId;
use tracing::debug;

use crate::garbage::{Garbage, GarbageKind, GarbageReporter};
use crate::pack::{Pack, PackSummary};
use crate::traits::PackDatabase;

const SEEN_PACK: u8 = 1;
const SEEN_INDEX: u8 = 2;

/// Manages the pack files of a single object directory.
#[derive(Debug)]
pub struct PackManager {
    pack_dir: PathBuf,
    packs: Vec<Pack>,
    prepared: bool,
}

impl PackManager {
    /// Packs under `<objects_dir>/pack`. Nothing is read until first use.
    pub fn new(objects_dir: &Path) -> Self {
        Self {
            pack_dir: objects_dir.join("pack"),
            packs: Vec::new(),
            prepared: false,
        }
    }

    /// Create an empty, already prepared manager (for testing).
    pub fn empty() -> Self {
        Self::from_packs(Vec::new())
    }

    /// Create a manager over an explicit set of packs.
    pub fn from_packs(packs: Vec<Pack>) -> Self {
        Self {
            pack_dir: PathBuf::new(),
            packs,
            prepared: true,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Number of registered packs.
    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    fn load(&mut self, reporter: &mut dyn GarbageReporter) {
        let entries = match std::fs::read_dir(&self.pack_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("no packs under {:?}: {}", self.pack_dir, e);
                return;
            }
        };

        // Pack-family files grouped by base name, remembering which of
        // `.pack` / `.idx` were seen for the group.
        let mut families: BTreeMap<PathBuf, (u8, Vec<PathBuf>)> = BTreeMap::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("unreadable entry in {:?}: {}", self.pack_dir, e);
                    continue;
                }
            };
            let path = entry.path();
            let extension = path.extension().and_then(|e| e.to_str());

            let bit = match extension {
                Some("pack") => SEEN_PACK,
                Some("idx") => SEEN_INDEX,
                Some("keep" | "bitmap") => 0,
                _ => {
                    reporter.report(&Garbage::unrecognized(path));
                    continue;
                }
            };

            if bit == SEEN_INDEX {
                if let Some(pack) = register(&path) {
                    self.packs.push(pack);
                }
            }

            let family = families.entry(path.with_extension("")).or_default();
            family.0 |= bit;
            family.1.push(path);
        }

        for (seen, members) in families.into_values() {
            let kind = match seen {
                0 => GarbageKind::NoCorrespondingIndexNorPack,
                SEEN_PACK => GarbageKind::NoCorrespondingIndex,
                SEEN_INDEX => GarbageKind::NoCorrespondingPack,
                _ => continue,
            };
            for path in members {
                reporter.report(&Garbage::new(path, kind.clone()));
            }
        }

        self.packs.sort_by(|a, b| a.pack_path().cmp(b.pack_path()));
        debug!("loaded {} packs from {:?}", self.packs.len(), self.pack_dir);
    }
}

/// Register the pack belonging to `index_path` if its `.pack` exists.
/// Symlinked packs are followed.
fn register(index_path: &Path) -> Option<Pack> {
    let pack_path = index_path.with_extension("pack");
    match std::fs::metadata(&pack_path) {
        Ok(meta) if meta.is_file() => Some(Pack::new(
            pack_path,
            index_path.to_path_buf(),
            meta.len(),
            true,
        )),
        _ => None,
    }
}

impl PackDatabase for PackManager {
    fn prepare(&mut self, reporter: &mut dyn GarbageReporter) {
        if self.prepared {
            return;
        }
        self.prepared = true;
        self.load(reporter);
    }

    fn contains_object(&mut self, id: &ObjectId, reporter: &mut dyn GarbageReporter) -> bool {
        self.prepare(reporter);
        self.packs.iter().any(|pack| pack.contains(id, reporter))
    }

    fn summaries(&mut self, reporter: &mut dyn GarbageReporter) -> Vec<PackSummary> {
        self.prepare(reporter);
        self.packs
            .iter()
            .filter_map(|pack| pack.summary(reporter))
            .collect()
    }
}
