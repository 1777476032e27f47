use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use odbstat_types::ObjectId;
use serde::Serialize;

use crate::garbage::{Garbage, GarbageKind, GarbageReporter};
use crate::index::PackIndex;

/// Per-pack statistics, available once the pack's index has opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    pub pack_path: PathBuf,
    pub object_count: u32,
    pub pack_size: u64,
    pub index_size: u64,
    /// Only local packs count toward repository totals.
    pub local: bool,
}

impl PackSummary {
    /// Combined size of the pack and its index.
    pub fn total_size(&self) -> u64 {
        self.pack_size + self.index_size
    }
}

/// A registered pack whose index is opened on first use.
#[derive(Debug)]
pub struct Pack {
    pack_path: PathBuf,
    index_path: PathBuf,
    pack_size: u64,
    local: bool,
    index: OnceCell<Option<PackIndex>>,
}

impl Pack {
    pub fn new(pack_path: PathBuf, index_path: PathBuf, pack_size: u64, local: bool) -> Self {
        Self {
            pack_path,
            index_path,
            pack_size,
            local,
            index: OnceCell::new(),
        }
    }

    pub fn pack_path(&self) -> &Path {
        &self.pack_path
    }

    /// Open the index if not already attempted.
    ///
    /// A failure is reported once and remembered; later calls return `None`
    /// without touching the filesystem again.
    pub fn index(&self, reporter: &mut dyn GarbageReporter) -> Option<&PackIndex> {
        self.index
            .get_or_init(|| match PackIndex::open(&self.index_path) {
                Ok(index) => Some(index),
                Err(e) => {
                    tracing::debug!("skipping pack {:?}: {}", self.pack_path, e);
                    reporter.report(&Garbage::new(
                        self.index_path.clone(),
                        GarbageKind::CorruptIndex(e.to_string()),
                    ));
                    None
                }
            })
            .as_ref()
    }

    pub fn contains(&self, id: &ObjectId, reporter: &mut dyn GarbageReporter) -> bool {
        self.index(reporter).is_some_and(|index| index.contains(id))
    }

    /// Summary of this pack, or `None` if its index cannot be opened.
    pub fn summary(&self, reporter: &mut dyn GarbageReporter) -> Option<PackSummary> {
        let index = self.index(reporter)?;
        Some(PackSummary {
            pack_path: self.pack_path.clone(),
            object_count: index.object_count(),
            pack_size: self.pack_size,
            index_size: index.len_bytes(),
            local: self.local,
        })
    }
}
