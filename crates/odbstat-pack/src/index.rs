use std::cmp::Ordering;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;
use odbstat_types::{ObjectId, RAW_LEN};

use crate::error::{PackError, PackResult};

/// Magic bytes opening a version 2 (or later) pack index.
pub const INDEX_V2_MAGIC: [u8; 4] = [0xff, b't', b'O', b'c'];

const FAN_OUT_ENTRIES: usize = 256;
const FAN_OUT_LEN: usize = FAN_OUT_ENTRIES * 4;
const V2_HEADER_LEN: usize = 8;
/// Pack checksum followed by index checksum.
const TRAILER_LEN: usize = 2 * RAW_LEN;
const MIN_INDEX_LEN: usize = FAN_OUT_LEN + TRAILER_LEN;

enum IndexData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for IndexData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => &map[..],
            Self::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// Read-only view of a git pack index (`.idx`), version 1 or 2.
///
/// Layout (v2):
/// - `\xfftOc` magic and a 4-byte version
/// - fan-out table: 256 big-endian counts of objects whose first byte <= slot
/// - sorted 20-byte object ids
/// - CRC32 table, 4-byte offset table, optional 8-byte large offsets
/// - pack checksum and index checksum
///
/// Version 1 has no header and stores `(offset, id)` records after the
/// fan-out table.
pub struct PackIndex {
    data: IndexData,
    version: u32,
    object_count: u32,
    ids_at: usize,
    stride: usize,
}

impl PackIndex {
    /// Memory-map and validate an index file.
    pub fn open(path: &Path) -> PackResult<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < MIN_INDEX_LEN as u64 {
            return Err(PackError::IndexTooSmall(len));
        }
        // SAFETY: the map is read-only and the store is not modified while
        // the tool runs; a concurrent truncation is outside what we support.
        let map = unsafe { Mmap::map(&file)? };
        Self::parse(IndexData::Mapped(map))
    }

    /// Validate an index held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> PackResult<Self> {
        Self::parse(IndexData::Owned(bytes))
    }

    fn parse(data: IndexData) -> PackResult<Self> {
        let len = data.len() as u64;
        if data.len() < MIN_INDEX_LEN {
            return Err(PackError::IndexTooSmall(len));
        }

        let (version, fan_out_at) = if data[..4] == INDEX_V2_MAGIC {
            let version = read_u32(&data, 4);
            if version != 2 {
                return Err(PackError::UnsupportedVersion(version));
            }
            (2, V2_HEADER_LEN)
        } else {
            (1, 0)
        };

        let mut previous = 0u32;
        for slot in 0..FAN_OUT_ENTRIES {
            let count = read_u32(&data, fan_out_at + slot * 4);
            if count < previous {
                return Err(PackError::NonMonotonicFanOut(slot));
            }
            previous = count;
        }
        let object_count = previous;
        let n = u64::from(object_count);

        let wrong_size = || PackError::WrongIndexSize {
            version,
            objects: object_count,
            actual: len,
        };

        let (ids_at, stride) = if version == 1 {
            let expected = (FAN_OUT_LEN + TRAILER_LEN) as u64 + n * (RAW_LEN as u64 + 4);
            if len != expected {
                return Err(wrong_size());
            }
            (FAN_OUT_LEN + 4, RAW_LEN + 4)
        } else {
            let min = (V2_HEADER_LEN + FAN_OUT_LEN + TRAILER_LEN) as u64
                + n * (RAW_LEN as u64 + 4 + 4);
            let max = min + n.saturating_sub(1) * 8;
            if len < min || len > max {
                return Err(wrong_size());
            }
            (V2_HEADER_LEN + FAN_OUT_LEN, RAW_LEN)
        };

        Ok(Self {
            data,
            version,
            object_count,
            ids_at,
            stride,
        })
    }

    /// Index format version (1 or 2).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of objects in the pack.
    pub fn object_count(&self) -> u32 {
        self.object_count
    }

    /// Size of the index file in bytes.
    pub fn len_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// The `i`-th object id in sort order.
    pub fn object_id(&self, i: u32) -> Option<ObjectId> {
        if i >= self.object_count {
            return None;
        }
        let mut raw = [0u8; RAW_LEN];
        raw.copy_from_slice(self.raw_id(i as usize));
        Some(ObjectId::from_raw(raw))
    }

    /// Check if an object exists in the pack.
    pub fn contains(&self, id: &ObjectId) -> bool {
        let first = usize::from(id.first_byte());
        let mut lo = if first == 0 {
            0
        } else {
            self.fan_out(first - 1) as usize
        };
        let mut hi = self.fan_out(first) as usize;
        let needle = id.as_bytes().as_slice();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.raw_id(mid).cmp(needle) {
                Ordering::Equal => return true,
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
            }
        }
        false
    }

    fn fan_out(&self, slot: usize) -> u32 {
        let at = if self.version == 2 { V2_HEADER_LEN } else { 0 };
        read_u32(&self.data, at + slot * 4)
    }

    fn raw_id(&self, i: usize) -> &[u8] {
        let at = self.ids_at + i * self.stride;
        &self.data[at..at + RAW_LEN]
    }
}

impl std::fmt::Debug for PackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackIndex")
            .field("version", &self.version)
            .field("object_count", &self.object_count)
            .field("len_bytes", &self.len_bytes())
            .finish()
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[at..at + 4]);
    u32::from_be_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{index_v1_bytes, index_v2_bytes};

    fn make_ids(n: usize) -> Vec<ObjectId> {
        (0..n)
            .map(|i| {
                let mut raw = [0u8; RAW_LEN];
                raw[0] = (i * 37 % 256) as u8;
                raw[1] = (i / 256) as u8;
                raw[19] = i as u8;
                ObjectId::from_raw(raw)
            })
            .collect()
    }

    #[test]
    fn empty_v2_index() {
        let idx = PackIndex::from_bytes(index_v2_bytes(&[])).unwrap();
        assert_eq!(idx.version(), 2);
        assert_eq!(idx.object_count(), 0);
        assert!(!idx.contains(&ObjectId::null()));
        assert!(idx.object_id(0).is_none());
    }

    #[test]
    fn v2_lookup_finds_every_member() {
        let ids = make_ids(40);
        let idx = PackIndex::from_bytes(index_v2_bytes(&ids)).unwrap();
        assert_eq!(idx.object_count(), 40);
        for id in &ids {
            assert!(idx.contains(id), "missing {id}");
        }
        let mut raw = [0xeeu8; RAW_LEN];
        raw[0] = ids[3].first_byte();
        assert!(!idx.contains(&ObjectId::from_raw(raw)));
    }

    #[test]
    fn v2_ids_are_sorted() {
        let ids = make_ids(10);
        let idx = PackIndex::from_bytes(index_v2_bytes(&ids)).unwrap();
        let listed: Vec<_> = (0..10).map(|i| idx.object_id(i).unwrap()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }

    #[test]
    fn v1_lookup() {
        let ids = make_ids(12);
        let idx = PackIndex::from_bytes(index_v1_bytes(&ids)).unwrap();
        assert_eq!(idx.version(), 1);
        assert_eq!(idx.object_count(), 12);
        assert!(ids.iter().all(|id| idx.contains(id)));
        assert!(!idx.contains(&ObjectId::from_raw([0xff; RAW_LEN])));
    }

    #[test]
    fn too_small() {
        let err = PackIndex::from_bytes(vec![0u8; 100]).unwrap_err();
        assert!(matches!(err, PackError::IndexTooSmall(100)));
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = index_v2_bytes(&make_ids(2));
        bytes[4..8].copy_from_slice(&3u32.to_be_bytes());
        let err = PackIndex::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, PackError::UnsupportedVersion(3)));
    }

    #[test]
    fn non_monotonic_fan_out() {
        let mut bytes = index_v2_bytes(&make_ids(3));
        // slot 0x80 claims more objects than every later slot
        let at = V2_HEADER_LEN + 0x80 * 4;
        bytes[at..at + 4].copy_from_slice(&1000u32.to_be_bytes());
        let err = PackIndex::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, PackError::NonMonotonicFanOut(_)));
    }

    #[test]
    fn truncated_v2_has_wrong_size() {
        let mut bytes = index_v2_bytes(&make_ids(5));
        bytes.truncate(bytes.len() - 1);
        let err = PackIndex::from_bytes(bytes).unwrap_err();
        assert!(matches!(
            err,
            PackError::WrongIndexSize {
                version: 2,
                objects: 5,
                ..
            }
        ));
    }

    #[test]
    fn v2_accepts_large_offset_table() {
        let mut bytes = index_v2_bytes(&make_ids(3));
        let trailer = bytes.split_off(bytes.len() - TRAILER_LEN);
        bytes.extend_from_slice(&[0u8; 16]);
        bytes.extend_from_slice(&trailer);
        assert!(PackIndex::from_bytes(bytes).is_ok());
    }

    #[test]
    fn v1_with_extra_bytes_is_rejected() {
        let mut bytes = index_v1_bytes(&make_ids(2));
        bytes.push(0);
        let err = PackIndex::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, PackError::WrongIndexSize { version: 1, .. }));
    }

    #[test]
    fn open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pack-test.idx");
        let ids = make_ids(4);
        std::fs::write(&path, index_v2_bytes(&ids)).unwrap();

        let idx = PackIndex::open(&path).unwrap();
        assert_eq!(idx.object_count(), 4);
        assert_eq!(idx.len_bytes(), std::fs::metadata(&path).unwrap().len());
        assert!(idx.contains(&ids[2]));
    }

    #[test]
    fn open_empty_file_is_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.idx");
        std::fs::write(&path, b"").unwrap();
        let err = PackIndex::open(&path).unwrap_err();
        assert!(matches!(err, PackError::IndexTooSmall(0)));
    }
}
