//! On-disk fixtures for tests.
//!
//! Indexes produced here are structurally valid but carry zeroed checksum
//! trailers, and the `.pack` files hold only a header and a zeroed trailer.
//! Nothing in odbstat verifies checksums or reads pack contents, so they are
//! indistinguishable from real packs for our purposes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use odbstat_types::{ObjectId, RAW_LEN};

use crate::index::INDEX_V2_MAGIC;

fn fan_out(sorted: &[ObjectId]) -> Vec<u8> {
    let mut counts = [0u32; 256];
    for id in sorted {
        counts[usize::from(id.first_byte())] += 1;
    }
    let mut buf = Vec::with_capacity(256 * 4);
    let mut running = 0u32;
    for count in counts {
        running += count;
        buf.extend_from_slice(&running.to_be_bytes());
    }
    buf
}

fn sorted(ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

/// Encode a version 2 index listing `ids`.
pub fn index_v2_bytes(ids: &[ObjectId]) -> Vec<u8> {
    let ids = sorted(ids);
    let mut buf = Vec::new();
    buf.extend_from_slice(&INDEX_V2_MAGIC);
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&fan_out(&ids));
    for id in &ids {
        buf.extend_from_slice(id.as_bytes());
    }
    for _ in &ids {
        buf.extend_from_slice(&0u32.to_be_bytes());
    }
    for (i, _) in ids.iter().enumerate() {
        let offset = 12 + 32 * i as u32;
        buf.extend_from_slice(&offset.to_be_bytes());
    }
    buf.extend_from_slice(&[0u8; 2 * RAW_LEN]);
    buf
}

/// Encode a version 1 index listing `ids`.
pub fn index_v1_bytes(ids: &[ObjectId]) -> Vec<u8> {
    let ids = sorted(ids);
    let mut buf = fan_out(&ids);
    for (i, id) in ids.iter().enumerate() {
        let offset = 12 + 32 * i as u32;
        buf.extend_from_slice(&offset.to_be_bytes());
        buf.extend_from_slice(id.as_bytes());
    }
    buf.extend_from_slice(&[0u8; 2 * RAW_LEN]);
    buf
}

/// Minimal pack body: `PACK`, version 2, object count, zeroed trailer.
pub fn pack_bytes(object_count: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PACK");
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&object_count.to_be_bytes());
    buf.extend_from_slice(&[0u8; RAW_LEN]);
    buf
}

/// Paths of a fixture pack written by [`write_pack`].
#[derive(Clone, Debug)]
pub struct FixturePack {
    pub pack_path: PathBuf,
    pub index_path: PathBuf,
}

/// Write `pack-<name>.pack` and `pack-<name>.idx` into `<objects_dir>/pack`.
pub fn write_pack(objects_dir: &Path, name: &str, ids: &[ObjectId]) -> io::Result<FixturePack> {
    let pack_dir = objects_dir.join("pack");
    fs::create_dir_all(&pack_dir)?;
    let pack_path = pack_dir.join(format!("pack-{name}.pack"));
    let index_path = pack_dir.join(format!("pack-{name}.idx"));
    fs::write(&pack_path, pack_bytes(sorted(ids).len() as u32))?;
    fs::write(&index_path, index_v2_bytes(ids))?;
    Ok(FixturePack {
        pack_path,
        index_path,
    })
}
