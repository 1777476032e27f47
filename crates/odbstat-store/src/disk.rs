use std::fs::Metadata;

/// Bytes a file occupies on disk.
///
/// On Unix this is the allocated block count times 512, so a 50-byte file
/// on a 4 KiB-block filesystem counts as 4096 bytes. Elsewhere it falls
/// back to the apparent length.
#[cfg(unix)]
pub fn on_disk_bytes(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.blocks() * 512
}

#[cfg(not(unix))]
pub fn on_disk_bytes(meta: &Metadata) -> u64 {
    meta.len()
}

/// Whole kilobytes in `bytes`, rounded down.
pub fn kilobytes(bytes: u64) -> u64 {
    bytes / 1024
}
