//! Loose-object statistics for git-style object directories.
//!
//! The object directory holds loose objects in 256 fan-out buckets
//! (`00` .. `ff`), each file named by the remaining 38 hex digits of its id,
//! next to a `pack/` directory of packed objects. This crate scans the
//! buckets, classifies every entry, and cross-checks loose objects against
//! the packs.
//!
//! # Rules
//!
//! 1. The store is only read, never written or locked.
//! 2. A missing bucket is normal and contributes nothing.
//! 3. Entries that are not `[0-9a-f]{38}` regular files are garbage. Garbage
//!    is reported and counted only by verbose scans.
//! 4. Sizes are allocated bytes on disk, not apparent lengths.
//! 5. Per-entry problems never abort a scan; only an
//!    [`StoreError::InternalInvariant`] does.

pub mod disk;
pub mod error;
pub mod location;
pub mod report;
pub mod scanner;

pub use disk::{kilobytes, on_disk_bytes};
pub use error::{StoreError, StoreResult};
pub use location::ObjectDirLocator;
pub use report::{Report, VerboseDetails};
pub use scanner::{object_id_from_parts, LooseObjectScanner, ScanAccumulator};
