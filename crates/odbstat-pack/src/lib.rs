//! Packed-object access for odbstat.
//!
//! Discovers the packs of an object directory, validates and memory-maps
//! their git-format indexes on demand, and answers membership queries.
//!
//! # Architecture
//!
//! - **PackIndex**: read-only view of a `.idx` file (format v1 or v2)
//! - **Pack**: one `.pack`/`.idx` pair whose index opens lazily
//! - **PackManager**: all packs under `<objects>/pack`, loaded at most once
//! - **PackDatabase**: the trait the loose-object scanner talks to
//! - **GarbageReporter**: sink for malformed pack-directory entries and
//!   unreadable indexes, supplied by the caller per call

pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod garbage;
pub mod index;
pub mod manager;
pub mod pack;
pub mod traits;

pub use error::{PackError, PackResult};
pub use garbage::{Garbage, GarbageCounter, GarbageKind, GarbageReporter, IgnoreGarbage};
pub use index::PackIndex;
pub use manager::PackManager;
pub use pack::{Pack, PackSummary};
pub use traits::PackDatabase;
