//! Foundation types for odbstat.
//!
//! Every other odbstat crate depends on `odbstat-types`.
//!
//! # Key Types
//!
//! - **ObjectId**: 20-byte object identifier, written as 40 lowercase hex digits
//! - **TypeError**: parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{is_loose_suffix, is_lower_hex, ObjectId, HEX_LEN, LOOSE_SUFFIX_LEN, RAW_LEN};
