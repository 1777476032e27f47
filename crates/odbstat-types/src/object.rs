use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a raw object id in bytes.
pub const RAW_LEN: usize = 20;

/// Length of the canonical hex form of an object id.
pub const HEX_LEN: usize = RAW_LEN * 2;

/// Length of a loose-object file name inside its two-digit fan-out bucket.
pub const LOOSE_SUFFIX_LEN: usize = HEX_LEN - 2;

/// Identifier of an object in the object database.
///
/// The canonical text form is 40 lowercase hex digits. Loose objects are
/// stored at `<objects>/<first 2 digits>/<remaining 38 digits>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; RAW_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from raw bytes.
    pub const fn from_raw(raw: [u8; RAW_LEN]) -> Self {
        Self(raw)
    }

    /// The null object ID (all zeros).
    pub const fn null() -> Self {
        Self([0u8; RAW_LEN])
    }

    /// The raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// First byte, used to index fan-out tables.
    pub fn first_byte(&self) -> u8 {
        self.0[0]
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters).
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(7);
        s
    }

    /// Parse the canonical 40-character lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HEX_LEN,
                actual: s.len(),
            });
        }
        if !is_lower_hex(s) {
            return Err(TypeError::InvalidHex(s.to_owned()));
        }
        let mut raw = [0u8; RAW_LEN];
        hex::decode_to_slice(s, &mut raw).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(raw))
    }

    /// Build an id from a two-digit bucket name and a 38-digit loose suffix.
    pub fn from_loose_parts(bucket: &str, suffix: &str) -> Result<Self, TypeError> {
        let mut hex = String::with_capacity(HEX_LEN);
        hex.push_str(bucket);
        hex.push_str(suffix);
        Self::from_hex(&hex)
    }
}

/// Returns `true` if every byte of `s` is in `[0-9a-f]`.
pub fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Returns `true` if `name` is a well-formed loose-object file name:
/// exactly 38 characters, all lowercase hex.
pub fn is_loose_suffix(name: &str) -> bool {
    name.len() == LOOSE_SUFFIX_LEN && is_lower_hex(name)
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; RAW_LEN]> for ObjectId {
    fn from(raw: [u8; RAW_LEN]) -> Self {
        Self(raw)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
