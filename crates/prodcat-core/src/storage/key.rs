//! Key encoding for records and link trees.

use std::fmt;

use crate::error::Error;

/// Size of a record id in bytes.
pub const ID_SIZE: usize = 8;

/// Total link key size.
pub const LINK_KEY_SIZE: usize = ID_SIZE * 2;

/// Owner id used in the children tree for root categories.
pub const ROOT_OWNER: u64 = 0;

/// Encode a record id.
///
/// Big-endian so that tree order matches numeric order.
pub fn encode_u64(id: u64) -> [u8; ID_SIZE] {
    id.to_be_bytes()
}

/// Decode a record id.
pub fn decode_u64(bytes: &[u8]) -> Result<u64, Error> {
    let buf: [u8; ID_SIZE] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
    Ok(u64::from_be_bytes(buf))
}

/// A link between two records.
///
/// Key format: `[owner (8 bytes, big-endian)][target (8 bytes, big-endian)]`
///
/// Prefix scans on the owner return all of its targets in ascending order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkKey {
    /// Owning record (parent category, template, ...).
    pub owner: u64,
    /// Linked record.
    pub target: u64,
}

impl LinkKey {
    /// Create a new link key.
    pub fn new(owner: u64, target: u64) -> Self {
        Self { owner, target }
    }

    /// Encode the key to bytes.
    pub fn encode(&self) -> [u8; LINK_KEY_SIZE] {
        let mut buf = [0u8; LINK_KEY_SIZE];
        buf[..ID_SIZE].copy_from_slice(&self.owner.to_be_bytes());
        buf[ID_SIZE..].copy_from_slice(&self.target.to_be_bytes());
        buf
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != LINK_KEY_SIZE {
            return None;
        }

        let owner = u64::from_be_bytes(bytes[..ID_SIZE].try_into().ok()?);
        let target = u64::from_be_bytes(bytes[ID_SIZE..].try_into().ok()?);
        Some(Self { owner, target })
    }

    /// Prefix for scanning all links of an owner.
    pub fn prefix(owner: u64) -> [u8; ID_SIZE] {
        encode_u64(owner)
    }
}

impl fmt::Debug for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkKey")
            .field("owner", &self.owner)
            .field("target", &self.target)
            .finish()
    }
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_ordering() {
        let a = LinkKey::new(1, 300).encode();
        let b = LinkKey::new(2, 1).encode();
        let c = LinkKey::new(2, 2).encode();

        assert!(a < b);
        assert!(b < c);
        assert!(b.starts_with(&LinkKey::prefix(2)));
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(LinkKey::decode(&[0u8; 10]).is_none());
        assert!(matches!(decode_u64(&[0u8; 3]), Err(Error::InvalidKey)));
        assert_eq!(decode_u64(&encode_u64(42)).unwrap(), 42);
    }
}
