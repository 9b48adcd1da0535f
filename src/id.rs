//! Opaque entity identities
//!
//! Every entity (user, bookmark, session token, comment) is keyed by a
//! 24-character lowercase hex string: 12 bytes, a 4-byte unix timestamp
//! followed by 8 random bytes. Identities round-trip as fixed-form
//! strings; anything that is not exactly 24 hex characters is rejected
//! at parse time, before it can reach a store.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Byte length of a raw identity
const ID_BYTES: usize = 12;

/// Character length of the hex form
pub const ID_HEX_LEN: usize = 2 * ID_BYTES;

/// An opaque identity value (24 lowercase hex characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    /// Generate a fresh identity: 4-byte unix timestamp plus 8 random bytes
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        let secs = chrono::Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        rand::thread_rng().fill(&mut bytes[4..]);
        Id(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error for malformed identity strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError;

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid id: expected {ID_HEX_LEN} hex characters")
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseIdError);
        }
        Ok(Id(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Id {
    type Error = ParseIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> String {
        id.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_round_trips() {
        let id = Id::generate();
        assert_eq!(id.as_str().len(), ID_HEX_LEN);
        let parsed: Id = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Id::generate();
        let b = Id::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("".parse::<Id>().is_err());
        assert!("abc".parse::<Id>().is_err());
        assert!("zzzzzzzzzzzzzzzzzzzzzzzz".parse::<Id>().is_err());
        // 23 and 25 chars
        assert!("0123456789abcdef0123456".parse::<Id>().is_err());
        assert!("0123456789abcdef012345678".parse::<Id>().is_err());
    }

    #[test]
    fn test_uppercase_normalized() {
        let id: Id = "0123456789ABCDEF01234567".parse().unwrap();
        assert_eq!(id.as_str(), "0123456789abcdef01234567");
    }
}
