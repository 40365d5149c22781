use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::DecodeError;

/// Identifies a transaction in the tangle.
///
/// An opaque byte sequence; equality is byte-exact and ordering is lexicographic.
#[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Serialize, Deserialize, Default)]
pub struct Hash(Vec<u8>);

impl Hash {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self { Hash(bytes.into()) }

    /// SHA-256 over the concatenation of `parts`.
    pub fn digest<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Hash(hasher.finalize().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn from_base64<T: AsRef<[u8]>>(input: T) -> Result<Self, DecodeError> {
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(input)?;
        if decoded.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(Hash(decoded))
    }

    pub fn to_base64(&self) -> String { general_purpose::URL_SAFE_NO_PAD.encode(&self.0) }

    pub fn to_base64_short(&self) -> String {
        // take the last 6 characters of the base64 encoded string
        let value = self.to_base64();
        value[value.len().saturating_sub(6)..].to_string()
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl From<&[u8]> for Hash {
    fn from(bytes: &[u8]) -> Self { Hash(bytes.to_vec()) }
}

impl From<Vec<u8>> for Hash {
    fn from(bytes: Vec<u8>) -> Self { Hash(bytes) }
}

impl TryFrom<&str> for Hash {
    type Error = DecodeError;
    fn try_from(value: &str) -> Result<Self, Self::Error> { Self::from_base64(value) }
}

impl TryFrom<String> for Hash {
    type Error = DecodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::try_from(value.as_str()) }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.to_base64_short())
        } else {
            write!(f, "{}", self.to_base64())
        }
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Hash({})", self.to_base64()) }
}
