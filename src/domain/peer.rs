//! Tunnel peers and the textual forms of their public keys.
//!
//! The tunnel device prints peers as `peer(ABCD…WXYZ)`, an abbreviation of the
//! padded base64 key. Operators know the same peer by its short identifier
//! `[ABCDE]`. Both forms are derived here so the rewrite table can map one onto
//! the other.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

/// Length of a public key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of a padded base64 encoding of a well-formed key.
const ENCODED_KEY_LEN: usize = 44;

/// Abbreviation used by the device for keys that do not encode to 44 characters.
const INVALID_ABBREVIATION: &str = "invalid";

/// Error returned when parsing a public key fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Input was not valid standard base64
    InvalidBase64,
    /// Decoded key had the wrong number of bytes
    InvalidLength(usize),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::InvalidBase64 => write!(f, "public key is not valid base64"),
            KeyError::InvalidLength(len) => {
                write!(f, "public key must be {} bytes, got {}", KEY_LEN, len)
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// A 32-byte tunnel public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    /// Wrap raw key bytes.
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from its padded standard base64 form.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| KeyError::InvalidBase64)?;
        Self::try_from(bytes.as_slice())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Padded standard base64 encoding (always 44 characters).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Stable short identifier, e.g. `[mMtYa]`.
    pub fn short_string(&self) -> String {
        let long = self.to_base64();
        format!("[{}]", &long[..5])
    }

    /// The identifier the tunnel device prints for this key, e.g. `peer(mMtY…9Pw8)`.
    pub fn wire_identifier(&self) -> String {
        wire_identifier(&self.0)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self(key))
    }
}

impl From<[u8; KEY_LEN]> for PublicKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.short_string())
    }
}

/// Abbreviate key bytes the way the tunnel device does.
///
/// A 44-character encoding yields characters 1–4, `…`, characters 40–43.
/// Any other length yields `invalid`; this never fails.
pub fn wire_abbreviation(key: &[u8]) -> String {
    let encoded = STANDARD.encode(key);
    if encoded.len() == ENCODED_KEY_LEN {
        format!("{}…{}", &encoded[0..4], &encoded[39..43])
    } else {
        INVALID_ABBREVIATION.to_string()
    }
}

/// Full device identifier for key bytes: `peer(` + abbreviation + `)`.
pub fn wire_identifier(key: &[u8]) -> String {
    format!("peer({})", wire_abbreviation(key))
}

/// A configured tunnel peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// The peer's public key
    pub public_key: PublicKey,
    /// Optional operator-facing label, logged when the peer set is published
    pub name: Option<String>,
}

impl Peer {
    /// Create a peer from its public key.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            name: None,
        }
    }

    /// Attach an operator-facing label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<PublicKey> for Peer {
    fn from(public_key: PublicKey) -> Self {
        Self::new(public_key)
    }
}
