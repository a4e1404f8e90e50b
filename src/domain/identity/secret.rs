//! Raw secret strings and their scalar encoding

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Minimum length of a secret string accepted as a real (non-placeholder) key
pub const CANONICAL_SECRET_LEN: usize = 70;

/// Byte length of a secp256k1 scalar
pub const SCALAR_LEN: usize = 32;

/// A raw secret as presented by a caller
///
/// The string is the only thing ever stored for an identity. It is either the
/// decimal form of the secret scalar (what the generator produces) or a
/// `0x`-prefixed hex form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Encode a scalar as its decimal secret string
    pub fn from_scalar(scalar: &[u8; SCALAR_LEN]) -> Self {
        Self(format_decimal(scalar))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the string is long enough to be a serialized scalar
    pub fn is_canonical(&self) -> bool {
        self.0.len() >= CANONICAL_SECRET_LEN
    }

    /// Fails with `MalformedInput` for placeholder-length secrets
    pub fn require_canonical(&self) -> Result<(), DomainError> {
        if self.is_canonical() {
            Ok(())
        } else {
            Err(DomainError::malformed_input(format!(
                "secret too short: expected at least {} characters",
                CANONICAL_SECRET_LEN
            )))
        }
    }

    /// Short, log-safe prefix of the secret
    pub fn redacted(&self) -> String {
        self.0.chars().take(8).collect()
    }

    /// Parse the secret into a big-endian 32-byte scalar
    ///
    /// Range checks against the curve order happen when the scalar is turned
    /// into a signing key.
    pub fn scalar(&self) -> Result<[u8; SCALAR_LEN], DomainError> {
        let raw = self.0.trim();

        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex_digits) => parse_hex(hex_digits),
            None => parse_decimal(raw),
        };

        parsed.ok_or_else(|| DomainError::malformed_input("secret is not a valid scalar"))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({}…)", self.redacted())
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn parse_decimal(digits: &str) -> Option<[u8; SCALAR_LEN]> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    BigUint::parse_bytes(digits.as_bytes(), 10).and_then(|n| to_scalar(&n))
}

fn parse_hex(digits: &str) -> Option<[u8; SCALAR_LEN]> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    BigUint::parse_bytes(digits.as_bytes(), 16).and_then(|n| to_scalar(&n))
}

/// Big-endian bytes left-padded to the scalar width, `None` on overflow
fn to_scalar(n: &BigUint) -> Option<[u8; SCALAR_LEN]> {
    let bytes = n.to_bytes_be();
    if bytes.len() > SCALAR_LEN {
        return None;
    }

    let mut out = [0u8; SCALAR_LEN];
    out[SCALAR_LEN - bytes.len()..].copy_from_slice(&bytes);
    Some(out)
}

fn format_decimal(scalar: &[u8; SCALAR_LEN]) -> String {
    BigUint::from_bytes_be(scalar).to_str_radix(10)
}
