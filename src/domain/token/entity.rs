//! Bearer tokens: `hex(challenge) ‖ hex(signature)`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::identity::{Secret, DIGEST_LEN, RECOVERABLE_SIGNATURE_LEN};
use crate::domain::DomainError;

/// Byte length of the random challenge
pub const CHALLENGE_LEN: usize = DIGEST_LEN;

/// Character length of a well-formed token
pub const TOKEN_HEX_LEN: usize = (CHALLENGE_LEN + RECOVERABLE_SIGNATURE_LEN) * 2;

/// A parsed, well-formed token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    encoded: String,
    challenge: [u8; CHALLENGE_LEN],
    signature: [u8; RECOVERABLE_SIGNATURE_LEN],
}

impl Token {
    /// Build a token from a challenge and its signature
    pub fn assemble(
        challenge: [u8; CHALLENGE_LEN],
        signature: [u8; RECOVERABLE_SIGNATURE_LEN],
    ) -> Self {
        let encoded = format!("{}{}", hex::encode(challenge), hex::encode(signature));
        Self {
            encoded,
            challenge,
            signature,
        }
    }

    /// Parse a presented token, checking only its shape
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() != TOKEN_HEX_LEN {
            return Err(DomainError::malformed_input(format!(
                "token must be {} hex characters, got {}",
                TOKEN_HEX_LEN,
                raw.len()
            )));
        }

        let bytes = hex::decode(raw)
            .map_err(|_| DomainError::malformed_input("token is not valid hex"))?;

        let mut challenge = [0u8; CHALLENGE_LEN];
        let mut signature = [0u8; RECOVERABLE_SIGNATURE_LEN];
        challenge.copy_from_slice(&bytes[..CHALLENGE_LEN]);
        signature.copy_from_slice(&bytes[CHALLENGE_LEN..]);

        Ok(Self {
            encoded: raw.to_ascii_lowercase(),
            challenge,
            signature,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn challenge(&self) -> &[u8; CHALLENGE_LEN] {
        &self.challenge
    }

    pub fn signature(&self) -> &[u8; RECOVERABLE_SIGNATURE_LEN] {
        &self.signature
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}…)", &self.encoded[..8])
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// What a live token stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub secret: Secret,
    pub route: String,
}

impl TokenRecord {
    pub fn new(secret: Secret, route: impl Into<String>) -> Self {
        Self {
            secret,
            route: route.into(),
        }
    }

    /// Plain string-prefix scope check
    pub fn authorizes(&self, requested: &str) -> bool {
        requested.starts_with(self.route.as_str())
    }
}
