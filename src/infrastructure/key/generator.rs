//! Secret generation
//!
//! Draws fresh secp256k1 scalars and encodes them as decimal secret strings.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::domain::identity::{Secret, SCALAR_LEN};

/// Generator for provisioned secrets
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretGenerator;

impl SecretGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a new secret of canonical length
    ///
    /// Scalars whose decimal form is shorter than the canonical length are
    /// redrawn, so every generated key can later be revoked.
    pub fn generate(&self) -> Secret {
        loop {
            let secret = Self::draw();

            if secret.is_canonical() {
                return secret;
            }
        }
    }

    fn draw() -> Secret {
        let signing_key = SigningKey::random(&mut OsRng);

        let mut scalar = [0u8; SCALAR_LEN];
        scalar.copy_from_slice(&signing_key.to_bytes());

        Secret::from_scalar(&scalar)
    }
}
