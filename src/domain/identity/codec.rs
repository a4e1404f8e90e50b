//! Secret → public key / address mapping on secp256k1

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use super::secret::Secret;
use crate::domain::DomainError;

/// Length of a prehash accepted for signing and recovery
pub const DIGEST_LEN: usize = 32;

/// Length of a recoverable signature: `r ‖ s ‖ v`
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Public identity derived from a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    public_key: VerifyingKey,
    address: String,
}

impl Identity {
    pub fn from_public_key(public_key: VerifyingKey) -> Self {
        let address = IdentityCodec::address_of(&public_key);
        Self {
            public_key,
            address,
        }
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    /// Uncompressed SEC1 encoding (65 bytes, leading 0x04)
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_encoded_point(false).as_bytes().to_vec()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Lowercase hex address without prefix
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Deterministic identity derivation and signature recovery
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl IdentityCodec {
    /// Derive the public key and address for a secret
    pub fn derive(secret: &Secret) -> Result<Identity, DomainError> {
        let signing_key = Self::signing_key(secret)?;
        Ok(Identity::from_public_key(*signing_key.verifying_key()))
    }

    /// Build the signing key behind a secret
    ///
    /// Zero and out-of-order scalars are rejected as `MalformedInput`.
    pub fn signing_key(secret: &Secret) -> Result<SigningKey, DomainError> {
        let scalar = secret.scalar()?;

        SigningKey::from_slice(&scalar)
            .map_err(|_| DomainError::malformed_input("secret is outside the curve order"))
    }

    /// Keccak-256 of the 64-byte public key body, last 20 bytes, lowercase hex
    pub fn address_of(public_key: &VerifyingKey) -> String {
        let encoded = public_key.to_encoded_point(false);
        let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
        hex::encode(&hash[12..])
    }

    /// Sign a 32-byte digest directly, without hashing it first
    ///
    /// Only sound for digests that are fresh random bytes.
    pub fn sign_digest(
        signing_key: &SigningKey,
        digest: &[u8; DIGEST_LEN],
    ) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], DomainError> {
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| DomainError::internal(format!("Failed to sign challenge: {}", e)))?;

        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }

    /// Recover the unique public key that produced `signature` over `digest`
    pub fn recover_public_key(
        digest: &[u8],
        signature: &[u8],
    ) -> Result<VerifyingKey, DomainError> {
        if digest.len() != DIGEST_LEN {
            return Err(DomainError::malformed_signature(format!(
                "digest must be {} bytes, got {}",
                DIGEST_LEN,
                digest.len()
            )));
        }

        if signature.len() != RECOVERABLE_SIGNATURE_LEN {
            return Err(DomainError::malformed_signature(format!(
                "signature must be {} bytes, got {}",
                RECOVERABLE_SIGNATURE_LEN,
                signature.len()
            )));
        }

        let rs = Signature::from_slice(&signature[..64])
            .map_err(|e| DomainError::malformed_signature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(signature[64])
            .ok_or_else(|| DomainError::malformed_signature("invalid recovery id"))?;

        VerifyingKey::recover_from_prehash(digest, &rs, recovery_id)
            .map_err(|e| DomainError::malformed_signature(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_known_vectors() {
        let one = IdentityCodec::derive(&Secret::new("1")).unwrap();
        assert_eq!(one.address(), "7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(
            one.public_key_hex(),
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );

        let two = IdentityCodec::derive(&Secret::new("2")).unwrap();
        assert_eq!(two.address(), "2b5ad5c4795c026514f8317c7a215e218dccd6cf");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let secret = Secret::new(format!("9{}", "1".repeat(70)));

        let first = IdentityCodec::derive(&secret).unwrap();
        let second = IdentityCodec::derive(&secret).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.address().len(), 40);
        assert!(first.address().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hex_and_decimal_secrets_share_identity() {
        let decimal = IdentityCodec::derive(&Secret::new("255")).unwrap();
        let hex = IdentityCodec::derive(&Secret::new("0xff")).unwrap();
        assert_eq!(decimal, hex);
    }

    #[test]
    fn test_derive_rejects_invalid_scalars() {
        assert!(matches!(
            IdentityCodec::derive(&Secret::new("0")),
            Err(DomainError::MalformedInput { .. })
        ));
        assert!(matches!(
            IdentityCodec::derive(&Secret::new("not-a-number")),
            Err(DomainError::MalformedInput { .. })
        ));
        // curve order n itself is out of range
        let order = "115792089237316195423570985008687907852837564279074904382605163141518161494337";
        assert!(IdentityCodec::derive(&Secret::new(order)).is_err());
    }

    #[test]
    fn test_sign_then_recover() {
        let secret = Secret::new(format!("4{}", "2".repeat(70)));
        let signing_key = IdentityCodec::signing_key(&secret).unwrap();
        let digest = [7u8; DIGEST_LEN];

        let signature = IdentityCodec::sign_digest(&signing_key, &digest).unwrap();
        assert!(signature[64] <= 1);

        let recovered = IdentityCodec::recover_public_key(&digest, &signature).unwrap();
        assert_eq!(recovered, *signing_key.verifying_key());
        assert_eq!(
            IdentityCodec::address_of(&recovered),
            IdentityCodec::derive(&secret).unwrap().address()
        );
    }

    #[test]
    fn test_recover_rejects_wrong_lengths() {
        let result = IdentityCodec::recover_public_key(&[0u8; 31], &[0u8; 65]);
        assert!(matches!(result, Err(DomainError::MalformedSignature { .. })));

        let result = IdentityCodec::recover_public_key(&[0u8; 32], &[0u8; 64]);
        assert!(matches!(result, Err(DomainError::MalformedSignature { .. })));
    }

    #[test]
    fn test_recover_rejects_inconsistent_signature() {
        // r = s = 0 is never a valid signature
        let result = IdentityCodec::recover_public_key(&[1u8; 32], &[0u8; 65]);
        assert!(matches!(result, Err(DomainError::MalformedSignature { .. })));

        let secret = Secret::new("12345");
        let signing_key = IdentityCodec::signing_key(&secret).unwrap();
        let mut signature = IdentityCodec::sign_digest(&signing_key, &[3u8; 32]).unwrap();
        signature[64] = 9;

        let result = IdentityCodec::recover_public_key(&[3u8; 32], &signature);
        assert!(matches!(result, Err(DomainError::MalformedSignature { .. })));
    }
}
