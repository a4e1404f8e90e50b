//! Minting and verification of bearer tokens

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use crate::domain::token::CHALLENGE_LEN;
use crate::domain::{DomainError, Identity, IdentityCodec, Secret, Token, TokenRecord};
use crate::infrastructure::entitlement::EntitlementStore;
use crate::infrastructure::key::KeyRegistry;

use super::cache::TokenCache;

/// Issues route-scoped tokens and checks them at use time
///
/// The cached record is the source of truth for verification. Signature
/// recovery only extracts the signer's identity and never authorizes.
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    registry: KeyRegistry,
    entitlements: EntitlementStore,
    cache: TokenCache,
}

impl TokenAuthority {
    pub fn new(registry: KeyRegistry, entitlements: EntitlementStore, cache: TokenCache) -> Self {
        Self {
            registry,
            entitlements,
            cache,
        }
    }

    /// Mint a token for a provisioned, entitled key, scoped to `route`
    ///
    /// Does not consume entitlement or route quota.
    pub async fn mint(&self, secret: &Secret, route: &str) -> Result<Token, DomainError> {
        self.registry.require_provisioned(secret).await?;
        self.entitlements.check_entitled(secret).await?;

        let signing_key = IdentityCodec::signing_key(secret)?;

        // a fresh random challenge is signed as-is, with no hash step
        let mut challenge = [0u8; CHALLENGE_LEN];
        OsRng.fill_bytes(&mut challenge);
        let signature = IdentityCodec::sign_digest(&signing_key, &challenge)?;

        let token = Token::assemble(challenge, signature);
        self.cache
            .insert(&token, TokenRecord::new(secret.clone(), route))
            .await;

        info!(key = %secret.redacted(), route, "Token minted");
        Ok(token)
    }

    /// Resolve a presented token for `requested_route`
    ///
    /// Entitlement is re-checked on every call, so clearing or draining it
    /// takes effect on tokens already minted.
    pub async fn verify(&self, raw: &str, requested_route: &str) -> Result<TokenRecord, DomainError> {
        let token = Token::parse(raw)?;

        let record = self
            .cache
            .get(&token)
            .await
            .ok_or(DomainError::TokenNotFound)?;

        if !record.authorizes(requested_route) {
            debug!(
                authorized = %record.route,
                requested = requested_route,
                "Token route mismatch"
            );
            return Err(DomainError::route_denied(&record.route, requested_route));
        }

        self.entitlements.check_entitled(&record.secret).await?;

        Ok(record)
    }

    /// Recover the signer of a token from its embedded signature
    pub fn recover_identity(&self, raw: &str) -> Result<Identity, DomainError> {
        let token = Token::parse(raw)?;
        let public_key = IdentityCodec::recover_public_key(token.challenge(), token.signature())?;

        Ok(Identity::from_public_key(public_key))
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{EntitlementLapse, KeySpace, TOKEN_HEX_LEN};
    use crate::infrastructure::testing::{canonical_secret, in_memory_store};
    use crate::infrastructure::token::TokenCacheConfig;

    struct Fixture {
        authority: TokenAuthority,
        registry: KeyRegistry,
        entitlements: EntitlementStore,
    }

    fn fixture_with_cache(config: TokenCacheConfig) -> Fixture {
        let store = in_memory_store();
        let registry = KeyRegistry::new(store.clone(), KeySpace::default());
        let entitlements = EntitlementStore::new(store, registry.clone());
        let authority = TokenAuthority::new(
            registry.clone(),
            entitlements.clone(),
            TokenCache::new(&config),
        );

        Fixture {
            authority,
            registry,
            entitlements,
        }
    }

    async fn entitled(fixture: &Fixture, seed: u32, uses: i64) -> Secret {
        let secret = canonical_secret(seed);
        fixture
            .registry
            .provision(Some(secret.clone()), "svc")
            .await
            .unwrap();
        fixture
            .entitlements
            .set_entitlement(&secret, uses, 1)
            .await
            .unwrap();
        secret
    }

    fn fixture() -> Fixture {
        fixture_with_cache(TokenCacheConfig::default())
    }

    #[tokio::test]
    async fn test_mint_then_verify_nested_route() {
        let fixture = fixture();
        let secret = entitled(&fixture, 1, 3).await;

        let token = fixture.authority.mint(&secret, "/v1").await.unwrap();
        assert_eq!(token.as_str().len(), TOKEN_HEX_LEN);

        let record = fixture
            .authority
            .verify(token.as_str(), "/v1/items")
            .await
            .unwrap();
        assert_eq!(record.secret, secret);
        assert_eq!(record.route, "/v1");

        assert!(fixture.authority.verify(token.as_str(), "/v1").await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_sibling_route_is_denied() {
        let fixture = fixture();
        let secret = entitled(&fixture, 2, 3).await;
        let token = fixture.authority.mint(&secret, "/v1/items").await.unwrap();

        assert!(matches!(
            fixture.authority.verify(token.as_str(), "/v2").await,
            Err(DomainError::RouteDenied { .. })
        ));
        // a deeper scope never authorizes its parent
        assert!(matches!(
            fixture.authority.verify(token.as_str(), "/v1").await,
            Err(DomainError::RouteDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_mint_does_not_consume() {
        let fixture = fixture();
        let secret = entitled(&fixture, 3, 2).await;

        fixture.authority.mint(&secret, "/").await.unwrap();
        fixture.authority.mint(&secret, "/").await.unwrap();

        assert_eq!(fixture.entitlements.remaining_uses(&secret).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mint_preconditions() {
        let fixture = fixture();

        assert!(matches!(
            fixture.authority.mint(&canonical_secret(4), "/").await,
            Err(DomainError::NotProvisioned { .. })
        ));

        let drained = entitled(&fixture, 5, 0).await;
        assert!(matches!(
            fixture.authority.mint(&drained, "/").await,
            Err(DomainError::NotEntitled(EntitlementLapse::QuotaExhausted))
        ));
        assert_eq!(fixture.authority.cache().entry_count(), 0);
    }

    #[tokio::test]
    async fn test_cleared_entitlement_revokes_minted_token() {
        let fixture = fixture();
        let secret = entitled(&fixture, 6, 3).await;
        let token = fixture.authority.mint(&secret, "/v1").await.unwrap();

        fixture.entitlements.clear(&secret).await.unwrap();

        assert!(matches!(
            fixture.authority.verify(token.as_str(), "/v1").await,
            Err(DomainError::NotEntitled(EntitlementLapse::Expired))
        ));
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected_before_lookup() {
        let fixture = fixture();

        assert!(matches!(
            fixture.authority.verify("deadbeef", "/").await,
            Err(DomainError::MalformedInput { .. })
        ));
        assert!(matches!(
            fixture.authority.verify(&"0".repeat(TOKEN_HEX_LEN + 1), "/").await,
            Err(DomainError::MalformedInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let fixture = fixture();
        let forged = Token::assemble([1; 32], [2; 65]);

        assert!(matches!(
            fixture.authority.verify(forged.as_str(), "/").await,
            Err(DomainError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_not_found() {
        let fixture =
            fixture_with_cache(TokenCacheConfig::default().with_ttl(Duration::from_millis(50)));
        let secret = entitled(&fixture, 7, 3).await;
        let token = fixture.authority.mint(&secret, "/").await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(matches!(
            fixture.authority.verify(token.as_str(), "/").await,
            Err(DomainError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_recover_identity_matches_derivation() {
        let fixture = fixture();
        let secret = entitled(&fixture, 8, 1).await;
        let token = fixture.authority.mint(&secret, "/").await.unwrap();

        let recovered = fixture.authority.recover_identity(token.as_str()).unwrap();
        let derived = IdentityCodec::derive(&secret).unwrap();

        assert_eq!(recovered, derived);
    }

    #[tokio::test]
    async fn test_verify_does_not_mutate_on_failure() {
        let fixture = fixture();
        let secret = entitled(&fixture, 9, 3).await;
        let token = fixture.authority.mint(&secret, "/v1").await.unwrap();

        let _ = fixture.authority.verify(token.as_str(), "/v2").await;

        assert_eq!(fixture.entitlements.remaining_uses(&secret).await.unwrap(), 3);
        assert!(fixture.authority.verify(token.as_str(), "/v1").await.is_ok());
    }

    #[tokio::test]
    async fn test_provision_entitle_mint_verify_consume() {
        let fixture = fixture();
        let secret = entitled(&fixture, 10, 3).await;
        assert_eq!(fixture.registry.label(&secret).await.unwrap(), "svc");

        let token = fixture.authority.mint(&secret, "/v1").await.unwrap();
        let record = fixture
            .authority
            .verify(token.as_str(), "/v1/items")
            .await
            .unwrap();
        assert_eq!(record.secret, secret);

        for _ in 0..3 {
            fixture.entitlements.consume(&secret).await.unwrap();
        }

        assert!(!fixture.entitlements.is_entitled(&secret).await.unwrap());
        assert!(matches!(
            fixture.authority.verify(token.as_str(), "/v1/items").await,
            Err(DomainError::NotEntitled(EntitlementLapse::QuotaExhausted))
        ));
    }
}
