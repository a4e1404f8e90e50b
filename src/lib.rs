//! Keymem
//!
//! API key registry with usage-limited entitlements, per-route quotas and
//! short-lived bearer tokens signed by the key's secp256k1 identity.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use infrastructure::store::StoreFactory;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let store_config = config.store.store_config()?;
    let token_cache = config.tokens.cache_config()?;

    info!(backend = %store_config.store_type, "Connecting to store");
    let store = StoreFactory::new().create(&store_config).await?;

    Ok(AppState::new(
        store,
        config.store.keyspace(),
        &token_cache,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_in_memory_store() {
        let state = create_app_state().await.unwrap();

        assert!(state.store.ping().await.is_ok());
        assert!(state.registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_backend_fails() {
        let mut config = AppConfig::default();
        config.store.backend = "etcd".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
