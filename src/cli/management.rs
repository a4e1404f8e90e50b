//! Management key bootstrap
//!
//! Management keys are never created over HTTP. This command writes one
//! directly to the configured store.

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{ManagementKey, Secret};
use crate::infrastructure::key::KeyRegistry;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::store::StoreFactory;

#[derive(Args, Debug, Clone)]
pub struct ManagementKeyArgs {
    /// Raw management secret
    #[arg(long, env = "KEYMEM_MANAGEMENT_SECRET")]
    pub secret: String,

    /// Label stored next to the secret
    #[arg(long, default_value = "admin")]
    pub label: String,
}

pub async fn run(args: ManagementKeyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let store = StoreFactory::new()
        .create(&config.store.store_config()?)
        .await?;
    let registry = KeyRegistry::new(store, config.store.keyspace());

    register(&registry, args).await
}

async fn register(registry: &KeyRegistry, args: ManagementKeyArgs) -> anyhow::Result<()> {
    let key = ManagementKey::new(Secret::new(args.secret.trim()), args.label);
    registry.register_management(&key).await?;

    info!(key = %key.secret.redacted(), label = %key.label, "Management key registered");
    Ok(())
}
