//! Binary crate for the ClimateLens gateway.
//!
//! Loads configuration (file + environment), builds the provider clients
//! and serves the HTTP surface.

use std::sync::Arc;

use climatelens_core::{Config, Gateway, ProviderId, SeedRepository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("ClimateLens gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load_with_env()?;
    for id in ProviderId::all() {
        if !config.is_provider_configured(*id) {
            warn!(
                provider = %id,
                env = id.env_var(),
                "No API key configured; seed data will be served"
            );
        }
    }

    let gateway = Gateway::from_config(&config, Arc::new(SeedRepository::default()));
    climatelens_gateway::run_http_server(gateway, config.server.port).await
}
