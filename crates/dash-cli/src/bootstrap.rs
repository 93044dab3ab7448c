use anyhow::Context;
use dash_client::Clients;
use dash_config::{DashConfig, EndpointsConfig};

use crate::cli::GlobalFlags;

/// Layered config (`.env`, TOML files, `DASH_*`), then CLI overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<DashConfig> {
    let mut config = DashConfig::load_with_dotenv().context("failed to load dash configuration")?;

    if let Some(base) = &flags.base_url {
        config.endpoints = EndpointsConfig::from_base_url(base);
    }

    Ok(config)
}

pub fn build_clients(config: &DashConfig) -> anyhow::Result<Clients> {
    Clients::from_config(config).context(
        "failed to set up GraphQL clients (set DASH_ENDPOINTS__MAIN_URL and \
         DASH_ENDPOINTS__SYSTEM_URL, or pass --base-url)",
    )
}
