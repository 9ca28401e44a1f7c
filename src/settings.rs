use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_FORUM_URL: &str = "https://lssd.gta.world/viewforum.php?f=1026";
const DEFAULT_LEGEND_URL: &str = "https://lssd.gta.world/viewtopic.php?t=68646";

/// Runtime settings: defaults, then `csb_index.toml`, then `CSB_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub forum_url: String,
    /// Reference topic carrying the "Status tags:" legend. Empty disables it.
    pub legend_url: String,
    pub fallback_color: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("csb_index").required(false))
                .add_source(Environment::with_prefix("CSB")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("forum_url", DEFAULT_FORUM_URL)?
            .set_default("legend_url", DEFAULT_LEGEND_URL)?
            .set_default("fallback_color", crate::legend::DEFAULT_FALLBACK)?
            .set_default("user_agent", concat!("csb_index/", env!("CARGO_PKG_VERSION")))?
            .set_default("timeout_secs", 30)?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn legend_url(&self) -> Option<&str> {
        let url = self.legend_url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}
