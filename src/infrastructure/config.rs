//! Application configuration
//!
//! Values are layered: built-in defaults, then an optional `daggerheart.toml`
//! (or any format `config` recognises) in the working directory, then
//! `DAGGERHEART_*` environment variables.

use std::time::Duration;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::application::services::DebounceSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Quiet period before a resource change is written
    pub autosave_debounce_ms: u64,
    /// Automatic retries after a failed autosave; the patch then stays
    /// pending until the next explicit flush or close
    pub autosave_max_retries: u32,
    /// Open resource trackers and builder drafts unused this long are closed
    pub idle_timeout_secs: u64,
    /// How often the idle sweep runs
    pub idle_sweep_interval_secs: u64,
    /// Catalog JSON to seed from; the bundled core catalog when unset
    #[serde(default)]
    pub catalog_seed_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from defaults, the optional config file and the environment
    pub fn load() -> Result<Self> {
        Self::defaults()?
            .add_source(File::with_name("daggerheart").required(false))
            .add_source(Environment::with_prefix("DAGGERHEART").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("database_url", "sqlite://daggerheart.db?mode=rwc")?
            .set_default("server_port", 3000_i64)?
            .set_default("autosave_debounce_ms", 500_i64)?
            .set_default("autosave_max_retries", 3_i64)?
            .set_default("idle_timeout_secs", 1800_i64)?
            .set_default("idle_sweep_interval_secs", 60_i64)?)
    }

    pub fn debounce_settings(&self) -> DebounceSettings {
        DebounceSettings {
            delay: Duration::from_millis(self.autosave_debounce_ms),
            max_retries: self.autosave_max_retries,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn idle_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.idle_sweep_interval_secs)
    }
}
