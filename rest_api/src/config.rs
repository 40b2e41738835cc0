// rest_api/src/config.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

use rx_lib::DatabaseTarget;

pub const DEFAULT_REST_API_PORT: u16 = 5000;
pub const DEFAULT_REST_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATABASE_URL: &str = "sled://./data/rxtrack";
pub const CONFIG_FILE: &str = "rxtrack.toml";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Built front-end to serve next to the API, if any.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl RestApiConfig {
    pub fn database_target(&self) -> Result<DatabaseTarget> {
        self.database_url
            .parse::<DatabaseTarget>()
            .with_context(|| format!("Invalid database connection string '{}'", self.database_url))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads the REST API configuration from `rxtrack.toml` in the working
/// directory, overridden by the process environment.
pub fn load_rest_api_config() -> Result<RestApiConfig> {
    load_with(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Layers defaults, then the optional config file, then the environment
/// variables `DATABASE_URL`, `PORT`, `RXTRACK_HOST` and `RXTRACK_STATIC_DIR`.
/// Blank variables count as unset.
pub fn load_with<F>(config_file: &Path, env: F) -> Result<RestApiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let mut builder = Config::builder()
        .set_default("host", DEFAULT_REST_API_HOST)?
        .set_default("port", i64::from(DEFAULT_REST_API_PORT))?
        .set_default("database_url", DEFAULT_DATABASE_URL)?;

    if config_file.exists() {
        builder = builder.add_source(File::from(config_file.to_path_buf()));
    }

    let config = builder
        .set_override_option("database_url", var("DATABASE_URL"))?
        .set_override_option("port", var("PORT"))?
        .set_override_option("host", var("RXTRACK_HOST"))?
        .set_override_option("static_dir", var("RXTRACK_STATIC_DIR"))?
        .build()
        .context("Failed to build REST API configuration")?;

    config
        .try_deserialize()
        .context("Failed to parse REST API configuration")
}
