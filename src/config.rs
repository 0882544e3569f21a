use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::records::CoercionPolicy;

/// Runtime settings. Every field has a default so a partial TOML file (or
/// none at all) is enough.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub database: String,
    pub cors_origin: Option<String>,
    pub coercion: CoercionPolicy,
    pub session_ttl_hours: i64,
    pub seed_default_accounts: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database: "barangay.db".to_string(),
            cors_origin: None,
            coercion: CoercionPolicy::Lenient,
            session_ttl_hours: 12,
            seed_default_accounts: true,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database: Option<String>,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid configuration file")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml_str(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(database) = overrides.database {
            self.database = database;
        }
        if overrides.cors_origin.is_some() {
            self.cors_origin = overrides.cors_origin;
        }
        self
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.max(1))
    }
}
