//! Service configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use anyhow::bail;
use tracing::{info, warn};

use crate::curation::SystemMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub curation: CurationConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurationConfig {
    /// `BOOTSTRAP` or `REVIEW`; unset means bootstrap
    #[serde(default)]
    pub system_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Per-probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Probes in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

/// Upper bound on probes in flight
pub const MAX_PROBE_CONCURRENCY: usize = 32;

impl LinksConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A zero timeout fails every probe.
    fn validate(&mut self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            bail!("links.timeout_secs must be at least 1");
        }

        let clamped = self.concurrency.clamp(1, MAX_PROBE_CONCURRENCY);
        if clamped != self.concurrency {
            warn!(
                configured = self.concurrency,
                using = clamped,
                "links.concurrency out of range, clamping"
            );
            self.concurrency = clamped;
        }
        Ok(())
    }
}

/// Shared secrets. A missing secret locks its routes for everyone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub cron_secret: Option<String>,
    #[serde(default)]
    pub admin_key: Option<String>,
}

// Defaults
fn default_listen() -> String { "0.0.0.0:3000".to_string() }
fn default_db_path() -> PathBuf { PathBuf::from("data/playguide.db") }
fn default_probe_timeout() -> u64 { 10 }
fn default_concurrency() -> usize { 4 }
fn default_user_agent() -> String {
    format!("playguide-link-check/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Read a TOML config file; a missing file yields defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.links.validate()?;
        Ok(config)
    }

    pub fn system_mode(&self) -> SystemMode {
        SystemMode::from_setting(self.curation.system_mode.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(config.links.timeout(), Duration::from_secs(10));
        assert_eq!(config.links.concurrency, 4);
        assert_eq!(config.system_mode(), SystemMode::Bootstrap);
        assert!(config.auth.cron_secret.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [curation]
            system_mode = "REVIEW"

            [links]
            concurrency = 8

            [auth]
            cron_secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.system_mode(), SystemMode::Review);
        assert_eq!(config.links.concurrency, 8);
        assert_eq!(config.links.timeout_secs, 10);
        assert_eq!(config.auth.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.database.path, PathBuf::from("data/playguide.db"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut links = LinksConfig {
            timeout_secs: 0,
            ..LinksConfig::default()
        };
        let err = links.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let mut none = LinksConfig {
            concurrency: 0,
            ..LinksConfig::default()
        };
        none.validate().unwrap();
        assert_eq!(none.concurrency, 1);

        let mut flood = LinksConfig {
            concurrency: 500,
            ..LinksConfig::default()
        };
        flood.validate().unwrap();
        assert_eq!(flood.concurrency, MAX_PROBE_CONCURRENCY);
    }

    #[test]
    fn test_unknown_mode_is_kept_as_unrecognized() {
        let mut config = Config::default();
        config.curation.system_mode = Some("LAUNCH".to_string());
        assert_eq!(config.system_mode(), SystemMode::Unrecognized);
    }
}
