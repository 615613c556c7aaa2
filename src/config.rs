//! Application configuration
//!
//! Read from a TOML file, by default `~/.config/rentcar/config.toml`.
//! A missing file yields [`AppConfig::default`]; every section and field
//! may be omitted and falls back to its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::BookingJobsConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// `~/.config/rentcar/config.toml`, or `./config.toml` when no config
/// directory can be determined.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("rentcar").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub enabled: bool,
    pub complete_interval_secs: u64,
    pub stale_interval_secs: u64,
    pub pending_timeout_hours: i64,
    /// Customer status sync period; used only when a status provider is supplied
    pub customer_sync_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        let jobs = BookingJobsConfig::default();
        Self {
            enabled: true,
            complete_interval_secs: jobs.complete_interval_secs,
            stale_interval_secs: jobs.stale_interval_secs,
            pending_timeout_hours: jobs.pending_timeout_hours,
            customer_sync_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `rentcar=debug,info`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Bootstrap admin created on an empty database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: Some("admin@rentcar.local".to_string()),
            password: "admin12345".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub jobs: JobsConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Write the config, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            access_token_minutes: self.security.access_token_minutes,
            refresh_token_days: self.security.refresh_token_days,
            ..JwtConfig::default()
        }
    }

    pub fn jobs_config(&self) -> BookingJobsConfig {
        BookingJobsConfig {
            complete_interval_secs: self.jobs.complete_interval_secs,
            stale_interval_secs: self.jobs.stale_interval_secs,
            pending_timeout_hours: self.jobs.pending_timeout_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 9100

            [jobs]
            pending_timeout_hours = 48
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.jobs.pending_timeout_hours, 48);
        assert_eq!(cfg.jobs.complete_interval_secs, 3600);
        assert_eq!(cfg.jobs.stale_interval_secs, 600);
        assert_eq!(cfg.jobs.customer_sync_interval_secs, 3600);
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = AppConfig::load(Path::new("/nonexistent/rentcar/config.toml")).unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.jobs.enabled);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            AppConfig::from_toml("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("rentcar-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.security.access_token_minutes = 15;
        cfg.admin.username = "root".into();
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.security.access_token_minutes, 15);
        assert_eq!(loaded.admin.username, "root");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn sub_configs_carry_values() {
        let mut cfg = AppConfig::default();
        cfg.security.jwt_secret = "s".into();
        cfg.jobs.stale_interval_secs = 5;

        assert_eq!(cfg.jwt_config().secret, "s");
        assert_eq!(cfg.jobs_config().stale_interval_secs, 5);
        assert_eq!(cfg.database_config().url, cfg.database.url);
    }
}
