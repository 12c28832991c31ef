//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod notifications;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::notifications::{MAX_DESCRIPTION_LENGTH, MAX_SUMMARY_LENGTH, NotificationsConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration file and `NOTIHUB__*` environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Batching and content limit settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml`, the environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `NOTIHUB__`, later sources winning. Both files are optional.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Like [`AppConfig::load`], reading the TOML files from `dir`.
    ///
    /// Environment variables override file values, e.g.
    /// `NOTIHUB__NOTIFICATIONS__BATCH_LIMIT=50`.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NOTIHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings the core cannot operate with.
    pub fn validate(&self) -> Result<(), AppError> {
        let limits = &self.notifications;
        if limits.description_limit == 0 || limits.description_limit > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::configuration(format!(
                "notifications.description_limit must be between 1 and {MAX_DESCRIPTION_LENGTH}"
            )));
        }
        if limits.summary_limit == 0 || limits.summary_limit > MAX_SUMMARY_LENGTH {
            return Err(AppError::configuration(format!(
                "notifications.summary_limit must be between 1 and {MAX_SUMMARY_LENGTH}"
            )));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::configuration(
                "database.min_connections exceeds database.max_connections",
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "postgres://localhost:5432/notihub".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.notifications.batch_limit, 0);
        assert_eq!(
            config.notifications.description_limit,
            notifications::MAX_DESCRIPTION_LENGTH
        );
        assert_eq!(config.notifications.summary_limit, notifications::MAX_SUMMARY_LENGTH);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from("does/not/exist", "development")
            .expect("defaults should load");
        assert_eq!(config.database.max_connections, 10);

        // Tests run from the crate directory, which has no `config/`.
        let config = AppConfig::load("development").expect("defaults should load");
        assert_eq!(config.notifications.batch_limit, 0);
    }

    #[test]
    fn test_environment_overlay_wins_over_default() {
        let dir = std::env::temp_dir().join(format!("notihub-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            "[notifications]\nbatch_limit = 5\nsummary_limit = 120\n",
        )
        .unwrap();
        std::fs::write(dir.join("staging.toml"), "[notifications]\nbatch_limit = 40\n").unwrap();
        let dir_str = dir.to_str().unwrap();

        let staging = AppConfig::load_from(dir_str, "staging").unwrap();
        assert_eq!(staging.notifications.batch_limit, 40);
        assert_eq!(staging.notifications.summary_limit, 120);

        // No overlay file for this environment: default.toml alone.
        let production = AppConfig::load_from(dir_str, "production").unwrap();
        assert_eq!(production.notifications.batch_limit, 5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_toml_section() {
        let parsed: AppConfig = toml_like(
            r#"
            [notifications]
            batch_limit = 25
            "#,
        );
        assert_eq!(parsed.notifications.batch_limit, 25);
        assert_eq!(parsed.notifications.summary_limit, 500);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = AppConfig::default();
        config.notifications.summary_limit = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_limit_above_hard_maximum_rejected() {
        let mut config = AppConfig::default();
        config.notifications.description_limit = MAX_DESCRIPTION_LENGTH + 1;
        assert!(config.validate().is_err());

        config.notifications.description_limit = MAX_DESCRIPTION_LENGTH;
        config.notifications.summary_limit = MAX_SUMMARY_LENGTH + 1;
        assert!(config.validate().is_err());
    }

    fn toml_like(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize")
    }
}
