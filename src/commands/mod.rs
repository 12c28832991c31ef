//! CLI command definitions and dispatch.

pub mod migrate;
pub mod notification;
pub mod publish;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::output::OutputFormat;
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_database::{DatabasePool, MemoryNotificationRepository, NotificationRepository};
use notihub_entity::notification::NotificationRecipient;

/// NotiHub: notification store administration
#[derive(Debug, Parser)]
#[command(name = "notihub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and per-environment overlays
    #[arg(short, long = "config-dir", default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to merge, e.g. `production` for `production.toml`
    #[arg(short, long, env = "NOTIHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Use a throwaway in-memory store instead of PostgreSQL
    #[arg(long, global = true)]
    pub memory: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Publish a notification through the batching service
    Publish(publish::PublishArgs),
    /// Show one notification
    Show(notification::IdArgs),
    /// List notifications for one or more recipients
    List(notification::ListArgs),
    /// Count unread notifications for one or more recipients
    Count(notification::CountArgs),
    /// Mark a notification as read
    Read(notification::IdArgs),
    /// Mark a notification as unread
    Unread(notification::IdArgs),
    /// Archive a notification
    Archive(notification::IdArgs),
    /// Restore an archived notification
    Unarchive(notification::IdArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let store = Store::open(&config, self.memory).await?;
        let format = self.format;

        let result = match &self.command {
            Commands::Migrate => migrate::execute(&store).await,
            Commands::Publish(args) => publish::execute(args, &store, &config, format).await,
            Commands::Show(args) => notification::show(args, &store, format).await,
            Commands::List(args) => notification::list(args, &store, format).await,
            Commands::Count(args) => notification::count(args, &store, format).await,
            Commands::Read(args) => notification::mark_as_read(args, &store, format).await,
            Commands::Unread(args) => notification::mark_as_unread(args, &store, format).await,
            Commands::Archive(args) => notification::archive(args, &store, format).await,
            Commands::Unarchive(args) => notification::unarchive(args, &store, format).await,
        };

        store.close().await;
        result
    }
}

/// Repository backing a CLI invocation.
#[derive(Debug)]
pub struct Store {
    pub repo: Arc<dyn NotificationRepository>,
    /// `None` when running against the in-memory store.
    pub pool: Option<DatabasePool>,
}

impl Store {
    async fn open(config: &AppConfig, memory: bool) -> Result<Self, AppError> {
        if memory {
            warn!("Using in-memory store; nothing will be persisted");
            return Ok(Self {
                repo: Arc::new(MemoryNotificationRepository::new()),
                pool: None,
            });
        }

        let pool = DatabasePool::connect(&config.database).await?;
        Ok(Self {
            repo: Arc::new(pool.repository()),
            pool: Some(pool),
        })
    }

    async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Helper: load `default.toml`, the `env` overlay and `NOTIHUB__` overrides
pub fn load_config(config_dir: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_dir, env)
}

/// Parse a `type:id` recipient argument.
pub fn parse_recipient(value: &str) -> Result<NotificationRecipient, String> {
    match value.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => {
            Ok(NotificationRecipient::new(kind, id))
        }
        _ => Err(format!("expected TYPE:ID, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipient() {
        let r = parse_recipient("user:42").unwrap();
        assert_eq!(r, NotificationRecipient::new("user", "42"));

        // Only the first colon separates type from id.
        let r = parse_recipient("group:eu:ops").unwrap();
        assert_eq!(r.recipient_id, "eu:ops");

        assert!(parse_recipient("user").is_err());
        assert!(parse_recipient(":42").is_err());
        assert!(parse_recipient("user:").is_err());
    }

    #[test]
    fn test_cli_parses_config_layers() {
        let cli = Cli::try_parse_from([
            "notihub",
            "--config-dir",
            "/etc/notihub",
            "--env",
            "production",
            "count",
            "--recipient",
            "user:1",
        ])
        .unwrap();
        assert_eq!(cli.config_dir, "/etc/notihub");
        assert_eq!(cli.env, "production");
    }

    #[test]
    fn test_cli_parses_list_arguments() {
        let cli = Cli::try_parse_from([
            "notihub",
            "--format",
            "json",
            "list",
            "--recipient",
            "user:1",
            "--recipient",
            "role:admin",
            "--archived",
            "--page",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config_dir, "config");
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.recipients.len(), 2);
                assert!(args.archived);
                assert_eq!(args.page, 2);
                assert_eq!(args.page_size, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
