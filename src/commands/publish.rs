//! Publish command.

use clap::Args;

use super::Store;
use crate::output::{self, OutputFormat};
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_entity::notification::{NewNotification, NotificationAction};
use notihub_service::NotificationService;

/// Arguments for the publish command
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Kind of entity the notification refers to
    #[arg(long)]
    pub entity_type: String,
    /// Identifier of the referenced entity
    #[arg(long)]
    pub entity_id: String,
    /// Recipient kind, e.g. `user` or `role`
    #[arg(long)]
    pub recipient_type: String,
    /// Recipient identifier
    #[arg(long)]
    pub recipient_id: String,
    /// Short summary
    #[arg(short, long, default_value = "")]
    pub summary: String,
    /// Long description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Optional category code
    #[arg(long)]
    pub category: Option<i32>,
    /// Action as `label=target`; repeatable
    #[arg(long = "action", value_parser = parse_action)]
    pub actions: Vec<NotificationAction>,
}

impl PublishArgs {
    fn to_draft(&self) -> NewNotification {
        NewNotification {
            description: self.description.clone(),
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
            recipient_type: self.recipient_type.clone(),
            recipient_id: self.recipient_id.clone(),
            summary: self.summary.clone(),
            category: self.category,
            actions: self.actions.clone(),
        }
    }
}

/// Parse a `label=target` action argument.
fn parse_action(value: &str) -> Result<NotificationAction, String> {
    match value.split_once('=') {
        Some((label, target)) if !label.is_empty() => Ok(NotificationAction::new(label, target)),
        _ => Err(format!("expected LABEL=TARGET, got '{value}'")),
    }
}

/// Publish one notification and drain the service.
pub async fn execute(
    args: &PublishArgs,
    store: &Store,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let service = NotificationService::new(store.repo.clone(), config.notifications);

    // Drain on every path so nothing stays buffered when the process exits.
    let published = service.publish_new(args.to_draft()).await;
    let drained = service.shutdown().await;
    published?;
    let written = drained?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Published notification ({written} written)."))
        }
        OutputFormat::Json => println!("{}", serde_json::json!({ "written": written })),
    }
    Ok(())
}
