//! Notification query and state commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use super::{Store, parse_recipient};
use crate::output::{self, NotificationRow, OutputFormat};
use notihub_core::error::AppError;
use notihub_core::types::pagination::PageRequest;
use notihub_database::{Mutation, NotificationQuery};
use notihub_entity::notification::{NotificationId, NotificationRecipient, Transition};

/// A single notification id
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Notification id
    pub id: NotificationId,
}

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Recipient as `type:id`; repeatable
    #[arg(short, long = "recipient", required = true, value_parser = parse_recipient)]
    pub recipients: Vec<NotificationRecipient>,
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u64,
    /// Page size (1-100)
    #[arg(long, default_value_t = 10)]
    pub page_size: u64,
    /// Include archived notifications
    #[arg(long)]
    pub archived: bool,
    /// Case-insensitive text matched against summary or description
    #[arg(short, long, default_value = "")]
    pub title: String,
}

/// Arguments for the count command
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Recipient as `type:id`; repeatable
    #[arg(short, long = "recipient", required = true, value_parser = parse_recipient)]
    pub recipients: Vec<NotificationRecipient>,
}

/// Result of a state change, as printed.
#[derive(Debug, Serialize, Tabled)]
struct TransitionOutcome {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Transition")]
    transition: String,
    /// Rows written, or -1 when the notification was already in that state.
    #[tabled(rename = "Affected")]
    affected: i64,
}

pub async fn show(args: &IdArgs, store: &Store, format: OutputFormat) -> Result<(), AppError> {
    let notification = store.repo.get_notification(args.id).await?;
    match format {
        OutputFormat::Table => output::print_item(&NotificationRow::from(&notification), format),
        OutputFormat::Json => output::print_json(&notification),
    }
    Ok(())
}

pub async fn list(args: &ListArgs, store: &Store, format: OutputFormat) -> Result<(), AppError> {
    let query = NotificationQuery::new(
        args.recipients.clone(),
        PageRequest::new(args.page, args.page_size),
    )
    .with_archived(args.archived)
    .with_title(args.title.clone());

    let page = store.repo.get_notifications(&query).await?;
    output::print_notifications(&page.results, page.total_count, format);
    Ok(())
}

pub async fn count(args: &CountArgs, store: &Store, format: OutputFormat) -> Result<(), AppError> {
    let unread = store.repo.not_read_notification_count(&args.recipients).await?;
    match format {
        OutputFormat::Table => println!("{unread} unread notification(s)"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "unread": unread })),
    }
    Ok(())
}

pub async fn mark_as_read(
    args: &IdArgs,
    store: &Store,
    format: OutputFormat,
) -> Result<(), AppError> {
    let outcome = store.repo.mark_as_read(args.id).await?;
    report(args.id, Transition::MarkAsRead, outcome, format);
    Ok(())
}

pub async fn mark_as_unread(
    args: &IdArgs,
    store: &Store,
    format: OutputFormat,
) -> Result<(), AppError> {
    let outcome = store.repo.mark_as_unread(args.id).await?;
    report(args.id, Transition::MarkAsUnread, outcome, format);
    Ok(())
}

pub async fn archive(args: &IdArgs, store: &Store, format: OutputFormat) -> Result<(), AppError> {
    let outcome = store.repo.archive(args.id).await?;
    report(args.id, Transition::Archive, outcome, format);
    Ok(())
}

pub async fn unarchive(
    args: &IdArgs,
    store: &Store,
    format: OutputFormat,
) -> Result<(), AppError> {
    let outcome = store.repo.unarchive(args.id).await?;
    report(args.id, Transition::UnArchive, outcome, format);
    Ok(())
}

fn report(id: NotificationId, transition: Transition, outcome: Mutation, format: OutputFormat) {
    if format == OutputFormat::Table && !outcome.is_applied() {
        output::print_warning(&format!("Notification {id}: {transition} changed nothing."));
    }
    output::print_item(
        &TransitionOutcome {
            id: id.get(),
            transition: transition.to_string(),
            affected: outcome.affected(),
        },
        format,
    );
}
