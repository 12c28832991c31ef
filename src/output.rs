//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use notihub_entity::notification::Notification;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One notification flattened for table display.
#[derive(Debug, Serialize, Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Recipient")]
    pub recipient: String,
    #[tabled(rename = "Entity")]
    pub entity: String,
    #[tabled(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Archived")]
    pub archived: String,
    #[tabled(rename = "Created")]
    pub created_on: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        let content = n.content();
        Self {
            id: n.id().get(),
            recipient: n.recipient().to_string(),
            entity: format!("{}/{}", content.entity_type, content.entity_id),
            summary: content.summary.chars().take(60).collect(),
            status: n.status().to_string(),
            archived: n
                .archived_on()
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            created_on: n.created_on().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Print a page of notifications. JSON output keeps every field.
pub fn print_notifications(items: &[Notification], total_count: u64, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<NotificationRow> = items.iter().map(NotificationRow::from).collect();
            print_list(&rows, format);
            println!("{} of {} notification(s)", items.len(), total_count);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "results": items, "total_count": total_count });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + Tabled>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{}", Table::new([item]));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", json);
}
