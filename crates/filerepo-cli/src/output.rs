//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use filerepo_entity::file::FileRecord;
use filerepo_entity::quota::QuotaSnapshot;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One row of the file table.
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "File ID")]
    pub file_id: String,
    #[tabled(rename = "Name")]
    pub file_name: String,
    #[tabled(rename = "Type")]
    pub media_type: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Tag")]
    pub tag: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&FileRecord> for FileRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            file_id: record.file_id().to_string(),
            file_name: record.file_name().to_string(),
            media_type: record.media_type().to_string(),
            size: format_bytes(record.size_bytes()),
            tag: record.tag().unwrap_or("-").to_string(),
            created_at: record.created_at().format("%Y-%m-%d %H:%M:%S").to_string(),
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
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single file record in the selected format
pub fn print_file(record: &FileRecord, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("File ID", record.file_id().as_str());
            print_kv("Name", record.file_name());
            print_kv("Media type", record.media_type());
            print_kv("Size", &format_bytes(record.size_bytes()));
            print_kv("Storage path", record.storage_path());
            print_kv("Tag", record.tag().unwrap_or("-"));
            let metadata = record
                .metadata()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            print_kv("Metadata", &metadata);
            print_kv("Created", &record.created_at().to_rfc3339());
            print_kv("Modified", &record.modified_at().to_rfc3339());
        }
        OutputFormat::Json => print_json(record),
    }
}

/// Print a tenant's quota snapshot in the selected format
pub fn print_quota(tenant_code: &str, snapshot: &QuotaSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("Quota for tenant '{tenant_code}':");
            print_kv("Files", &usage(snapshot.file_count, snapshot.file_count_limit, |n| n.to_string()));
            print_kv(
                "Storage",
                &usage(snapshot.total_bytes, snapshot.storage_quota_bytes, format_bytes),
            );
            print_kv("Files used", &percent(snapshot.file_count_usage_percent));
            print_kv("Storage used", &percent(snapshot.storage_usage_percent));
            print_kv("Within file limit", &snapshot.within_file_count_quota.to_string());
            print_kv("Within storage quota", &snapshot.within_storage_quota.to_string());
        }
        OutputFormat::Json => print_json(snapshot),
    }
}

fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

fn usage(used: u64, limit: Option<u64>, fmt: impl Fn(u64) -> String) -> String {
    match limit {
        Some(limit) => format!("{} / {}", fmt(used), fmt(limit)),
        None => format!("{} / unlimited", fmt(used)),
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "-".to_string())
}

/// Render a byte count with a binary unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
