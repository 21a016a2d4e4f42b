//! Output formatting helpers for CLI commands

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

use crate::api::types::StatusResponse;
use crate::stats::StatsSnapshot;

/// Format the status and stats of a running console as a table.
pub fn format_status_table(status: &StatusResponse, stats: &StatsSnapshot) -> String {
    let interceptor = if status.is_active {
        "ACTIVE".green().to_string()
    } else {
        "INACTIVE".red().to_string()
    };
    let network = if status.is_online {
        "ONLINE".green().to_string()
    } else {
        "OFFLINE".yellow().to_string()
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Interceptor"), Cell::new(interceptor)]);
    table.add_row(vec![Cell::new("Network"), Cell::new(network)]);
    table.add_row(vec![
        Cell::new("Pending (interceptor)"),
        Cell::new(status.pending_requests),
    ]);
    table.add_row(vec![
        Cell::new("Active requests"),
        Cell::new(status.active_requests),
    ]);
    table.add_row(vec![Cell::new("Successful"), Cell::new(stats.successful)]);
    table.add_row(vec![Cell::new("Failed"), Cell::new(stats.failed)]);
    table.add_row(vec![Cell::new("Retried"), Cell::new(stats.retried)]);
    table.add_row(vec![Cell::new("Total"), Cell::new(stats.total)]);
    table.add_row(vec![
        Cell::new("Uptime"),
        Cell::new(format!("{}s", status.uptime_seconds)),
    ]);

    table.to_string()
}

/// Format status and stats as JSON.
pub fn format_status_json(status: &StatusResponse, stats: &StatsSnapshot) -> String {
    serde_json::to_string_pretty(&json!({
        "status": status,
        "stats": stats,
    }))
    .unwrap_or_else(|_| "{}".to_string())
}
