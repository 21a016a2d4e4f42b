//! Status command implementation
//!
//! One-shot query of a running console instance over its HTTP API.

use anyhow::Context;

use crate::api::types::StatusResponse;
use crate::cli::output::{format_status_json, format_status_table};
use crate::cli::StatusArgs;
use crate::stats::StatsSnapshot;

/// Handle `retryscope status` command
pub async fn handle_status(args: &StatusArgs) -> anyhow::Result<String> {
    let client = reqwest::Client::new();
    let base = args.url.trim_end_matches('/');

    let status: StatusResponse = client
        .get(format!("{}/v1/status", base))
        .send()
        .await
        .with_context(|| format!("Failed to reach console at {}", base))?
        .error_for_status()?
        .json()
        .await
        .context("Malformed status response")?;

    let stats: StatsSnapshot = client
        .get(format!("{}/v1/stats", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("Malformed stats response")?;

    Ok(if args.json {
        format_status_json(&status, &stats)
    } else {
        format_status_table(&status, &stats)
    })
}
