//! # Discord Webhook Integration
//!
//! This module posts a summary of every finished scrape run to a Discord
//! channel through an incoming webhook. Scheduled runs happen unattended, so
//! the summary is the operator's signal that a run happened and which
//! targets failed.
//!
//! ## Features
//!
//! - **Run Summary**: Total matches, scrape date and one field per target
//! - **Failure Highlighting**: Failed targets show their error and turn the embed red
//! - **Optional Integration**: Does nothing when no webhook URL is configured
//! - **Non-fatal**: A failed post is logged; the scraped data is already on disk
//!
//! ## Discord Embed Structure
//!
//! Each summary includes:
//! - **Title**: "Odds scrape finished"
//! - **Description**: Total match count and the scrape date
//! - **Color**: Discord blue (`0x0058_65F2`) when all targets succeeded,
//!   red (`0x00ED_4245`) when any failed
//! - **Fields**: One inline field per target (label, match count or error)
//! - **Timestamp**: When the summary was built
//!
//! ## Rate Limits
//!
//! Discord webhooks have the following limits:
//! - **Requests**: 30 per minute (one request per run)
//! - **Fields**: 25 per embed (extra targets are folded into the description)
//! - **Field Value**: 1024 characters (error texts are truncated)
//!
//! ## Configuration
//!
//! Pass `--discord-webhook` or set `DISCORD_WEBHOOK_URL`.

use anyhow::Result;
use chrono::Utc;
use reqwest::Client;
use tracing::{error, info};

use crate::models::{DiscordEmbed, DiscordField, DiscordMessage};
use crate::orchestrator::RunSummary;

const MAX_FIELDS: usize = 25;
const MAX_FIELD_VALUE: usize = 1024;
const COLOR_OK: u32 = 0x0058_65F2;
const COLOR_FAILED: u32 = 0x00ED_4245;

/// Discord webhook client for run summaries.
///
/// ## Fields
///
/// - `client`: Reusable HTTP client for webhook requests
/// - `webhook_url`: Target webhook; `None` disables posting
///
/// ## Thread Safety
///
/// This struct is `Clone` and can be shared with scheduled jobs. The
/// underlying `reqwest::Client` is designed for concurrent use.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    /// Creates a notifier for `webhook_url`.
    ///
    /// ## Parameters
    ///
    /// - `webhook_url`: Full webhook URL, format
    ///   `https://discord.com/api/webhooks/{id}/{token}`. `None` or a blank
    ///   string disables notifications.
    pub fn new(webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        if webhook_url.is_none() {
            info!("No Discord webhook configured - run summaries will not be posted");
        }

        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Posts the summary of a finished run.
    ///
    /// ## Error Handling
    ///
    /// - **No webhook URL**: Returns `Ok(())` without sending
    /// - **HTTP error status**: Logged, returns `Ok(())`
    /// - **Network failure**: Propagated as `anyhow::Error`
    pub async fn send_run_summary(&self, summary: &RunSummary) -> Result<()> {
        let Some(webhook_url) = &self.webhook_url else {
            return Ok(());
        };

        let message = summary_message(summary);
        let response = self.client.post(webhook_url).json(&message).send().await?;

        if response.status().is_success() {
            info!("Discord summary sent for {} matches", summary.records.len());
        } else {
            error!("Failed to send Discord summary: {}", response.status());
        }

        Ok(())
    }
}

/// Builds the webhook payload for `summary`.
pub fn summary_message(summary: &RunSummary) -> DiscordMessage {
    let failed = summary.failed_targets().count();

    let mut description = format!(
        "{} matches scraped for {} ({} of {} targets failed)",
        summary.records.len(),
        summary.scrape_date.format("%Y-%m-%d"),
        failed,
        summary.outcomes.len()
    );
    if summary.outcomes.len() > MAX_FIELDS {
        description.push_str(&format!(
            "\n{} more targets not shown",
            summary.outcomes.len() - MAX_FIELDS
        ));
    }

    let fields = summary
        .outcomes
        .iter()
        .take(MAX_FIELDS)
        .map(|outcome| {
            let mut value = match &outcome.error {
                None => format!("{} matches", outcome.matches),
                Some(e) => format!("{} matches, error: {}", outcome.matches, e),
            };
            if let Some(first) = outcome.skipped.first() {
                value.push_str(&format!(
                    ", {} of {} rows skipped (row {}: {})",
                    outcome.skipped.len(),
                    outcome.rows,
                    first.index,
                    first.reason
                ));
            }
            DiscordField {
                name: outcome.label.clone(),
                value: truncate(&value, MAX_FIELD_VALUE),
                inline: true,
            }
        })
        .collect();

    DiscordMessage {
        embeds: vec![DiscordEmbed {
            title: "Odds scrape finished".to_string(),
            description,
            color: if failed > 0 { COLOR_FAILED } else { COLOR_OK },
            timestamp: Utc::now().to_rfc3339(),
            fields,
        }],
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
