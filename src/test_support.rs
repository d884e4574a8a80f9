//! HTML fixtures and settings shared by the session and orchestrator tests

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::session::SessionConfig;
use crate::traits::{LaunchOptions, SiteSelectors};

/// One listing row: team titles and odds cell texts
pub struct Row<'a> {
    pub teams: &'a [&'a str],
    pub odds: &'a [&'a str],
}

/// A listing page in the shape the live site renders
pub fn listing_page(rows: &[Row<'_>]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            let teams: String = row
                .teams
                .iter()
                .map(|t| format!(r#"<a title="{t}" href="/team/{t}/">{t}</a>"#))
                .collect();
            let odds: String = row
                .odds
                .iter()
                .map(|o| format!(r#"<div><p data-testid="odd-container-default">{o}</p></div>"#))
                .collect();
            format!(r#"<div data-testid="game-row"><div class="teams">{teams}</div>{odds}</div>"#)
        })
        .collect();
    format!(r#"<html><body><main id="app">{body}</main></body></html>"#)
}

/// Page with `n` well-formed rows whose team names start with `prefix`
pub fn simple_page(prefix: &str, n: usize) -> String {
    let names: Vec<(String, String)> = (0..n)
        .map(|i| (format!("{prefix} Home {i}"), format!("{prefix} Away {i}")))
        .collect();
    let team_pairs: Vec<[&str; 2]> = names.iter().map(|(a, b)| [a.as_str(), b.as_str()]).collect();
    let rows: Vec<Row<'_>> = team_pairs
        .iter()
        .map(|pair| Row {
            teams: pair,
            odds: &["1.90", "3.40", "4.10"],
        })
        .collect();
    listing_page(&rows)
}

pub fn launch_options() -> LaunchOptions {
    LaunchOptions {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) test".to_string(),
        proxy: None,
        headless: true,
        request_timeout: Duration::from_secs(5),
    }
}

/// Session settings with no settling delay and a short readiness wait
pub fn fast_config(output_root: &Path) -> SessionConfig {
    SessionConfig {
        output_root: output_root.to_path_buf(),
        selectors: SiteSelectors::default(),
        navigation_timeout: Duration::from_secs(5),
        settle_delay: Duration::ZERO,
        ready_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(10),
    }
}

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).expect("ts").with_timezone(&Utc)
}
