use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::browser::{ChromiumDriver, SnapshotDriver};
use crate::config::Settings;
use crate::discord::DiscordNotifier;
use crate::models::{MatchRecord, ScrapeTarget};
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::output::{self, SavedFiles};
use crate::progress::TracingSink;
use crate::session::SportSession;
use crate::targets;
use crate::traits::BrowserDriver;

#[derive(Clone)]
pub struct OddsScout {
    settings: Settings,
    discord: DiscordNotifier,
}

impl OddsScout {
    pub fn new(settings: Settings) -> Self {
        let discord = DiscordNotifier::new(settings.discord_webhook.clone());

        Self { settings, discord }
    }

    /// Scrape tomorrow's fixtures for every selected target, write the
    /// consolidated export and post the run summary.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let scrape_date = targets::scrape_date(Utc::now());
        let targets = targets::select(
            targets::default_targets(&self.settings.base_url, scrape_date),
            &self.settings.sports,
        );
        if targets.is_empty() {
            warn!("No targets match sports filter {:?}", self.settings.sports);
        }

        let driver = self.driver_for(&targets).await?;
        let session = SportSession::new(
            driver,
            self.settings.launch_options(),
            self.settings.session_config(),
        );
        let orchestrator = Orchestrator::new(session, Arc::new(TracingSink))
            .with_concurrency(self.settings.concurrency);

        let summary = orchestrator
            .run_with_timeout(&targets, scrape_date, self.settings.run_timeout())
            .await?;

        self.save_consolidated(&summary.records).await?;

        for failed in summary.failed_targets() {
            warn!(
                "[{}] {} failed: {}",
                failed.sport.to_uppercase(),
                failed.label,
                failed.error.as_deref().unwrap_or_default()
            );
        }

        if self.discord.is_enabled() {
            if let Err(e) = self.discord.send_run_summary(&summary).await {
                error!("Error sending Discord summary: {}", e);
            }
        }

        Ok(summary)
    }

    async fn driver_for(&self, targets: &[ScrapeTarget]) -> Result<Arc<dyn BrowserDriver>> {
        match &self.settings.replay {
            Some(dir) => {
                info!("Replaying saved pages from {}", dir.display());
                let driver = SnapshotDriver::from_dir(dir, targets)
                    .await
                    .with_context(|| format!("failed to load snapshots from {}", dir.display()))?;
                Ok(Arc::new(driver))
            }
            None => Ok(Arc::new(ChromiumDriver::new())),
        }
    }

    async fn save_consolidated(&self, records: &[MatchRecord]) -> Result<Option<SavedFiles>> {
        if records.is_empty() {
            info!("No matches to save.");
            return Ok(None);
        }

        let root = &self.settings.output_dir;
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("failed to create {}", root.display()))?;

        let stem = output::consolidated_file_stem(Utc::now());
        let saved = output::write_records(root, &stem, records)
            .await
            .map_err(|f| anyhow::anyhow!("failed to write {}: {}", f.path.display(), f.source))?;

        for path in &saved.replaced {
            warn!("Replaced earlier output {}", path.display());
        }
        info!(
            "Saved {} matches to {} and {}",
            records.len(),
            saved.csv.display(),
            saved.json.display()
        );
        Ok(Some(saved))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::test_support::simple_page;

    fn settings(replay: &std::path::Path, output: &std::path::Path, sports: &str) -> Settings {
        Settings::try_parse_from([
            "odds-scout",
            "--replay",
            replay.to_str().expect("utf8 path"),
            "--output-dir",
            output.to_str().expect("utf8 path"),
            "--sports",
            sports,
            "--settle-secs",
            "0",
            "--ready-timeout-secs",
            "1",
        ])
        .expect("parse")
    }

    fn files_starting_with(dir: &std::path::Path, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn replay_run_writes_sport_and_consolidated_files() {
        let snapshots = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        std::fs::write(snapshots.path().join("nfl.html"), simple_page("NFL", 2)).expect("write");
        std::fs::write(snapshots.path().join("wnba.html"), simple_page("WNBA", 3)).expect("write");

        let scout = OddsScout::new(settings(snapshots.path(), output.path(), "nfl,wnba"));
        let summary = scout.run_once().await.expect("run");

        assert_eq!(summary.records.len(), 5);
        assert_eq!(summary.failed_targets().count(), 0);
        assert_eq!(summary.records[0].league, "NFL");
        assert_eq!(summary.records[4].league, "WNBA");

        let consolidated = files_starting_with(output.path(), "consolidated_matches_");
        assert_eq!(consolidated.len(), 2);
        assert!(consolidated[0].ends_with(".csv"));
        assert!(consolidated[1].ends_with(".json"));
        assert_eq!(files_starting_with(&output.path().join("nfl"), "nfl_matches_").len(), 2);
    }

    #[tokio::test]
    async fn missing_snapshot_fails_only_that_target() {
        let snapshots = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        std::fs::write(snapshots.path().join("tennis.html"), simple_page("ATP", 1)).expect("write");

        let scout = OddsScout::new(settings(snapshots.path(), output.path(), "tennis,futsal"));
        let summary = scout.run_once().await.expect("run");

        assert_eq!(summary.records.len(), 1);
        let failed: Vec<&str> = summary.failed_targets().map(|o| o.sport.as_str()).collect();
        assert_eq!(failed, ["futsal"]);
    }

    #[tokio::test]
    async fn empty_run_writes_no_consolidated_files() {
        let snapshots = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");

        let scout = OddsScout::new(settings(snapshots.path(), output.path(), "nosuchsport"));
        let summary = scout.run_once().await.expect("run");

        assert!(summary.records.is_empty());
        assert!(summary.outcomes.is_empty());
        assert!(files_starting_with(output.path(), "consolidated_matches_").is_empty());
    }
}
