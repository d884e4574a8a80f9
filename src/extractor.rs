//! Turns one rendered match row into a [`MatchRecord`]

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::errors::RowError;
use crate::models::{MAX_ODDS, MatchRecord, ScrapeTarget, placeholder_datetime};
use crate::traits::{ElementHandle, SiteSelectors};

/// A row that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
}

/// Everything about the page a row needs besides the row itself
pub struct RowContext<'a> {
    pub target: &'a ScrapeTarget,
    pub selectors: &'a SiteSelectors,
    /// Clock reading the placeholder datetimes are derived from
    pub now: DateTime<Utc>,
}

impl RowContext<'_> {
    /// Extract the row at `index`.
    ///
    /// Any failure is logged once, noted in `skipped` and swallowed so the
    /// caller can move on to the next row.
    pub async fn extract(
        &self,
        row: &dyn ElementHandle,
        index: usize,
        skipped: &mut Vec<SkippedRow>,
    ) -> Option<MatchRecord> {
        match self.try_extract(row, index).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("[{}] Failed to parse match {}: {}", self.target.tag(), index, e);
                skipped.push(SkippedRow {
                    index,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Extract the row at `index`, reporting why it had to be skipped.
    pub async fn try_extract(
        &self,
        row: &dyn ElementHandle,
        index: usize,
    ) -> Result<MatchRecord, RowError> {
        let team_links = row.query_all(&self.selectors.team_link).await?;
        if team_links.len() < 2 {
            return Err(RowError::MissingTeams {
                found: team_links.len(),
            });
        }

        let team1 = team_links[0].attribute(&self.selectors.team_attribute).await?;
        let team2 = team_links[1].attribute(&self.selectors.team_attribute).await?;

        let odds_cells = row.query_all(&self.selectors.odds).await?;
        let mut odds = Vec::with_capacity(odds_cells.len().min(MAX_ODDS));
        for cell in &odds_cells {
            odds.push(cell.inner_text().await?.trim().to_string());
        }

        let missing = |team: &Option<String>| team.as_deref().is_none_or(|t| t.trim().is_empty());
        if missing(&team1) {
            return Err(RowError::MissingTitle { position: 0 });
        }
        if missing(&team2) {
            return Err(RowError::MissingTitle { position: 1 });
        }

        MatchRecord::from_parts(
            placeholder_datetime(self.now, index),
            &self.target.label,
            team1,
            team2,
            odds,
            &self.target.url,
        )
        .ok_or(RowError::MissingTitle { position: 0 })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::browser::SnapshotDriver;
    use crate::traits::{BrowserDriver, BrowserPage, LaunchOptions};

    const URL: &str = "https://example.test/matches/tennis/";

    async fn rows_of(html: &str) -> (Box<dyn BrowserPage>, Vec<Box<dyn ElementHandle>>) {
        let driver = SnapshotDriver::new().with_page(URL, html);
        let options = LaunchOptions {
            user_agent: "ua".to_string(),
            proxy: None,
            headless: true,
            request_timeout: Duration::from_secs(1),
        };
        let page = driver.open(&options).await.expect("open");
        page.goto(URL).await.expect("goto");
        let rows = page
            .query_all(&SiteSelectors::default().row_container)
            .await
            .expect("rows");
        (page, rows)
    }

    fn context<'a>(target: &'a ScrapeTarget, selectors: &'a SiteSelectors) -> RowContext<'a> {
        RowContext {
            target,
            selectors,
            now: DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
                .expect("ts")
                .with_timezone(&Utc),
        }
    }

    #[tokio::test]
    async fn extracts_teams_and_first_three_odds() {
        let (_page, rows) = rows_of(
            r#"<div data-testid="game-row">
                 <a title="Sinner J.">x</a><a title="Alcaraz C.">y</a><a title="extra">z</a>
                 <p data-testid="odd-container-default">1.80</p>
                 <p data-testid="odd-container-default"> 2.05 </p>
                 <p data-testid="odd-container-default">9.99</p>
                 <p data-testid="odd-container-default">4.00</p>
               </div>"#,
        )
        .await;
        let target = ScrapeTarget::new("tennis", URL, "Tennis");
        let selectors = SiteSelectors::default();

        let record = context(&target, &selectors)
            .extract(rows[0].as_ref(), 2, &mut Vec::new())
            .await
            .expect("record");
        assert_eq!(record.team1, "Sinner J.");
        assert_eq!(record.team2, "Alcaraz C.");
        assert_eq!(record.odds, vec!["1.80", "2.05", "9.99"]);
        assert_eq!(record.league, "Tennis");
        assert_eq!(record.match_url, URL);
        assert_eq!(record.datetime.to_rfc3339(), "2026-10-18T00:10:00+00:00");
    }

    #[tokio::test]
    async fn single_team_link_is_skipped() {
        let (_page, rows) = rows_of(
            r#"<div data-testid="game-row"><a title="Only One">x</a>
                 <p data-testid="odd-container-default">1.5</p></div>"#,
        )
        .await;
        let target = ScrapeTarget::new("tennis", URL, "Tennis");
        let selectors = SiteSelectors::default();
        let ctx = context(&target, &selectors);

        let err = ctx.try_extract(rows[0].as_ref(), 0).await.unwrap_err();
        assert!(matches!(err, RowError::MissingTeams { found: 1 }));
        let mut skipped = Vec::new();
        assert!(ctx.extract(rows[0].as_ref(), 0, &mut skipped).await.is_none());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].index, 0);
    }

    #[tokio::test]
    async fn blank_title_is_skipped() {
        let (_page, rows) = rows_of(
            r#"<div data-testid="game-row"><a title="Home">x</a><a title=" ">y</a></div>"#,
        )
        .await;
        let target = ScrapeTarget::new("tennis", URL, "Tennis");
        let selectors = SiteSelectors::default();

        let err = context(&target, &selectors)
            .try_extract(rows[0].as_ref(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::MissingTitle { position: 1 }));
    }

    #[tokio::test]
    async fn odds_length_is_min_of_three_and_found() {
        for found in 0..6 {
            let cells: String = (0..found)
                .map(|i| format!(r#"<p data-testid="odd-container-default">{i}.5</p>"#))
                .collect();
            let html = format!(
                r#"<div data-testid="game-row"><a title="A">a</a><a title="B">b</a>{cells}</div>"#
            );
            let (_page, rows) = rows_of(&html).await;
            let target = ScrapeTarget::new("tennis", URL, "Tennis");
            let selectors = SiteSelectors::default();

            let record = context(&target, &selectors)
                .extract(rows[0].as_ref(), 0, &mut Vec::new())
                .await
                .expect("record");
            assert_eq!(record.odds.len(), found.min(MAX_ODDS));
        }
    }
}
