//! The fixed set of OddsPortal pages a run covers

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::models::ScrapeTarget;

pub const DEFAULT_BASE_URL: &str = "https://www.oddsportal.com";

/// Sports listed per calendar day: (sport key, label)
const DATED_SPORTS: [(&str, &str); 5] = [
    ("football", "Football"),
    ("basketball", "Basketball"),
    ("tennis", "Tennis"),
    ("futsal", "Futsal"),
    ("baseball", "Baseball"),
];

/// Recurring league pages: (sport key, path, label)
const LEAGUE_PAGES: [(&str, &str, &str); 3] = [
    ("nfl", "american-football/usa/nfl", "NFL"),
    ("ncaa", "american-football/usa/ncaa", "NCAA"),
    ("wnba", "basketball/usa/wnba", "WNBA"),
];

/// The day whose fixtures a run scrapes: tomorrow, in UTC
pub fn scrape_date(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

/// Every target, dated sports first, in the order they are scraped
pub fn default_targets(base_url: &str, date: NaiveDate) -> Vec<ScrapeTarget> {
    let base = base_url.trim_end_matches('/');
    let stamp = date.format("%Y%m%d");

    let dated = DATED_SPORTS.iter().map(|(sport, label)| {
        ScrapeTarget::new(sport, format!("{base}/matches/{sport}/{stamp}/"), label)
    });
    let leagues = LEAGUE_PAGES
        .iter()
        .map(|(sport, path, label)| ScrapeTarget::new(sport, format!("{base}/{path}/"), label));

    dated.chain(leagues).collect()
}

/// Keep only targets whose sport key is in `sports` (case-insensitive).
/// An empty filter keeps everything.
pub fn select(targets: Vec<ScrapeTarget>, sports: &[String]) -> Vec<ScrapeTarget> {
    if sports.is_empty() {
        return targets;
    }
    targets
        .into_iter()
        .filter(|t| sports.iter().any(|s| s.trim().eq_ignore_ascii_case(&t.sport)))
        .collect()
}
