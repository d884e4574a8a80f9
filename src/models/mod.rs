//! Data models for scraped fixtures, scrape targets and Discord webhook payloads

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of odds values kept per fixture.
pub const MAX_ODDS: usize = 3;

/// Spacing between placeholder kickoff times of consecutive rows.
const PLACEHOLDER_STEP_MINUTES: i64 = 5;

/// One fixture scraped from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Placeholder derived from the row position, not a real kickoff time.
    /// See [`placeholder_datetime`].
    pub datetime: DateTime<Utc>,
    pub league: String,
    pub team1: String,
    pub team2: String,
    pub odds: Vec<String>,
    /// The listing page the record came from, not a per-match link.
    pub match_url: String,
}

impl MatchRecord {
    /// Builds a record from raw extracted strings.
    ///
    /// Returns `None` unless both team names are present and non-blank.
    /// Odds beyond [`MAX_ODDS`] are dropped; fewer are kept as-is.
    pub fn from_parts(
        datetime: DateTime<Utc>,
        league: &str,
        team1: Option<String>,
        team2: Option<String>,
        mut odds: Vec<String>,
        match_url: &str,
    ) -> Option<Self> {
        let team1 = team1.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let team2 = team2.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        odds.truncate(MAX_ODDS);

        Some(Self {
            datetime,
            league: league.to_string(),
            team1,
            team2,
            odds,
            match_url: match_url.to_string(),
        })
    }
}

/// Synthesized kickoff time for the row at `index`: midnight UTC of `now`
/// plus five minutes per row.
pub fn placeholder_datetime(now: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::default()).and_utc();
    midnight + Duration::minutes(index as i64 * PLACEHOLDER_STEP_MINUTES)
}

/// One page the orchestrator scrapes independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    /// Short key used in file names, e.g. `football` or `nfl`
    pub sport: String,
    pub url: String,
    /// Human-readable label written into every record's `league`
    pub label: String,
    /// Subdirectory of the output root for this target's files
    pub output_folder: String,
}

impl ScrapeTarget {
    pub fn new(sport: &str, url: impl Into<String>, label: &str) -> Self {
        Self {
            sport: sport.to_string(),
            url: url.into(),
            label: label.to_string(),
            output_folder: sport.to_string(),
        }
    }

    /// Upper-cased sport key used to prefix log lines.
    pub fn tag(&self) -> String {
        self.sport.to_uppercase()
    }
}

/// Discord embed structure for rich notifications
#[derive(Debug, Serialize)]
pub struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub fields: Vec<DiscordField>,
}

/// Key-value field for Discord embeds
#[derive(Debug, Serialize)]
pub struct DiscordField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Discord webhook message payload
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    pub embeds: Vec<DiscordEmbed>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).expect("ts").with_timezone(&Utc)
    }

    fn odds(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn declines_when_a_team_is_missing() {
        let now = at("2026-10-18T10:00:00Z");
        assert!(MatchRecord::from_parts(now, "NFL", Some("A".into()), None, vec![], "u").is_none());
        assert!(MatchRecord::from_parts(now, "NFL", None, Some("B".into()), vec![], "u").is_none());
        assert!(
            MatchRecord::from_parts(now, "NFL", Some("  ".into()), Some("B".into()), vec![], "u")
                .is_none()
        );
    }

    #[test]
    fn clamps_odds_to_three() {
        let now = at("2026-10-18T10:00:00Z");
        let record = MatchRecord::from_parts(
            now,
            "Tennis",
            Some("A".into()),
            Some("B".into()),
            odds(&["1.5", "2.0", "3.1", "4.4", "9.0"]),
            "https://example.test/tennis/",
        )
        .expect("record");
        assert_eq!(record.odds, odds(&["1.5", "2.0", "3.1"]));
        assert_eq!(record.league, "Tennis");
        assert_eq!(record.match_url, "https://example.test/tennis/");
    }

    #[test]
    fn keeps_short_odds_unpadded() {
        let now = at("2026-10-18T10:00:00Z");
        let record =
            MatchRecord::from_parts(now, "NBA", Some("A".into()), Some("B".into()), odds(&["-200"]), "u")
                .expect("record");
        assert_eq!(record.odds, odds(&["-200"]));
    }

    #[test]
    fn placeholder_counts_five_minutes_from_midnight() {
        let now = at("2026-10-18T17:42:13.250Z");
        assert_eq!(placeholder_datetime(now, 0), at("2026-10-18T00:00:00Z"));
        assert_eq!(placeholder_datetime(now, 3), at("2026-10-18T00:15:00Z"));
        assert_eq!(placeholder_datetime(now, 300), at("2026-10-19T01:00:00Z"));
    }

    #[test]
    fn serializes_datetime_as_rfc3339() {
        let record = MatchRecord::from_parts(
            at("2026-10-18T00:05:00Z"),
            "WNBA",
            Some("Aces".into()),
            Some("Liberty".into()),
            odds(&["+150"]),
            "u",
        )
        .expect("record");
        let json = serde_json::to_value(&record).expect("json");
        assert_eq!(json["datetime"], "2026-10-18T00:05:00Z");
        assert_eq!(json["odds"], serde_json::json!(["+150"]));
    }
}
