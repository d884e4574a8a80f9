//! CSV and JSON writers for scraped fixtures.
//!
//! Both formats carry the same columns. In CSV the `odds` cell always holds
//! the JSON array text, e.g. `["+150","-110","+200"]`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;

use crate::models::MatchRecord;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Paths written for one record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
    /// Paths that already existed and were overwritten
    pub replaced: Vec<PathBuf>,
}

/// A write that failed, with the file it was aimed at
#[derive(Debug)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub source: BoxError,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    datetime: String,
    league: &'a str,
    team1: &'a str,
    team2: &'a str,
    odds: String,
    match_url: &'a str,
}

/// Render records as CSV text with a header row.
pub fn to_csv(records: &[MatchRecord]) -> Result<Vec<u8>, BoxError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(CsvRow {
            datetime: record.datetime.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            league: &record.league,
            team1: &record.team1,
            team2: &record.team2,
            odds: serde_json::to_string(&record.odds)?,
            match_url: &record.match_url,
        })?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Render records as a pretty-printed JSON array.
pub fn to_json(records: &[MatchRecord]) -> Result<Vec<u8>, BoxError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// `{sport}_matches_{YYYYMMDD}` for the per-sport files
pub fn sport_file_stem(sport: &str, now: DateTime<Utc>) -> String {
    format!("{}_matches_{}", sport, now.format("%Y%m%d"))
}

/// `consolidated_matches_{YYYYMMDD_HHMM}` for the aggregate files
pub fn consolidated_file_stem(now: DateTime<Utc>) -> String {
    format!("consolidated_matches_{}", now.format("%Y%m%d_%H%M"))
}

/// Write `<dir>/<stem>.csv` and `<dir>/<stem>.json`.
///
/// The directory must already exist. Existing files of the same name are
/// replaced and listed in [`SavedFiles::replaced`]; per-sport stems only
/// carry the day, so a second run on the same day lands here.
pub async fn write_records(
    dir: &Path,
    stem: &str,
    records: &[MatchRecord],
) -> Result<SavedFiles, WriteFailure> {
    let csv_path = dir.join(format!("{stem}.csv"));
    let json_path = dir.join(format!("{stem}.json"));

    let mut replaced = Vec::new();
    if write_file(&csv_path, to_csv(records)).await? {
        replaced.push(csv_path.clone());
    }
    if write_file(&json_path, to_json(records)).await? {
        replaced.push(json_path.clone());
    }

    Ok(SavedFiles {
        csv: csv_path,
        json: json_path,
        replaced,
    })
}

/// Returns whether a file was already at `path`.
async fn write_file(path: &Path, rendered: Result<Vec<u8>, BoxError>) -> Result<bool, WriteFailure> {
    let failure = |source: BoxError| WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let bytes = rendered.map_err(failure)?;
    let existed = fs::try_exists(path).await.map_err(|e| failure(e.into()))?;
    fs::write(path, bytes).await.map_err(|e| failure(e.into()))?;
    Ok(existed)
}
