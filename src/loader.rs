//! Dataset loading: CSV parsing, escalation filtering and title deduplication.
//!
//! The processing order is fixed and affects the result:
//!
//! 1. Parse `Pub_Date`; unparseable values become `None` instead of dropping the row
//! 2. Keep only rows whose `Conflict Escalation` cell is the boolean literal `true`
//! 3. Keep one row per `News_Title`: the one with the latest timestamp
//!    (rows without a timestamp cannot compete and are dropped here)
//! 4. Truncate the surviving timestamps to calendar dates
//!
//! Survivors keep their original input order.

use crate::error::{DashboardError, Result};
use crate::models::NewsRecord;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use itertools::Itertools;
use once_cell::sync::OnceCell;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const COL_PUB_DATE: &str = "Pub_Date";
pub const COL_TITLE: &str = "News_Title";
pub const COL_COUNTRIES: &str = "Countries Mentioned";
pub const COL_URL: &str = "URL";
pub const COL_ESCALATION: &str = "Conflict Escalation";

/// Columns the dataset must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_PUB_DATE,
    COL_TITLE,
    COL_COUNTRIES,
    COL_URL,
    COL_ESCALATION,
];

/// Naive timestamp layouts tried after the offset-aware ones.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    pub_date: usize,
    title: usize,
    countries: usize,
    url: usize,
    escalation: usize,
}

impl Columns {
    /// Locate every required column, reporting all of the absent ones at once.
    fn locate(headers: &StringRecord) -> Result<Self> {
        let position = |col: &str| headers.iter().position(|h| h == col);
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| position(**col).is_none())
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Dataset is missing required columns");
            return Err(DashboardError::DataFormat { missing });
        }
        let index = |col: &str| position(col).unwrap_or_default();
        Ok(Self {
            pub_date: index(COL_PUB_DATE),
            title: index(COL_TITLE),
            countries: index(COL_COUNTRIES),
            url: index(COL_URL),
            escalation: index(COL_ESCALATION),
        })
    }

    /// Pull the required cells out of `record`. Cells past the end of a short
    /// row read as empty, the way pandas pads them with NaN.
    fn extract(&self, record: &StringRecord) -> RawRow {
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        RawRow {
            pub_date: cell(self.pub_date),
            title: cell(self.title),
            countries: cell(self.countries),
            url: cell(self.url),
            escalation: cell(self.escalation),
        }
    }
}

/// One CSV row before any interpretation.
#[derive(Debug)]
struct RawRow {
    pub_date: String,
    title: String,
    countries: String,
    url: String,
    escalation: String,
}

/// A row after timestamp parsing, remembering where it came from.
#[derive(Debug)]
struct ParsedRow {
    position: usize,
    timestamp: Option<DateTime<FixedOffset>>,
    escalation: bool,
    row: RawRow,
}

/// Load the dataset at `path`.
///
/// # Errors
///
/// - [`DashboardError::Io`] / [`DashboardError::Csv`] if the file cannot be read
/// - [`DashboardError::DataFormat`] if any required column is absent
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<Vec<NewsRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    load_from_reader(file)
}

/// Load the dataset from any CSV byte source.
///
/// Rows may be shorter or longer than the header; missing trailing cells are
/// treated as empty.
#[instrument(level = "debug", skip_all)]
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<NewsRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = Columns::locate(reader.headers()?)?;

    // Step 1: parse timestamps, keep every row
    let mut parsed = Vec::new();
    let mut short_rows = 0usize;
    for (position, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() < REQUIRED_COLUMNS.len() {
            short_rows += 1;
        }
        let row = columns.extract(&record);
        let timestamp = parse_timestamp(&row.pub_date);
        if timestamp.is_none() {
            debug!(position, pub_date = %row.pub_date, "Unparseable publication timestamp");
        }
        parsed.push(ParsedRow {
            position,
            timestamp,
            escalation: is_explicit_true(&row.escalation),
            row,
        });
    }
    let read_count = parsed.len();
    let unparsed_count = parsed.iter().filter(|p| p.timestamp.is_none()).count();

    // Step 2: escalation-relevant rows only
    let flagged: Vec<ParsedRow> = parsed.into_iter().filter(|p| p.escalation).collect();
    let flagged_count = flagged.len();

    // Steps 3 and 4
    let records = dedup_latest_by_title(flagged);

    info!(
        read = read_count,
        short_rows,
        unparseable_timestamps = unparsed_count,
        escalation = flagged_count,
        deduplicated = records.len(),
        "Loaded news dataset"
    );
    Ok(records)
}

/// Keep the latest row per title, then restore input order and truncate to dates.
///
/// Timestamps compare as instants, but each survivor keeps the calendar date
/// written in its own offset. The sort is stable, so among rows sharing the
/// maximum timestamp the earliest input row wins.
fn dedup_latest_by_title(rows: Vec<ParsedRow>) -> Vec<NewsRecord> {
    rows.into_iter()
        .filter_map(|p| p.timestamp.map(|ts| (ts, p)))
        .sorted_by(|(a, _), (b, _)| b.cmp(a))
        .unique_by(|(_, p)| p.row.title.clone())
        .sorted_by_key(|(_, p)| p.position)
        .map(|(ts, p)| into_record(ts.date_naive(), p))
        .collect()
}

fn into_record(published_on: NaiveDate, parsed: ParsedRow) -> NewsRecord {
    let RawRow {
        title,
        countries,
        url,
        ..
    } = parsed.row;
    let countries = countries.trim();
    NewsRecord {
        title,
        published_on,
        countries_mentioned: (!countries.is_empty()).then(|| countries.to_string()),
        url: url.trim().to_string(),
        escalation: parsed.escalation,
    }
}

/// Only the boolean literal counts; `1`, `yes` and friends do not.
fn is_explicit_true(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

/// Parse a publication timestamp, keeping the offset it was written in.
///
/// Values without an offset are read as UTC. Ordering compares instants, and
/// [`DateTime::date_naive`] gives the date as written.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Load-once, reuse-until-invalidated cache of one dataset file.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    records: OnceCell<Vec<NewsRecord>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: OnceCell::new(),
        }
    }

    /// Return the cached records, loading them on first use.
    pub fn get(&self) -> Result<&[NewsRecord]> {
        self.records
            .get_or_try_init(|| load(&self.path))
            .map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    /// Drop the cached records so the next [`get`](Self::get) reloads the file.
    #[cfg(test)]
    pub fn invalidate(&mut self) {
        if self.records.take().is_some() {
            info!(path = %self.path.display(), "Dataset cache invalidated");
        }
    }
}
