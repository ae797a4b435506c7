//! Data models for loaded news records and the values derived from them.
//!
//! - [`NewsRecord`]: one deduplicated, escalation-relevant news item
//! - [`CountryCount`]: a per-country mention count
//! - [`DateRange`]: an inclusive calendar-date window
//! - [`Page`]: one slice of a paginated result
//! - [`CountryMode`]: how the "countries mentioned" field is counted
//! - [`DashboardReport`]: everything one export writes to disk

use crate::error::{DashboardError, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label substituted for records with no country information.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// A news item as produced by the loader.
///
/// The timestamp has already been truncated to a calendar date, and the
/// escalation flag is always `true` for records that leave the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Headline; the deduplication key.
    pub title: String,
    /// Publication date (timestamp truncated to the day).
    pub published_on: NaiveDate,
    /// Raw "countries mentioned" field, `None` when the cell was empty.
    pub countries_mentioned: Option<String>,
    /// Link to the original article.
    pub url: String,
    pub escalation: bool,
}

impl NewsRecord {
    /// The country field as it is counted, with missing values mapped to
    /// [`UNKNOWN_COUNTRY`].
    pub fn country_label(&self) -> &str {
        self.countries_mentioned.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }
}

/// Number of matching records for one distinct country string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Inclusive date window. Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting reversed bounds with [`DashboardError::EmptyRange`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Smallest range covering every record. Falls back to today when the
    /// record set is empty.
    pub fn spanning(records: &[NewsRecord]) -> Self {
        let dates = records.iter().map(|r| r.published_on);
        match (dates.clone().min(), dates.max()) {
            (Some(start), Some(end)) => Self { start, end },
            _ => {
                let today = Local::now().date_naive();
                Self {
                    start: today,
                    end: today,
                }
            }
        }
    }

    /// Resolve optional CLI bounds against the dataset's own span.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        records: &[NewsRecord],
    ) -> Result<Self> {
        let span = Self::spanning(records);
        Self::new(start.unwrap_or(span.start), end.unwrap_or(span.end))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `true` when `date` lies within the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidDate(s.to_string()))
}

/// How the "countries mentioned" field is turned into country keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryMode {
    /// The whole field is one opaque country string.
    #[default]
    AsIs,
    /// The field is split on `,` and `;` and each entry counted separately.
    Split,
}

/// One page of a paginated result. Page numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

/// A rendered view of one session: the choropleth data plus, optionally, the
/// news behind one country. Serialized as-is for the JSON snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Local timestamp of the export, `YYYY-MM-DD HH:MM:SS`.
    pub generated_at: String,
    pub range: DateRange,
    pub country_mode: CountryMode,
    /// Sum of all country counts.
    pub total_mentions: usize,
    /// Ranked counts, one per country key.
    pub countries: Vec<CountryCount>,
    /// How many leading entries the report highlights, if any.
    pub top_n: Option<usize>,
    /// Choropleth hint: how `countries[].country` maps to map regions.
    pub location_mode: &'static str,
    /// Choropleth hint: color scale name.
    pub color_scale: &'static str,
    pub selected_country: Option<String>,
    /// Every record matching `selected_country` in `range`.
    pub country_news: Vec<NewsRecord>,
}

impl DashboardReport {
    /// File stem shared by the JSON and Markdown outputs.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.range.start(), self.range.end())
    }
}
