//! Per-session dashboard state.
//!
//! A [`Session`] holds what the user has selected (date range, country, page)
//! and answers every query against the loaded records. Each query is a fresh
//! pass over the in-memory set; nothing derived is cached.

use crate::aggregate::{aggregate, total};
use crate::error::Result;
use crate::filter::{PAGE_SIZE, filter_by_country, paginate};
use crate::models::{CountryCount, CountryMode, DashboardReport, DateRange, NewsRecord, Page};
use chrono::Local;
use tracing::debug;

/// Choropleth location mode: counts are keyed by country name.
pub const LOCATION_MODE: &str = "country names";
/// Choropleth color scale.
pub const COLOR_SCALE: &str = "Reds";

#[derive(Debug, Clone)]
pub struct Session<'a> {
    records: &'a [NewsRecord],
    range: DateRange,
    mode: CountryMode,
    selected_country: Option<String>,
    page: usize,
}

impl<'a> Session<'a> {
    /// Start a session covering the full span of `records`.
    ///
    /// No country is selected and the page is 1. An empty `records` slice gives
    /// a one-day range on today's date.
    pub fn new(records: &'a [NewsRecord], mode: CountryMode) -> Self {
        Self {
            records,
            range: DateRange::spanning(records),
            mode,
            selected_country: None,
            page: 1,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    #[cfg(test)]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the date range. The page resets because the match set changes.
    pub fn set_range(&mut self, range: DateRange) {
        debug!(%range, "Session range changed");
        self.range = range;
        self.page = 1;
    }

    /// Select a country (a map click). Starts again from page 1.
    ///
    /// The name is not validated here; a blank selection surfaces as
    /// [`DashboardError::EmptyCountry`](crate::error::DashboardError::EmptyCountry)
    /// from [`country_news`](Self::country_news).
    pub fn select_country(&mut self, country: impl Into<String>) {
        let country = country.into();
        debug!(%country, "Session country selected");
        self.selected_country = Some(country);
        self.page = 1;
    }

    /// Request a page; the value is clamped when the page is rendered.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Ranked country counts for the current range.
    pub fn country_counts(&self) -> Result<Vec<CountryCount>> {
        aggregate(self.records, &self.range, self.mode)
    }

    /// Every record matching the selected country in the current range.
    /// Empty when no country is selected.
    pub fn country_news(&self) -> Result<Vec<&'a NewsRecord>> {
        match &self.selected_country {
            Some(country) => filter_by_country(self.records, country, &self.range),
            None => Ok(Vec::new()),
        }
    }

    /// The current page of the selected country's news.
    pub fn news_page(&self) -> Result<Page<&'a NewsRecord>> {
        let news = self.country_news()?;
        Ok(paginate(&news, self.page, PAGE_SIZE))
    }

    /// Snapshot the session for export.
    ///
    /// # Arguments
    ///
    /// * `top` - Optional top-N cutoff recorded in the report for rendering
    ///
    /// # Returns
    ///
    /// A [`DashboardReport`] with the full ranked counts, their total, the
    /// choropleth hints, and every matching record for the selected country
    /// (not just the current page).
    pub fn report(&self, top: Option<usize>) -> Result<DashboardReport> {
        let countries = self.country_counts()?;
        let country_news = self.country_news()?.into_iter().cloned().collect();
        Ok(DashboardReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            range: self.range,
            country_mode: self.mode,
            total_mentions: total(&countries),
            countries,
            top_n: top,
            location_mode: LOCATION_MODE,
            color_scale: COLOR_SCALE,
            selected_country: self.selected_country.clone(),
            country_news,
        })
    }
}
