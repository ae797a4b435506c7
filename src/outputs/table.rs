//! Plain-text tables for the terminal.

use crate::models::{CountryCount, DateRange, NewsRecord, Page};
use crate::utils::source_tag;
use std::fmt::Write;

/// Ranked country counts with right-aligned numbers.
pub fn counts_table(counts: &[CountryCount], range: &DateRange) -> String {
    let mut out = String::new();
    writeln!(out, "News mentions by country, {range}").unwrap();
    if counts.is_empty() {
        writeln!(out, "(no escalation-related news in this range)").unwrap();
        return out;
    }

    let width = counts
        .iter()
        .map(|c| c.country.chars().count())
        .max()
        .unwrap_or(0)
        .max("Country".len());
    writeln!(out, "{:>4}  {:<width$}  {:>5}", "#", "Country", "Count").unwrap();
    for (rank, c) in counts.iter().enumerate() {
        writeln!(out, "{:>4}  {:<width$}  {:>5}", rank + 1, c.country, c.count).unwrap();
    }
    out
}

/// One page of country news: date, title, source tag and link per row.
pub fn news_page_table(page: &Page<&NewsRecord>, country: &str) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "News mentioning {country:?}: page {} of {} ({} total)",
        page.number, page.total_pages, page.total_items
    )
    .unwrap();
    for record in &page.items {
        let tag = source_tag(&record.url).unwrap_or_else(|| "-".to_string());
        writeln!(out, "{}  [{}] {}", record.published_on, tag, record.title).unwrap();
        writeln!(out, "            {}", record.url).unwrap();
    }
    out
}
