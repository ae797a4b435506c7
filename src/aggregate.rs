//! Per-country mention counts over a date range.
//!
//! The aggregator counts records whose date falls inside a [`DateRange`] and
//! returns one [`CountryCount`] per distinct country key, ranked by count with
//! ties kept in first-seen order.

use crate::error::Result;
use crate::models::{CountryCount, CountryMode, DateRange, NewsRecord, UNKNOWN_COUNTRY};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Count in-range records per country, most mentioned first.
///
/// With [`CountryMode::AsIs`] the counts sum to the number of in-range records.
///
/// # Arguments
///
/// * `records` - Loaded records, in input order
/// * `range` - Inclusive date range to count over
/// * `mode` - Whether a multi-country field counts whole or per country
///
/// # Returns
///
/// One [`CountryCount`] per distinct key, sorted by count descending. Keys with
/// equal counts keep the order in which they were first seen.
///
/// # Errors
///
/// Returns [`crate::error::DashboardError::EmptyRange`] if the range bounds are reversed.
#[instrument(level = "debug", skip_all, fields(records = records.len(), %range, ?mode))]
pub fn aggregate(
    records: &[NewsRecord],
    range: &DateRange,
    mode: CountryMode,
) -> Result<Vec<CountryCount>> {
    // `EmptyRange` when the bounds are reversed.
    let range = DateRange::new(range.start(), range.end())?;

    let mut counts: Vec<CountryCount> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut in_range = 0usize;

    for record in records.iter().filter(|r| range.contains(r.published_on)) {
        in_range += 1;
        for country in country_keys(record, mode) {
            match slots.get(&country) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    slots.insert(country.clone(), counts.len());
                    counts.push(CountryCount { country, count: 1 });
                }
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(
        in_range,
        countries = counts.len(),
        "Aggregated country counts"
    );
    Ok(counts)
}

/// The `n` most mentioned countries.
///
/// `counts` is expected to be ranked already, as returned by [`aggregate`].
///
/// # Arguments
///
/// * `counts` - Ranked counts
/// * `n` - How many leading entries to keep
///
/// # Returns
///
/// A prefix of `counts` of length `min(n, counts.len())`. Ties at the cut
/// are resolved by the existing order.
///
/// # Examples
///
/// ```ignore
/// let counts = aggregate(&records, &range, CountryMode::AsIs)?;
/// for c in top_n(&counts, 5) {
///     println!("{}: {}", c.country, c.count);
/// }
/// ```
pub fn top_n(counts: &[CountryCount], n: usize) -> &[CountryCount] {
    &counts[..n.min(counts.len())]
}

/// Sum of all counts.
pub fn total(counts: &[CountryCount]) -> usize {
    counts.iter().map(|c| c.count).sum()
}

/// Country keys a record contributes under `mode`.
///
/// In [`CountryMode::Split`] the field is split on `,` and `;`, each entry is
/// trimmed, and a country listed twice in one record counts once.
pub fn country_keys(record: &NewsRecord, mode: CountryMode) -> Vec<String> {
    match mode {
        CountryMode::AsIs => vec![record.country_label().to_string()],
        CountryMode::Split => {
            let keys: Vec<String> = record
                .countries_mentioned
                .as_deref()
                .unwrap_or_default()
                .split([',', ';'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unique()
                .map(str::to_string)
                .collect();
            if keys.is_empty() {
                vec![UNKNOWN_COUNTRY.to_string()]
            } else {
                keys
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(title: &str, on: NaiveDate, country: Option<&str>) -> NewsRecord {
        NewsRecord {
            title: title.to_string(),
            published_on: on,
            countries_mentioned: country.map(str::to_string),
            url: format!("https://news.example/{title}"),
            escalation: true,
        }
    }

    fn january() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    fn pairs(counts: &[CountryCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.country.as_str(), c.count)).collect()
    }

    #[test]
    fn test_counts_are_ranked() {
        let records = vec![
            record("a", date(2024, 1, 2), Some("X")),
            record("b", date(2024, 1, 3), Some("X")),
            record("c", date(2024, 1, 4), Some("Y")),
        ];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(pairs(&counts), vec![("X", 2), ("Y", 1)]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            record("a", date(2024, 1, 2), Some("Y")),
            record("b", date(2024, 1, 3), Some("X")),
            record("c", date(2024, 1, 4), Some("Z")),
            record("d", date(2024, 1, 5), Some("X")),
            record("e", date(2024, 1, 6), Some("Z")),
        ];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(pairs(&counts), vec![("X", 2), ("Z", 2), ("Y", 1)]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let records = vec![
            record("before", date(2023, 12, 31), Some("X")),
            record("first", date(2024, 1, 1), Some("X")),
            record("last", date(2024, 1, 31), Some("X")),
            record("after", date(2024, 2, 1), Some("X")),
        ];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(pairs(&counts), vec![("X", 2)]);
    }

    #[test]
    fn test_counts_sum_to_in_range_records() {
        let records = vec![
            record("a", date(2024, 1, 2), Some("X")),
            record("b", date(2024, 1, 9), None),
            record("c", date(2024, 1, 20), Some("France, Germany")),
            record("d", date(2024, 3, 1), Some("X")),
        ];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(total(&counts), 3);
    }

    #[test]
    fn test_missing_country_counts_as_unknown() {
        let records = vec![
            record("a", date(2024, 1, 2), None),
            record("b", date(2024, 1, 3), None),
        ];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(pairs(&counts), vec![("Unknown", 2)]);
    }

    #[test]
    fn test_multi_country_field_is_opaque_by_default() {
        let records = vec![record("a", date(2024, 1, 2), Some("France, Germany"))];
        let counts = aggregate(&records, &january(), CountryMode::AsIs).unwrap();
        assert_eq!(pairs(&counts), vec![("France, Germany", 1)]);
    }

    #[test]
    fn test_split_mode_fans_out() {
        let records = vec![
            record("a", date(2024, 1, 2), Some("France, Germany")),
            record("b", date(2024, 1, 3), Some("Germany;Poland; Germany")),
            record("c", date(2024, 1, 4), Some(" , ")),
        ];
        let counts = aggregate(&records, &january(), CountryMode::Split).unwrap();
        assert_eq!(
            pairs(&counts),
            vec![("Germany", 2), ("France", 1), ("Poland", 1), ("Unknown", 1)]
        );
    }

    #[test]
    fn test_empty_input_gives_empty_counts() {
        let counts = aggregate(&[], &january(), CountryMode::AsIs).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::EmptyRange { .. }));
    }

    #[test]
    fn test_top_n() {
        let counts = vec![
            CountryCount {
                country: "X".into(),
                count: 5,
            },
            CountryCount {
                country: "Y".into(),
                count: 3,
            },
            CountryCount {
                country: "Z".into(),
                count: 3,
            },
        ];
        assert_eq!(pairs(top_n(&counts, 2)), vec![("X", 5), ("Y", 3)]);
        assert_eq!(top_n(&counts, 10).len(), 3);
        assert!(top_n(&counts, 0).is_empty());
        // Input untouched.
        assert_eq!(counts.len(), 3);
    }
}
