//! Per-country news lookup and pagination.

use crate::error::{DashboardError, Result};
use crate::models::{DateRange, NewsRecord, Page};
use tracing::{debug, instrument};

/// Rows per page in the country news table.
pub const PAGE_SIZE: usize = 10;

/// Records whose country field contains `country` (case-insensitive substring)
/// and whose date lies in `range`. Input order is preserved.
///
/// # Arguments
///
/// * `records` - Loaded records
/// * `country` - Search text, for example a country name clicked on the map
/// * `range` - Inclusive date range
///
/// Records with no country field never match, even for the query `"unknown"`.
///
/// # Errors
///
/// - [`DashboardError::EmptyCountry`] if `country` is blank, since an empty
///   needle would match every record that has a country
/// - [`DashboardError::EmptyRange`] if `range` has its bounds reversed
#[instrument(level = "debug", skip_all, fields(%country, %range, records = records.len()))]
pub fn filter_by_country<'a>(
    records: &'a [NewsRecord],
    country: &str,
    range: &DateRange,
) -> Result<Vec<&'a NewsRecord>> {
    let range = DateRange::new(range.start(), range.end())?;
    let needle = country.trim().to_lowercase();
    if needle.is_empty() {
        return Err(DashboardError::EmptyCountry);
    }

    let matches: Vec<&NewsRecord> = records
        .iter()
        .filter(|r| range.contains(r.published_on))
        .filter(|r| {
            r.countries_mentioned
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .collect();

    debug!(matches = matches.len(), "Filtered records by country");
    Ok(matches)
}

/// Number of pages needed for `total_items`; an empty result still has one page.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Slice out one page of `items`.
///
/// # Arguments
///
/// * `items` - The full result list
/// * `page` - Requested page, 1-indexed; clamped into `1..=total_pages`
/// * `page_size` - Rows per page (treated as 1 if zero)
///
/// # Returns
///
/// A [`Page`] carrying the clamped page number, the page count, the total item
/// count and a copy of that page's items.
///
/// # Examples
///
/// ```ignore
/// let items: Vec<usize> = (0..23).collect();
/// let last = paginate(&items, 3, PAGE_SIZE);
/// assert_eq!(last.items, vec![20, 21, 22]);
/// assert_eq!(paginate(&items, 99, PAGE_SIZE).number, 3);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = page_count(items.len(), page_size);
    let number = page.clamp(1, total_pages);
    let start = (number - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        number,
        total_pages,
        total_items: items.len(),
        items: items[start.min(end)..end].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn q1() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap()
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let records = vec![
            record("a", date(2024, 1, 2), Some("France")),
            record("b", date(2024, 1, 3), Some("Germany")),
            record("c", date(2024, 1, 4), Some("FRANCE, Spain")),
        ];
        let hits = filter_by_country(&records, "fran", &q1()).unwrap();
        let titles: Vec<&str> = hits.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_date_range_applies() {
        let records = vec![
            record("old", date(2023, 12, 31), Some("France")),
            record("edge", date(2024, 3, 31), Some("France")),
            record("new", date(2024, 4, 1), Some("France")),
        ];
        let hits = filter_by_country(&records, "France", &q1()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "edge");
    }

    #[test]
    fn test_missing_country_never_matches() {
        let records = vec![record("a", date(2024, 1, 2), None)];
        assert!(filter_by_country(&records, "unknown", &q1()).unwrap().is_empty());
    }

    #[test]
    fn test_blank_country_is_rejected() {
        let records = vec![record("a", date(2024, 1, 2), Some("France"))];
        for query in ["", "   "] {
            let err = filter_by_country(&records, query, &q1()).unwrap_err();
            assert!(matches!(err, DashboardError::EmptyCountry));
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let records = vec![record("a", date(2024, 1, 2), Some("France"))];
        assert_eq!(filter_by_country(&records, "  france ", &q1()).unwrap().len(), 1);
    }

    #[test]
    fn test_input_order_is_stable() {
        let records = vec![
            record("z", date(2024, 3, 1), Some("Israel")),
            record("a", date(2024, 1, 1), Some("Israel")),
            record("m", date(2024, 2, 1), Some("Israel")),
        ];
        let hits = filter_by_country(&records, "israel", &q1()).unwrap();
        let titles: Vec<&str> = hits.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_twenty_three_items_make_three_pages() {
        let items: Vec<usize> = (0..23).collect();
        assert_eq!(page_count(items.len(), PAGE_SIZE), 3);

        let first = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());

        let last = paginate(&items, 3, PAGE_SIZE);
        assert_eq!(last.number, 3);
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.total_items, 23);
        assert_eq!(last.items, vec![20, 21, 22]);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_page() {
        let items: Vec<usize> = (0..20).collect();
        assert_eq!(page_count(items.len(), PAGE_SIZE), 2);
        assert_eq!(paginate(&items, 2, PAGE_SIZE).items.len(), 10);
    }

    #[test]
    fn test_page_numbers_are_clamped() {
        let items: Vec<usize> = (0..23).collect();
        assert_eq!(paginate(&items, 0, PAGE_SIZE).number, 1);
        let beyond = paginate(&items, 9, PAGE_SIZE);
        assert_eq!(beyond.number, 3);
        assert_eq!(beyond.items.len(), 3);
    }

    #[test]
    fn test_empty_result_is_one_empty_page() {
        let items: Vec<usize> = Vec::new();
        let page = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }
}
