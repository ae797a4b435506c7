//! Markdown rendering of a dashboard export.
//!
//! The report has a ranked country table, an optional top-N list, and, when a
//! country is selected, its news split into pages of [`PAGE_SIZE`] rows.

use crate::filter::{PAGE_SIZE, page_count, paginate};
use crate::models::{CountryMode, DashboardReport};
use crate::utils::{escape_table_cell, slugify_title, source_tag, table_cell_link};
use std::fmt::Write;

/// Render `report` as a standalone Markdown document.
pub fn report_to_markdown(report: &DashboardReport) -> String {
    let mut md = String::new();

    writeln!(md, "# Conflict News: {}\n", report.range).unwrap();
    writeln!(md, "_Generated {}_\n", report.generated_at).unwrap();
    writeln!(
        md,
        "{} escalation-related mentions across {} {}.\n",
        report.total_mentions,
        report.countries.len(),
        if report.countries.len() == 1 { "country" } else { "countries" }
    )
    .unwrap();
    if report.country_mode == CountryMode::Split {
        writeln!(
            md,
            "> Multi-country fields were split; one article can count toward several countries.\n"
        )
        .unwrap();
    }

    if let Some(n) = report.top_n {
        writeln!(md, "## Top {n}\n").unwrap();
        for (rank, c) in report.countries.iter().take(n).enumerate() {
            writeln!(md, "{}. **{}** ({})", rank + 1, c.country, c.count).unwrap();
        }
        md.push('\n');
    }

    writeln!(md, "## Mentions by Country\n").unwrap();
    if report.countries.is_empty() {
        writeln!(md, "No escalation-related news in this range.\n").unwrap();
    } else {
        writeln!(md, "| Rank | Country | News Articles |").unwrap();
        writeln!(md, "|-----:|---------|--------------:|").unwrap();
        for (rank, c) in report.countries.iter().enumerate() {
            writeln!(
                md,
                "| {} | {} | {} |",
                rank + 1,
                escape_table_cell(&c.country),
                c.count
            )
            .unwrap();
        }
        md.push('\n');
    }

    if let Some(country) = &report.selected_country {
        write_country_news(&mut md, country, report);
    }

    md
}

fn write_country_news(md: &mut String, country: &str, report: &DashboardReport) {
    let news = &report.country_news;
    writeln!(md, "## News mentioning {country}\n").unwrap();
    if news.is_empty() {
        writeln!(md, "No matching news in this range.\n").unwrap();
        return;
    }

    let pages = page_count(news.len(), PAGE_SIZE);
    for number in 1..=pages {
        let page = paginate(news, number, PAGE_SIZE);
        writeln!(
            md,
            "### <a id=\"{}-page-{}\"></a>Page {} of {}\n",
            slugify_title(country),
            page.number,
            page.number,
            page.total_pages
        )
        .unwrap();
        writeln!(md, "| Date | Title | Countries | Source |").unwrap();
        writeln!(md, "|------|-------|-----------|--------|").unwrap();
        for record in &page.items {
            let source = source_tag(&record.url)
                .map(|tag| format!("`{tag}`"))
                .unwrap_or_default();
            writeln!(
                md,
                "| {} | {} | {} | {} |",
                record.published_on,
                table_cell_link(&record.title, &record.url),
                escape_table_cell(record.country_label()),
                source
            )
            .unwrap();
        }
        md.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryCount, DateRange, NewsRecord};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn report() -> DashboardReport {
        DashboardReport {
            generated_at: "2024-02-01 09:00:00".to_string(),
            range: DateRange::new(date(1), date(31)).unwrap(),
            country_mode: CountryMode::AsIs,
            total_mentions: 5,
            countries: vec![
                CountryCount {
                    country: "Yemen".into(),
                    count: 3,
                },
                CountryCount {
                    country: "Red Sea | Gulf".into(),
                    count: 2,
                },
            ],
            top_n: Some(1),
            location_mode: "country names",
            color_scale: "Reds",
            selected_country: None,
            country_news: vec![],
        }
    }

    #[test]
    fn test_table_and_top_list() {
        let md = report_to_markdown(&report());
        assert!(md.starts_with("# Conflict News: 2024-01-01 to 2024-01-31\n"));
        assert!(md.contains("5 escalation-related mentions across 2 countries."));
        assert!(md.contains("## Top 1\n\n1. **Yemen** (3)\n"));
        assert!(md.contains("| 1 | Yemen | 3 |"));
        assert!(md.contains("| 2 | Red Sea \\| Gulf | 2 |"));
        assert!(!md.contains("## News mentioning"));
    }

    #[test]
    fn test_empty_report() {
        let mut r = report();
        r.countries.clear();
        r.total_mentions = 0;
        r.top_n = None;
        let md = report_to_markdown(&r);
        assert!(md.contains("No escalation-related news in this range."));
    }

    #[test]
    fn test_country_news_is_paged() {
        let mut r = report();
        r.selected_country = Some("Yemen".to_string());
        r.country_news = (0..12u32)
            .map(|i| NewsRecord {
                title: format!("Strike {i}"),
                published_on: date(1 + i),
                countries_mentioned: Some("Yemen".to_string()),
                url: format!("https://www.reuters.com/world/{i}"),
                escalation: true,
            })
            .collect();

        let md = report_to_markdown(&r);
        assert!(md.contains("## News mentioning Yemen"));
        assert!(md.contains("Page 1 of 2"));
        assert!(md.contains("Page 2 of 2"));
        assert!(md.contains("| 2024-01-12 | [Strike 11](<https://www.reuters.com/world/11>) | Yemen | `reuters` |"));
        assert_eq!(md.matches("[Strike ").count(), 12);
    }

    #[test]
    fn test_news_links_survive_brackets_and_spaces() {
        let mut r = report();
        r.selected_country = Some("Gaza".to_string());
        r.country_news = vec![NewsRecord {
            title: "[LIVE] Strikes on Rafah".to_string(),
            published_on: date(3),
            countries_mentioned: Some("Gaza".to_string()),
            url: "https://live.example/gaza (day 90)".to_string(),
            escalation: true,
        }];

        let md = report_to_markdown(&r);
        assert!(md.contains("[\\[LIVE\\] Strikes on Rafah](<https://live.example/gaza (day 90)>)"));
    }

    #[test]
    fn test_split_mode_note() {
        let mut r = report();
        r.country_mode = CountryMode::Split;
        assert!(report_to_markdown(&r).contains("Multi-country fields were split"));
    }
}
