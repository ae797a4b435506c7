//! Index file for navigating exported reports.
//!
//! `reports.md` lists one entry per exported date range, newest export first:
//!
//! ```text
//! # Conflict News Reports
//!
//! - [2024-01-01 to 2024-03-31](./2024-01-01_2024-03-31.md) (generated 2024-04-01 09:00:00)
//! - [2023-10-01 to 2023-12-31](./2023-10-01_2023-12-31.md) (generated 2024-01-02 08:15:00)
//! ```
//!
//! Re-exporting a range replaces its entry instead of adding a second one.

use crate::error::Result;
use crate::models::DashboardReport;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const INDEX_FILENAME: &str = "reports.md";
const INDEX_HEADER: &str = "# Conflict News Reports";

/// Add or refresh the entry for `markdown_filename` in `reports.md`.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, file = %markdown_filename))]
pub async fn update_report_index(
    markdown_output_dir: &str,
    report: &DashboardReport,
    markdown_filename: &str,
) -> Result<()> {
    let index_path = format!("{}/{}", markdown_output_dir, INDEX_FILENAME);
    let content = if Path::new(&index_path).exists() {
        fs::read_to_string(&index_path).await?
    } else {
        format!("{INDEX_HEADER}\n")
    };

    let link = format!("](./{markdown_filename})");
    let entry = format!(
        "- [{}](./{}) (generated {})",
        report.range, markdown_filename, report.generated_at
    );

    let mut lines: Vec<String> = content
        .lines()
        .filter(|l| !(l.starts_with("- [") && l.contains(&link)))
        .map(|l| l.to_string())
        .collect();

    match lines.iter().position(|l| l.starts_with(INDEX_HEADER)) {
        Some(pos) => {
            if lines.get(pos + 1).is_none_or(|l| !l.is_empty()) {
                lines.insert(pos + 1, String::new());
            }
            lines.insert(pos + 2, entry);
        }
        None => lines.push(entry),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    fs::write(&index_path, out).await?;
    info!(path = %index_path, "Updated report index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryMode, DateRange};
    use chrono::NaiveDate;

    fn report(start: (i32, u32, u32), end: (i32, u32, u32), generated_at: &str) -> DashboardReport {
        DashboardReport {
            generated_at: generated_at.to_string(),
            range: DateRange::new(
                NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
                NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            )
            .unwrap(),
            country_mode: CountryMode::AsIs,
            total_mentions: 0,
            countries: vec![],
            top_n: None,
            location_mode: "country names",
            color_scale: "Reds",
            selected_country: None,
            country_news: vec![],
        }
    }

    #[tokio::test]
    async fn test_index_is_created_and_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let md_dir = dir.path().to_str().unwrap();

        let q4 = report((2023, 10, 1), (2023, 12, 31), "2024-01-02 08:15:00");
        update_report_index(md_dir, &q4, &format!("{}.md", q4.file_stem()))
            .await
            .unwrap();
        let q1 = report((2024, 1, 1), (2024, 3, 31), "2024-04-01 09:00:00");
        update_report_index(md_dir, &q1, &format!("{}.md", q1.file_stem()))
            .await
            .unwrap();

        let index = std::fs::read_to_string(dir.path().join(INDEX_FILENAME)).unwrap();
        assert_eq!(
            index,
            "# Conflict News Reports\n\
             \n\
             - [2024-01-01 to 2024-03-31](./2024-01-01_2024-03-31.md) (generated 2024-04-01 09:00:00)\n\
             - [2023-10-01 to 2023-12-31](./2023-10-01_2023-12-31.md) (generated 2024-01-02 08:15:00)\n"
        );
    }

    #[tokio::test]
    async fn test_reexport_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let md_dir = dir.path().to_str().unwrap();

        let first = report((2024, 1, 1), (2024, 3, 31), "2024-04-01 09:00:00");
        let again = report((2024, 1, 1), (2024, 3, 31), "2024-04-02 10:30:00");
        for r in [&first, &again] {
            update_report_index(md_dir, r, &format!("{}.md", r.file_stem()))
                .await
                .unwrap();
        }

        let index = std::fs::read_to_string(dir.path().join(INDEX_FILENAME)).unwrap();
        assert_eq!(index.matches("2024-01-01_2024-03-31.md").count(), 1);
        assert!(index.contains("generated 2024-04-02 10:30:00"));
    }
}
