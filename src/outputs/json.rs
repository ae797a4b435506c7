//! JSON snapshot of a dashboard export.
//!
//! The snapshot carries the ranked country counts together with the choropleth
//! hints, so any map renderer can draw it without re-reading the dataset.
//!
//! ```text
//! json_output_dir/
//! └── 2024-01-01_2024-03-31.json
//! ```

use crate::error::Result;
use crate::models::DashboardReport;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `report` to `{json_output_dir}/{start}_{end}.json`, returning the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(report: &DashboardReport, json_output_dir: &str) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(format!("{}.json", report.file_stem()));
    fs::write(&path, json).await?;
    info!(
        path = %path.display(),
        countries = report.countries.len(),
        "Wrote JSON snapshot"
    );
    Ok(path)
}
