//! Output generation for dashboard exports.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`DashboardReport`](crate::models::DashboardReport) snapshot (choropleth data)
//! - [`markdown`]: Renders the report as a Markdown document
//! - [`indexes`]: Maintains `reports.md`, the list of exported reports
//! - [`table`]: Plain-text tables printed by the `summary` and `news` commands
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2024-01-01_2024-03-31.json
//!
//! markdown_output_dir/
//! ├── 2024-01-01_2024-03-31.md
//! └── reports.md
//! ```

pub mod indexes;
pub mod json;
pub mod markdown;
pub mod table;
