//! Command-line interface definitions for Conflict Watch.
//!
//! Every option can be given as a flag or, where noted, an environment variable.

use crate::error::Result;
use crate::models::{CountryMode, DateRange, NewsRecord, parse_date};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the Conflict Watch application.
///
/// # Examples
///
/// ```sh
/// # Ranked country counts for the first quarter
/// conflict_watch summary --start 2024-01-01 --end 2024-03-31 --top 10
///
/// # Second page of news mentioning Sudan
/// conflict_watch news --country sudan --page 2
///
/// # Escalation narrative from the configured LLM
/// conflict_watch analyze --country Sudan
///
/// # JSON snapshot + Markdown report
/// conflict_watch export -j ./json -m ./markdown --country Israel
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the processed news CSV
    #[arg(
        short,
        long,
        env = "CONFLICT_DATA_PATH",
        default_value = "processed_news_data.csv",
        global = true
    )]
    pub data: String,

    /// Optional path to the LLM client config.yaml
    #[arg(long, env = "CONFLICT_LLM_CONFIG", global = true)]
    pub config: Option<String>,

    /// Split "Countries Mentioned" on commas/semicolons and count each country
    #[arg(long, global = true)]
    pub split_countries: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn country_mode(&self) -> CountryMode {
        if self.split_countries {
            CountryMode::Split
        } else {
            CountryMode::AsIs
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print news counts per country, most mentioned first
    Summary(SummaryArgs),
    /// Print one page of news mentioning a country
    News(NewsArgs),
    /// Ask the LLM for a conflict-escalation analysis of a country
    Analyze(AnalyzeArgs),
    /// Write the JSON snapshot and Markdown report
    Export(ExportArgs),
}

/// Date window shared by the data subcommands. Omitted bounds default to the
/// dataset's first and last dates.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn resolve(&self, records: &[NewsRecord]) -> Result<DateRange> {
        DateRange::resolve(self.start, self.end, records)
    }
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Only show the N most mentioned countries
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args, Debug)]
pub struct NewsArgs {
    /// Country to look up (case-insensitive substring)
    #[arg(long)]
    pub country: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Country to analyze
    #[arg(long)]
    pub country: String,

    /// Named template from the LLM client config directory (default: built-in)
    #[arg(long)]
    pub template: Option<String>,

    /// Retries after a failed request (0 = single attempt)
    #[arg(long, env = "CONFLICT_MAX_RETRIES", default_value_t = 0)]
    pub max_retries: usize,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output directory for the JSON snapshot
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for the Markdown report
    #[arg(short, long)]
    pub markdown_output_dir: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Highlight the N most mentioned countries
    #[arg(long)]
    pub top: Option<usize>,

    /// Include every page of news mentioning this country
    #[arg(long)]
    pub country: Option<String>,
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}
