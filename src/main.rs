//! # Conflict Watch
//!
//! Tracks where conflict-escalation news is happening. Loads a pre-processed
//! news dataset, counts escalation-related mentions per country over a date
//! range, pages through the news behind any one country, and asks an
//! OpenAI-compatible LLM for an escalation narrative.
//!
//! ## Usage
//!
//! ```sh
//! conflict_watch summary --start 2024-01-01 --end 2024-03-31 --top 10
//! conflict_watch news --country sudan --page 2
//! conflict_watch analyze --country Sudan
//! conflict_watch export -j ./json -m ./markdown --country Israel
//! ```
//!
//! ## Architecture
//!
//! 1. **Loading**: read the CSV once, keep escalation rows, dedupe by title
//! 2. **Session**: date range, selected country and page are held in a
//!    [`Session`](session::Session) passed to every query
//! 3. **Querying**: aggregate per country, filter per country, paginate
//! 4. **Output**: terminal tables, JSON snapshot, Markdown report
//!
//! The LLM call sits behind [`analysis::AskAsync`] and never touches the data path.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod analysis;
mod cli;
mod error;
mod filter;
mod loader;
mod models;
mod outputs;
mod session;
mod utils;

use aggregate::top_n;
use analysis::{AskFnWrapper, RetryAsk, generate_analysis, load_chat_template, load_llm_config};
use cli::{AnalyzeArgs, Cli, Command, ExportArgs, NewsArgs, SummaryArgs};
use error::Result;
use loader::DatasetCache;
use models::CountryMode;
use outputs::{indexes, json, markdown, table};
use session::Session;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init (stderr, so stdout carries only results) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(data = %args.data, mode = ?args.country_mode(), "Parsed CLI arguments");

    match run(args).await {
        Ok(()) => {
            let elapsed = start_time.elapsed();
            info!(millis = elapsed.as_millis() as u64, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let cache = DatasetCache::new(&args.data);
    let mode = args.country_mode();

    match &args.command {
        Command::Summary(cmd) => summary(&cache, mode, cmd),
        Command::News(cmd) => news(&cache, mode, cmd),
        Command::Analyze(cmd) => analyze(args.config.as_deref(), cmd).await,
        Command::Export(cmd) => export(&cache, mode, cmd).await,
    }
}

#[instrument(level = "info", skip_all)]
fn summary(cache: &DatasetCache, mode: CountryMode, cmd: &SummaryArgs) -> Result<()> {
    let records = cache.get()?;
    let mut session = Session::new(records, mode);
    session.set_range(cmd.range.resolve(records)?);

    let counts = session.country_counts()?;
    let shown = match cmd.top {
        Some(n) => top_n(&counts, n),
        None => counts.as_slice(),
    };
    print!("{}", table::counts_table(shown, &session.range()));
    info!(countries = counts.len(), shown = shown.len(), "Summary printed");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(country = %cmd.country, page = cmd.page))]
fn news(cache: &DatasetCache, mode: CountryMode, cmd: &NewsArgs) -> Result<()> {
    let records = cache.get()?;
    let mut session = Session::new(records, mode);
    session.set_range(cmd.range.resolve(records)?);
    session.select_country(cmd.country.trim());
    session.set_page(cmd.page);

    let page = session.news_page()?;
    let country = session.selected_country().unwrap_or_default();
    print!("{}", table::news_page_table(&page, country));
    info!(
        total = page.total_items,
        page = page.number,
        pages = page.total_pages,
        "News page printed"
    );
    Ok(())
}

#[instrument(level = "info", skip_all, fields(country = %cmd.country))]
async fn analyze(config_path: Option<&str>, cmd: &AnalyzeArgs) -> Result<()> {
    let config = load_llm_config(config_path)?;
    let template = load_chat_template(cmd.template.as_deref()).await?;

    let client = AskFnWrapper {
        config: &config,
        template: &template,
    };
    let api = RetryAsk::new(client, cmd.max_retries, StdDuration::from_secs(1));
    let text = generate_analysis(&api, &cmd.country).await?;
    println!("{text}");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(json = %cmd.json_output_dir, markdown = %cmd.markdown_output_dir))]
async fn export(cache: &DatasetCache, mode: CountryMode, cmd: &ExportArgs) -> Result<()> {
    // Fail before loading anything if the outputs cannot be written.
    for dir in [&cmd.json_output_dir, &cmd.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let records = cache.get()?;
    let mut session = Session::new(records, mode);
    session.set_range(cmd.range.resolve(records)?);
    if let Some(country) = &cmd.country {
        session.select_country(country.trim());
    }
    let report = session.report(cmd.top)?;

    let json_path = json::write_snapshot(&report, &cmd.json_output_dir).await?;

    let markdown_filename = format!("{}.md", report.file_stem());
    let markdown_path = format!("{}/{}", cmd.markdown_output_dir, markdown_filename);
    tokio::fs::write(&markdown_path, markdown::report_to_markdown(&report)).await?;
    info!(path = %markdown_path, "Wrote Markdown report");

    if let Err(e) =
        indexes::update_report_index(&cmd.markdown_output_dir, &report, &markdown_filename).await
    {
        error!(error = %e, "Failed to update report index");
    }

    println!("{}", json_path.display());
    println!("{markdown_path}");
    Ok(())
}
