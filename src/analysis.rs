//! Conflict-escalation narratives from an OpenAI-compatible LLM.
//!
//! The dashboard core never talks to the network directly. Everything goes
//! through [`AskAsync`], so the aggregation side stays testable offline and
//! any text-generation endpoint can stand in for the hosted one.
//!
//! # Architecture
//!
//! - [`AskAsync`]: the narrow interface (text in, text out)
//! - [`AskFnWrapper`]: adapts `awful_aj::api::ask`
//! - [`RetryAsk`]: optional exponential backoff around any [`AskAsync`]
//! - [`generate_analysis`]: builds the fixed prompt for a country and returns
//!   the model's text unmodified
//!
//! # Retry Strategy
//!
//! Retries are off by default (`max_retries = 0`, one attempt). When enabled,
//! the delay doubles from the base delay, is capped at 30 seconds, and gets
//! 0-250ms of random jitter.

use crate::error::{DashboardError, Result};
use crate::utils::truncate_for_log;
use awful_aj::api::ask;
use awful_aj::{config, config::AwfulJadeConfig, config_dir, template, template::ChatTemplate};
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// System prompt shipped with the binary.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/conflict_escalation.yaml");

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> std::result::Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    /// Retries after the first attempt; `0` means a single attempt.
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> std::result::Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Adapts `awful_aj::api::ask` to [`AskAsync`].
#[derive(Debug)]
pub struct AskFnWrapper<'a> {
    /// Endpoint, model and credentials.
    pub config: &'a AwfulJadeConfig,
    /// System prompt and any seed messages.
    pub template: &'a ChatTemplate,
}

impl<'a> AskAsync for AskFnWrapper<'a> {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> std::result::Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(self.config, text.to_string(), self.template, None, None).await;
        let dt = t0.elapsed();

        match &res {
            Ok(_) => debug!(elapsed_ms = dt.as_millis() as u64, "API call succeeded"),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "API call failed"),
        }
        res
    }
}

/// The fixed user prompt; the country name is the only parameter.
pub fn escalation_prompt(country: &str) -> String {
    format!(
        "Analyze the risk of conflict escalation involving {country}. \
         Identify the main actors, summarize the recent events driving tension, \
         and outline the most likely escalation and de-escalation scenarios."
    )
}

/// Ask `client` for an escalation narrative about `country`.
///
/// The response text is returned exactly as the model produced it.
///
/// # Errors
///
/// - [`DashboardError::EmptyCountry`] for a blank country name
/// - [`DashboardError::Analysis`] when the call fails or the reply is blank
#[instrument(level = "info", skip(client))]
pub async fn generate_analysis<A>(client: &A, country: &str) -> Result<String>
where
    A: AskAsync<Response = String>,
{
    let country = country.trim();
    if country.is_empty() {
        return Err(DashboardError::EmptyCountry);
    }

    let t0 = Instant::now();
    let text = client
        .ask(&escalation_prompt(country))
        .await
        .map_err(|e| DashboardError::Analysis(e.to_string()))?;
    let dt = t0.elapsed();

    if text.trim().is_empty() {
        warn!(elapsed_ms = dt.as_millis() as u64, "Model returned an empty analysis");
        return Err(DashboardError::Analysis("model returned an empty response".to_string()));
    }

    info!(
        elapsed_ms = dt.as_millis() as u64,
        bytes = text.len(),
        preview = %truncate_for_log(&text, 120),
        "Analysis generated"
    );
    Ok(text)
}

/// Load the LLM client configuration, defaulting to `config.yaml` in the
/// `awful_aj` config directory.
#[instrument(level = "info")]
pub fn load_llm_config(path: Option<&str>) -> Result<AwfulJadeConfig> {
    let path = match path {
        Some(p) => p.to_string(),
        None => config_dir()
            .map_err(|e| DashboardError::Config(e.to_string()))?
            .join("config.yaml")
            .to_string_lossy()
            .into_owned(),
    };
    let conf = config::load_config(&path)
        .map_err(|e| DashboardError::Config(format!("{path}: {e}")))?;
    info!(config_path = %path, "Loaded configuration");
    Ok(conf)
}

/// Load a named template from the `awful_aj` config directory, or the
/// embedded escalation template when no name is given.
#[instrument(level = "info")]
pub async fn load_chat_template(name: Option<&str>) -> Result<ChatTemplate> {
    match name {
        Some(name) => {
            let tpl = template::load_template(name)
                .await
                .map_err(|e| DashboardError::Config(format!("template {name}: {e}")))?;
            info!(template = name, "Loaded template");
            Ok(tpl)
        }
        None => serde_yaml::from_str(DEFAULT_TEMPLATE)
            .map_err(|e| DashboardError::Config(format!("embedded template: {e}"))),
    }
}
