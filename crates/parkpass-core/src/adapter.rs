//! HTTP form submission against the parking-pass site.
//!
//! One call to [`SubmissionAdapter::submit`] is one attempt:
//!
//! ```text
//! GET  <site_url>/              ← session cookies
//! POST <site_url>/<submit_path> ← regnum, regreg, MODEL_CAR, PAS_PLAN_FROM
//!      HTML reply → plain text → SubmissionResult
//! ```
//!
//! Nothing here returns an error: every failure is folded into a
//! `SubmissionResult { success: false, .. }` so the caller can show it and
//! still record the attempt.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock;
use crate::config::Config;
use crate::html;
use crate::types::SubmissionResult;

pub const DEFAULT_SITE_URL: &str = "https://parkspot.ru/";
pub const DEFAULT_SUBMIT_PATH: &str = "add_data_proc_7.php";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub const TIMEOUT_MESSAGE: &str = "Таймаут соединения";
const NETWORK_PREFIX: &str = "Ошибка сети";
const GENERIC_PREFIX: &str = "Ошибка";

/// Length of the plate body; everything after it is the region code.
const PLATE_BODY_CHARS: usize = 6;

/// Anything that can turn a resolved request into a submission outcome.
pub trait Submit {
    fn submit(
        &self,
        plate: &str,
        model: &str,
        entry_time: DateTime<FixedOffset>,
    ) -> impl Future<Output = SubmissionResult>;
}

#[derive(Debug, Error)]
enum SubmitError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Setup(String),
}

impl SubmitError {
    fn into_result(self) -> SubmissionResult {
        match self {
            SubmitError::Http(e) if e.is_timeout() => SubmissionResult::failed(TIMEOUT_MESSAGE),
            // The request never left the process, e.g. an unparseable site_url.
            SubmitError::Http(e) if e.is_builder() => {
                SubmissionResult::failed(format!("{GENERIC_PREFIX}: {e}"))
            }
            SubmitError::Http(e) =>SubmissionResult::failed(format!("{NETWORK_PREFIX}: {e}")),
            SubmitError::Setup(msg) => SubmissionResult::failed(format!("{GENERIC_PREFIX}: {msg}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Plate and form helpers
// ---------------------------------------------------------------------------

/// Split a plate into its 6-character body and the trailing region code.
///
/// The split is positional and does no validation: `"А606ВО 797"` gives
/// `("А606ВО", "797")`, and anything shorter than six characters gives an
/// empty region.
pub fn split_plate(plate: &str) -> (String, String) {
    let compact: String = plate.chars().filter(|c| !c.is_whitespace()).collect();
    let body: String = compact.chars().take(PLATE_BODY_CHARS).collect();
    let region: String = compact.chars().skip(PLATE_BODY_CHARS).collect();
    (body, region)
}

/// Local civil time without a zone suffix, as the site's form expects.
pub fn format_entry_time(entry_time: DateTime<FixedOffset>) -> String {
    entry_time
        .with_timezone(&clock::civil_offset())
        .format("%Y-%m-%dT%H:%M")
        .to_string()
}

pub fn form_fields(plate: &str, model: &str, entry_time: DateTime<FixedOffset>) -> Vec<(&'static str, String)> {
    let (regnum, regreg) = split_plate(plate);
    vec![
        ("regnum", regnum),
        ("regreg", regreg),
        ("MODEL_CAR", model.to_string()),
        ("PAS_PLAN_FROM", format_entry_time(entry_time)),
    ]
}

fn classify(status: u16, text: String) -> SubmissionResult {
    if status == 200 {
        SubmissionResult::ok(text)
    } else {
        SubmissionResult::failed(format!("HTTP {status}: {text}"))
    }
}

// ---------------------------------------------------------------------------
// SubmissionAdapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SubmissionAdapter {
    site_url: String,
    submit_url: String,
    request_timeout: Duration,
    check_timeout: Duration,
}

impl SubmissionAdapter {
    pub fn new(site_url: &str, submit_path: &str) -> Self {
        let base = site_url.trim_end_matches('/');
        Self {
            site_url: format!("{base}/"),
            submit_url: format!("{base}/{}", submit_path.trim_start_matches('/')),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.site_url, &config.submit_path)
            .with_request_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_check_timeout(Duration::from_secs(config.check_timeout_secs))
    }

    /// Timeout applied separately to the landing-page GET and the form POST.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }

    fn client(&self, timeout: Duration) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Setup(e.to_string()))
    }

    async fn try_submit(
        &self,
        plate: &str,
        model: &str,
        entry_time: DateTime<FixedOffset>,
    ) -> Result<SubmissionResult, SubmitError> {
        // A fresh client per attempt gives every attempt its own cookie jar.
        let client = self.client(self.request_timeout)?;

        client.get(&self.site_url).send().await?.error_for_status()?;

        let form = form_fields(plate, model, entry_time);
        debug!(url = %self.submit_url, ?form, "posting pass form");
        let resp = client.post(&self.submit_url).form(&form).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        let text = html::truncate(&html::extract_text(&body), html::MAX_TEXT_CHARS);
        Ok(classify(status, text))
    }

    /// `true` when the landing page answers 200 within the check timeout.
    pub async fn check_site(&self) -> bool {
        let client = match self.client(self.check_timeout) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "could not build http client");
                return false;
            }
        };
        match client.get(&self.site_url).send().await {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(e) => {
                warn!(url = %self.site_url, error = %e, "site check failed");
                false
            }
        }
    }
}

impl Submit for SubmissionAdapter {
    async fn submit(
        &self,
        plate: &str,
        model: &str,
        entry_time: DateTime<FixedOffset>,
    ) -> SubmissionResult {
        info!(plate, model, entry_time = %format_entry_time(entry_time), "submitting pass request");
        let result = match self.try_submit(plate, model, entry_time).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "pass request did not reach the site");
                e.into_result()
            }
        };
        if result.success {
            info!("pass request accepted by the site");
        } else {
            warn!(message = %result.message, "pass request failed");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
