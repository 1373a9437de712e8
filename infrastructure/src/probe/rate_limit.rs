//! Rate-limit probe
//!
//! Sends the smallest possible request and, if it fails, reports the
//! provider's retry and quota headers in human-friendly form.

use chrono::{DateTime, Local, TimeDelta, Utc};
use lab_application::GatewayError;
use lab_domain::ChatMessage;
use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::providers::OpenAiChatModel;

pub const PROBE_PROMPT: &str = "ping";
pub const PROBE_MAX_TOKENS: u32 = 5;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Rate-limit headers as the provider sent them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub retry_after: Option<String>,
    pub remaining: Option<String>,
    pub limit: Option<String>,
    pub reset: Option<String>,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            retry_after: get("retry-after"),
            remaining: get("x-ratelimit-remaining"),
            limit: get("x-ratelimit-limit"),
            reset: get("x-ratelimit-reset"),
        }
    }
}

/// How long to wait, from a `retry-after` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAfter {
    pub seconds: u64,
    pub wait: String,
    /// Local time at which the limit should have lifted
    pub ready_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    /// The request went through
    NotLimited,
    Failed {
        status: u16,
        error: String,
        headers: RateLimitHeaders,
        retry_after: Option<Result<RetryAfter, String>>,
        reset_utc: Option<Result<String, String>>,
    },
}

impl ProbeReport {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProbeReport::Failed { status: 429, .. })
    }

    fn from_failure(status: u16, error: String, headers: RateLimitHeaders) -> Self {
        let now = Local::now();
        let retry_after = headers
            .retry_after
            .as_deref()
            .map(|raw| interpret_retry_after(raw, now));
        let reset_utc = headers.reset.as_deref().map(reset_to_utc_iso);
        ProbeReport::Failed {
            status,
            error,
            headers,
            retry_after,
            reset_utc,
        }
    }
}

/// Send one minimal request and describe what came back.
///
/// Transport failures (no token, connection refused) are errors; any HTTP
/// response, successful or not, is a report.
pub async fn probe(model: &OpenAiChatModel) -> Result<ProbeReport, ProbeError> {
    let mut request = model.build_request(&[ChatMessage::user(PROBE_PROMPT)], &[]);
    request.max_tokens = Some(PROBE_MAX_TOKENS);
    request.temperature = 0.0;

    info!(model = %model.config().model, "Probing rate limit status");
    let response = model.post(&request).await?;
    let status = response.status();
    if status.is_success() {
        return Ok(ProbeReport::NotLimited);
    }

    let headers = RateLimitHeaders::from_headers(response.headers());
    let body = response.text().await.unwrap_or_default();
    let error = format!(
        "HTTP {} {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        body
    );
    warn!(status = status.as_u16(), "Probe request failed");
    Ok(ProbeReport::from_failure(status.as_u16(), error, headers))
}

/// `Xh Ym Zs`
pub fn pretty_wait(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}h {}m {}s", hours, minutes, secs)
}

/// Parse a `retry-after` seconds value (fractions are truncated)
pub fn interpret_retry_after(raw: &str, now: DateTime<Local>) -> Result<RetryAfter, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Could not parse Retry-After value '{}': {}", raw, e))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Could not parse Retry-After value '{}'", raw));
    }
    let seconds = value as u64;
    let ready_at = i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| format!("Retry-After value '{}' is out of range", raw))?;
    Ok(RetryAfter {
        seconds,
        wait: pretty_wait(seconds),
        ready_at: ready_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

/// Epoch seconds to an ISO-8601 UTC timestamp
pub fn reset_to_utc_iso(raw: &str) -> Result<String, String> {
    let epoch: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Could not parse x-ratelimit-reset value '{}': {}", raw, e))?;
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| format!("x-ratelimit-reset value '{}' is out of range", raw))
}
