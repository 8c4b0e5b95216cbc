//! Minimal Anthropic messages-API client for the analysis endpoints.
//!
//! We only call /v1/messages, always with a single user turn and a cached
//! system block. Calls are instrumented and log model name, latency and
//! token usage (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 8192;

/// Hard abort for one upstream call. The frontend shows its own spinner
/// timeout slightly above this.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(85);

#[derive(Debug)]
pub enum UpstreamError {
  /// Upstream answered with a non-2xx status; message extracted from its body.
  Status { status: u16, message: String },
  /// The 85-second abort fired before the upstream answered.
  TimedOut,
  /// Connection-level failure (DNS, TLS, socket).
  Transport(String),
}

impl std::fmt::Display for UpstreamError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Status { status, message } => write!(f, "upstream HTTP {}: {}", status, message),
      Self::TimedOut => write!(f, "upstream call timed out"),
      Self::Transport(e) => write!(f, "upstream transport error: {}", e),
    }
  }
}

#[derive(Clone)]
pub struct Claude {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  pub model: String,
}

impl Claude {
  /// Construct the client if either CLAUDE_API_KEY or ANTHROPIC_API_KEY is
  /// set; otherwise return None and the analysis endpoints answer 500.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("CLAUDE_API_KEY")
      .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
      .ok()?;
    let base_url =
      std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

    // The outer tokio timeout is the real abort; this is a safety net.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(90))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One messages-API call: cached system block, single user turn.
  /// The `content` value is forwarded verbatim (string or content blocks).
  #[instrument(level = "info", skip(self, system, content), fields(model = %self.model, system_len = system.len()))]
  pub async fn analyze(&self, system: &str, content: Value) -> Result<Value, UpstreamError> {
    let url = format!("{}/messages", self.base_url);
    let body = json!({
      "model": self.model,
      "max_tokens": MAX_TOKENS,
      "system": [{
        "type": "text",
        "text": system,
        "cache_control": { "type": "ephemeral" }
      }],
      "messages": [{ "role": "user", "content": content }],
    });

    let start = std::time::Instant::now();
    let send = self
      .client
      .post(&url)
      .header(CONTENT_TYPE, "application/json")
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", ANTHROPIC_VERSION)
      .json(&body)
      .send();

    let res = tokio::time::timeout(UPSTREAM_TIMEOUT, send)
      .await
      .map_err(|_| UpstreamError::TimedOut)?
      .map_err(|e| {
        if e.is_timeout() {
          UpstreamError::TimedOut
        } else {
          UpstreamError::Transport(e.to_string())
        }
      })?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or_else(|| body);
      return Err(UpstreamError::Status { status, message });
    }

    // Forward the upstream JSON verbatim; only peek at usage for the logs.
    let out: Value = res
      .json()
      .await
      .map_err(|e| UpstreamError::Transport(e.to_string()))?;
    if let Some(usage) = out.get("usage") {
      info!(elapsed = ?start.elapsed(), %usage, "Anthropic usage");
    }
    Ok(out)
  }
}

/// Try to extract a clean error message from an Anthropic error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_upstream_error_message() {
    let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("Overloaded"));
  }

  #[test]
  fn opaque_bodies_yield_none() {
    assert_eq!(extract_api_error("upstream exploded"), None);
    assert_eq!(extract_api_error("{}"), None);
  }
}
