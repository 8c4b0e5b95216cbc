//! Per-IP rate limiting over fixed 60-second windows.
//!
//! Single-process deployment, so the counters live in one mutex-guarded map
//! keyed by (ip, bucket). The limiter is an explicit object built from
//! `RateLimits` at startup; tests construct fresh instances with tight
//! budgets instead of poking global state.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
  extract::{ConnectInfo, Request, State},
  middleware::Next,
  response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::config::RateLimits;
use crate::error::ApiError;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);

struct Window {
  started: Instant,
  count: u32,
}

pub struct RateLimiter {
  limits: RateLimits,
  windows: Mutex<HashMap<(IpAddr, &'static str), Window>>,
}

impl RateLimiter {
  pub fn new(limits: RateLimits) -> Self {
    Self { limits, windows: Mutex::new(HashMap::new()) }
  }

  fn limit_for(&self, bucket: &str) -> u32 {
    match bucket {
      "analyze" => self.limits.analyze_per_min,
      "convert" => self.limits.convert_per_min,
      "pdf" => self.limits.pdf_per_min,
      _ => u32::MAX,
    }
  }

  /// Count one request; false once the window's budget is exhausted.
  pub fn check(&self, ip: IpAddr, bucket: &'static str) -> bool {
    let limit = self.limit_for(bucket);
    let mut windows = match self.windows.lock() {
      Ok(guard) => guard,
      // A poisoned lock means a panic elsewhere; fail open.
      Err(poisoned) => poisoned.into_inner(),
    };
    let window = windows
      .entry((ip, bucket))
      .or_insert_with(|| Window { started: Instant::now(), count: 0 });
    if window.started.elapsed() >= WINDOW {
      window.started = Instant::now();
      window.count = 0;
    }
    window.count += 1;
    window.count <= limit
  }
}

/// Which budget a request path draws from. Paths outside the three buckets
/// are not limited.
pub fn bucket_for(path: &str) -> Option<&'static str> {
  if path.starts_with("/api/analyze") {
    Some("analyze")
  } else if path.starts_with("/api/process-document") {
    Some("convert")
  } else if path.starts_with("/api/islenskubraut/pdf") {
    Some("pdf")
  } else {
    None
  }
}

pub async fn rate_limit_middleware(
  State(state): State<Arc<AppState>>,
  request: Request,
  next: Next,
) -> Response {
  if let Some(bucket) = bucket_for(request.uri().path()) {
    // ConnectInfo is absent under test harnesses; treat those as loopback.
    let ip = request
      .extensions()
      .get::<ConnectInfo<SocketAddr>>()
      .map(|c| c.0.ip())
      .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    if !state.limiter.check(ip, bucket) {
      warn!(target: "kvenno_backend", %ip, bucket, "Rate limit exceeded");
      return ApiError::TooManyRequests.into_response();
    }
  }
  next.run(request).await
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, last))
  }

  #[test]
  fn enforces_the_bucket_budget() {
    let limiter = RateLimiter::new(RateLimits {
      analyze_per_min: 2,
      convert_per_min: 20,
      pdf_per_min: 30,
    });
    assert!(limiter.check(ip(1), "analyze"));
    assert!(limiter.check(ip(1), "analyze"));
    assert!(!limiter.check(ip(1), "analyze"));
  }

  #[test]
  fn ips_are_counted_independently() {
    let limiter = RateLimiter::new(RateLimits {
      analyze_per_min: 1,
      convert_per_min: 20,
      pdf_per_min: 30,
    });
    assert!(limiter.check(ip(1), "analyze"));
    assert!(!limiter.check(ip(1), "analyze"));
    assert!(limiter.check(ip(2), "analyze"));
  }

  #[test]
  fn buckets_are_counted_independently() {
    let limiter = RateLimiter::new(RateLimits {
      analyze_per_min: 1,
      convert_per_min: 1,
      pdf_per_min: 30,
    });
    assert!(limiter.check(ip(1), "analyze"));
    assert!(limiter.check(ip(1), "convert"));
    assert!(!limiter.check(ip(1), "analyze"));
  }

  #[test]
  fn unbucketed_paths_are_never_limited() {
    assert_eq!(bucket_for("/health"), None);
    assert_eq!(bucket_for("/api/analyze"), Some("analyze"));
    assert_eq!(bucket_for("/api/analyze-2ar"), Some("analyze"));
    assert_eq!(bucket_for("/api/process-document"), Some("convert"));
    assert_eq!(bucket_for("/api/islenskubraut/pdf"), Some("pdf"));
  }
}
