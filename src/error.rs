//! API error taxonomy and conversion to HTTP responses.
//!
//! Every failure a handler can produce maps onto one of these variants, and
//! each variant carries only a client-safe message: filesystem paths, stderr
//! output and credential names stay in the server logs.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

use crate::claude::UpstreamError;
use crate::convert::ConvertError;

#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed request field; the message names the field.
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("Of margar fyrirspurnir. Reyndu aftur eftir smá stund.")]
  TooManyRequests,

  /// A required external binary is missing (LibreOffice). Fixed message.
  #[error("{0}")]
  Dependency(String),

  #[error("Villa kom upp við umbreytingu skjalsins.")]
  Conversion,

  #[error("Ekki tókst að búa til PDF skjalið.")]
  PdfGeneration,

  /// Upstream credentials are absent; never says which variable is missing.
  #[error("Þjónustan er ekki rétt stillt.")]
  Misconfigured,

  /// Upstream non-2xx, forwarded with the upstream's own message.
  #[error("{message}")]
  Upstream { status: u16, message: String },

  #[error("Greiningin rann út á tíma. Reyndu aftur.")]
  UpstreamTimeout,

  #[error("Internal server error")]
  Internal,
}

impl ApiError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
      Self::Upstream { status, .. } => {
        StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
      }
      Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
      Self::Dependency(_)
      | Self::Conversion
      | Self::PdfGeneration
      | Self::Misconfigured
      | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(target: "kvenno_backend", %status, error = %self, "Request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

impl From<UpstreamError> for ApiError {
  fn from(err: UpstreamError) -> Self {
    match err {
      UpstreamError::Status { status, message } => Self::Upstream { status, message },
      UpstreamError::TimedOut => Self::UpstreamTimeout,
      UpstreamError::Transport(e) => {
        tracing::error!(target: "kvenno_backend", error = %e, "Upstream transport failure");
        Self::Internal
      }
    }
  }
}

impl From<ConvertError> for ApiError {
  fn from(err: ConvertError) -> Self {
    tracing::error!(target: "convert", error = %err, "Document conversion failed");
    match err {
      ConvertError::ConverterUnavailable => {
        Self::Dependency("Skjalabreyting er ekki tiltæk: LibreOffice vantar á þjóninn.".into())
      }
      _ => Self::Conversion,
    }
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_the_taxonomy() {
    assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::TooManyRequests.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(ApiError::UpstreamTimeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(ApiError::Misconfigured.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn upstream_status_is_forwarded() {
    let e = ApiError::Upstream { status: 429, message: "overloaded".into() };
    assert_eq!(e.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(e.to_string(), "overloaded");
  }

  #[test]
  fn misconfigured_message_names_no_credential() {
    let msg = ApiError::Misconfigured.to_string();
    assert!(!msg.contains("CLAUDE"));
    assert!(!msg.contains("ANTHROPIC"));
  }
}
