//! Kvenno · Educational Games Backend
//!
//! - Axum HTTP API: LLM analysis proxy, DOCX→PDF conversion, flashcard PDFs
//! - Anthropic integration (via environment variables)
//! - Pure game calculation/scoring helpers under `games::`
//!
//! Important env variables:
//!   PORT            : u16 (default 8000)
//!   APP_ENV         : "production" enables strict CORS (NODE_ENV also honored)
//!   FRONTEND_URL    : extra allowed CORS origin
//!   CLAUDE_API_KEY  : enables the analysis endpoints (ANTHROPIC_API_KEY also works)
//!   SPJALD_CONFIG_PATH : path to TOML flashcard bank (optional)
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use kvenno_backend::config::Settings;
use kvenno_backend::routes::build_router;
use kvenno_backend::state::AppState;
use kvenno_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build configuration and shared application state once at startup.
  let settings = Settings::from_env();
  let state = Arc::new(AppState::new(settings));

  // Build the HTTP router with routes, CORS, security headers and tracing layers.
  let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "kvenno_backend", %addr, "HTTP server listening");
  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .with_graceful_shutdown(shutdown_signal())
  .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "kvenno_backend", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "kvenno_backend", "Shutdown signal received");
}
