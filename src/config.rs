//! Runtime configuration: env-derived settings, CORS allow-list, rate-limit
//! windows, and the optional TOML flashcard bank.
//!
//! Everything is built once at startup and handed to `AppState`; nothing here
//! is a module-level mutable singleton, so tests can construct fresh
//! instances with whatever values they need.

use serde::Deserialize;
use tracing::{error, info};

/// Per-minute request budgets, keyed by endpoint bucket.
#[derive(Clone, Copy, Debug)]
pub struct RateLimits {
  pub analyze_per_min: u32,
  pub convert_per_min: u32,
  pub pdf_per_min: u32,
}

impl Default for RateLimits {
  fn default() -> Self {
    Self { analyze_per_min: 10, convert_per_min: 20, pdf_per_min: 30 }
  }
}

/// Process-wide settings, read from the environment exactly once.
#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub production: bool,
  pub frontend_url: Option<String>,
  pub rate_limits: RateLimits,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      port: 8000,
      production: false,
      frontend_url: None,
      rate_limits: RateLimits::default(),
    }
  }
}

impl Settings {
  pub fn from_env() -> Self {
    let port = std::env::var("PORT")
      .ok()
      .and_then(|p| p.parse::<u16>().ok())
      .unwrap_or(8000);

    // APP_ENV is the native switch; NODE_ENV kept for parity with the old deploy scripts.
    let production = std::env::var("APP_ENV")
      .or_else(|_| std::env::var("NODE_ENV"))
      .map(|v| v == "production")
      .unwrap_or(false);

    let frontend_url = std::env::var("FRONTEND_URL")
      .ok()
      .map(|s| s.trim_end_matches('/').to_string())
      .filter(|s| !s.is_empty());

    Self { port, production, frontend_url, rate_limits: RateLimits::default() }
  }

  /// Origins that receive credentialed CORS responses.
  /// The localhost dev origins are only present outside production.
  pub fn allowed_origins(&self) -> Vec<String> {
    let mut origins = vec![
      "https://kvenno.app".to_string(),
      "https://www.kvenno.app".to_string(),
    ];
    if let Some(url) = &self.frontend_url {
      if !origins.contains(url) {
        origins.push(url.clone());
      }
    }
    if !self.production {
      origins.push("http://localhost:3000".to_string());
      origins.push("http://localhost:5173".to_string());
      origins.push("http://localhost:8000".to_string());
    }
    origins
  }
}

/// Flashcard bank accepted in TOML configuration (SPJALD_CONFIG_PATH).
/// Categories given here shadow built-in ones with the same id.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct FlashcardBank {
  #[serde(default)]
  pub categories: Vec<crate::flashcards::Category>,
}

/// Attempt to load `FlashcardBank` from SPJALD_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in seed categories are used alone.
pub fn load_flashcard_bank_from_env() -> Option<FlashcardBank> {
  let path = std::env::var("SPJALD_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<FlashcardBank>(&s) {
      Ok(bank) => {
        info!(target: "kvenno_backend", %path, categories = bank.categories.len(), "Loaded flashcard bank (TOML)");
        Some(bank)
      }
      Err(e) => {
        error!(target: "kvenno_backend", %path, error = %e, "Failed to parse TOML flashcard bank");
        None
      }
    },
    Err(e) => {
      error!(target: "kvenno_backend", %path, error = %e, "Failed to read TOML flashcard bank");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dev_settings_include_localhost_origins() {
    let s = Settings::default();
    let origins = s.allowed_origins();
    assert!(origins.contains(&"https://kvenno.app".to_string()));
    assert!(origins.iter().any(|o| o.starts_with("http://localhost")));
  }

  #[test]
  fn production_settings_drop_localhost_origins() {
    let s = Settings { production: true, ..Settings::default() };
    assert!(s.allowed_origins().iter().all(|o| !o.contains("localhost")));
  }

  #[test]
  fn frontend_url_is_added_once() {
    let s = Settings {
      frontend_url: Some("https://kvenno.app".to_string()),
      ..Settings::default()
    };
    let origins = s.allowed_origins();
    let hits = origins.iter().filter(|o| *o == "https://kvenno.app").count();
    assert_eq!(hits, 1);
  }
}
