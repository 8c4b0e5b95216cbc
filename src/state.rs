//! Application state: settings, flashcard categories, rate limiter and the
//! optional upstream client.
//!
//! Everything is built exactly once at startup and shared behind an Arc;
//! requests only ever read from it (the limiter guards its own interior
//! mutability).

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::claude::Claude;
use crate::config::{load_flashcard_bank_from_env, Settings};
use crate::flashcards::{category_index, Category};
use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub settings: Settings,
    pub claude: Option<Claude>,
    pub limiter: RateLimiter,
    pub categories: HashMap<String, Category>,
}

impl AppState {
    /// Build state from settings: flashcard bank, rate limiter, upstream client.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: Settings) -> Self {
        let categories = category_index(load_flashcard_bank_from_env());
        info!(target: "kvenno_backend", categories = categories.len(), "Flashcard categories loaded");

        let claude = Claude::from_env();
        match &claude {
            Some(c) => {
                info!(target: "kvenno_backend", model = %c.model, "Anthropic client enabled")
            }
            None => info!(
                target: "kvenno_backend",
                "Anthropic client disabled (no API key); analysis endpoints will answer 500"
            ),
        }

        let limiter = RateLimiter::new(settings.rate_limits);
        Self { settings, claude, limiter, categories }
    }
}
