use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::services::{fallback::FallbackBackend, openai::OpenAiBackend, ContentBackend};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub fallback_delay: Duration,
}

impl Config {
    /// Reads the process environment. Call after `dotenv()`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fallback_delay = match non_blank("FALLBACK_DELAY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    log::warn!("Ignoring FALLBACK_DELAY_MS={raw:?}: {e}");
                    DEFAULT_FALLBACK_DELAY
                }
            },
            None => DEFAULT_FALLBACK_DELAY,
        };

        Self {
            openai_api_key: non_blank("OPENAI_API_KEY"),
            openai_model: non_blank("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: non_blank("OPENAI_BASE_URL"),
            fallback_delay,
        }
    }

    /// Picks the generation strategy once for the lifetime of the server.
    pub fn backend(&self) -> Arc<dyn ContentBackend> {
        match &self.openai_api_key {
            Some(api_key) => {
                log::info!("OPENAI_API_KEY set, streaming from {}", self.openai_model);
                Arc::new(OpenAiBackend::new(
                    api_key,
                    &self.openai_model,
                    self.openai_base_url.as_deref(),
                ))
            }
            None => {
                log::info!("OPENAI_API_KEY not set, using template fallback");
                Arc::new(FallbackBackend::new(self.fallback_delay))
            }
        }
    }
}
