//! Run configuration and credential resolution.

use crate::error::ConfigError;
use honoree_core::{InputMode, DEFAULT_THRESHOLD};

/// Environment variable holding the summarization API key.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Older spelling of [`API_KEY_ENV`], still honored.
pub const LEGACY_API_KEY_ENV: &str = "MistralAPIKey";

/// Default model for the summary adapter.
pub const DEFAULT_MODEL: &str = "mistral-medium-latest";

/// Default per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Which sources run and how.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// Jurisdiction (US state) for the memorial directory.
    pub state: Option<String>,
    pub input_mode: InputMode,
    /// Fuzzy-match acceptance threshold, 0–100.
    pub threshold: u32,
    pub enable_directory: bool,
    pub enable_knowledge: bool,
    pub enable_summary: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            state: None,
            input_mode: InputMode::Auto,
            threshold: u32::from(DEFAULT_THRESHOLD),
            enable_directory: true,
            enable_knowledge: true,
            enable_summary: true,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl LookupConfig {
    /// Check everything that would make the run fail, before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold > 100 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.enable_directory && self.directory_state().is_none() {
            return Err(ConfigError::MissingState);
        }
        if self.enable_summary && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    /// The jurisdiction as the directory expects it in URLs: lower-case,
    /// spaces replaced with dashes.
    pub fn directory_state(&self) -> Option<String> {
        let state = self.state.as_deref()?.trim();
        if state.is_empty() {
            return None;
        }
        Some(
            state
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase(),
        )
    }

    /// Threshold as the matcher takes it. Call after [`validate`](Self::validate).
    pub fn threshold_u8(&self) -> u8 {
        u8::try_from(self.threshold.min(100)).unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// Resolve the summarization API key.
///
/// Priority: explicit value, then `MISTRAL_API_KEY`, then `MistralAPIKey`.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    [API_KEY_ENV, LEGACY_API_KEY_ENV]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
