use std::env;

use serde::{Deserialize, Serialize};

use crate::error::QuiblyError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str) -> Option<T> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Layer environment variables over `base` (call `load_dotenv()` first).
    /// Only variables that are actually set override `base`.
    ///
    /// Profile is read from `QUIBLY_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env_over(base: GeminiConfig) -> Self {
        let profile = env_or("QUIBLY_PROFILE", "").to_uppercase();
        Self::for_profile_over(&profile, base)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        Self::for_profile_over(profile, GeminiConfig::default())
    }

    pub fn for_profile_over(profile: &str, base: GeminiConfig) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            gemini: base.apply_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::debug!("Config loaded (profile: {}):", self.profile_label());
        tracing::debug!(
            "  gemini:      model={}, base_url={}, key={}",
            self.gemini.model,
            self.gemini.base_url,
            if self.gemini.is_configured() { "set" } else { "(none)" },
        );
    }
}

// ── Gemini ────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GeminiConfig {
    /// Override fields whose env vars are set; leave the rest as they are.
    pub fn apply_env_profiled(mut self, p: &str) -> Self {
        if let Some(key) = profiled_env_opt(p, "GEMINI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = profiled_env_opt(p, "GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(url) = profiled_env_opt(p, "GEMINI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(temperature) = profiled_env_parse(p, "GEMINI_TEMPERATURE") {
            self.temperature = Some(temperature);
        }
        if let Some(max) = profiled_env_parse(p, "GEMINI_MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = Some(max);
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Return the API key or a configuration error naming the env var to set.
    pub fn require_api_key(&self) -> Result<&str, QuiblyError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| QuiblyError::Config("GEMINI_API_KEY not set".into()))
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

// The key travels in the request URL; keep it out of `{:?}` output.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}
