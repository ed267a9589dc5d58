use anyhow::{Context, Result};
use quibly_core::{Config, GeminiConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::CliArgs;

/// CLI configuration loaded from TOML file.
///
/// Every field is optional; unset fields fall through to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Gemini API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default)]
    pub model: Option<String>,

    /// API base URL
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/quibly/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("quibly");
        Ok(config_dir)
    }

    /// Return the default config file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// Returns default config if the file does not exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(?config_path, "Loading config");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config: {}", config_path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
            Ok(config)
        } else {
            debug!(?config_path, "Config file not found, using defaults");
            let config = Self::default();
            // Create directory and write default config
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let toml_str = toml::to_string_pretty(&config)
                .context("failed to serialize default config")?;
            std::fs::write(&config_path, toml_str).ok();
            Ok(config)
        }
    }

    /// File values layered over built-in defaults.
    pub fn to_gemini_config(&self) -> GeminiConfig {
        let mut gemini = GeminiConfig::default();
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            gemini.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            gemini.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            gemini.base_url = url.clone();
        }
        gemini.temperature = self.temperature;
        gemini.max_output_tokens = self.max_output_tokens;
        gemini
    }

    /// Resolve the effective settings.
    /// Priority: CLI argument > environment > config file > built-in default.
    pub fn resolve(&self, args: &CliArgs) -> Config {
        let mut config = Config::from_env_over(self.to_gemini_config());
        apply_args(&mut config.gemini, args);
        config
    }
}

fn apply_args(gemini: &mut GeminiConfig, args: &CliArgs) {
    if let Some(key) = &args.api_key {
        gemini.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        gemini.model = model.clone();
    }
    if let Some(url) = &args.base_url {
        gemini.base_url = url.clone();
    }
    if args.temperature.is_some() {
        gemini.temperature = args.temperature;
    }
    if args.max_output_tokens.is_some() {
        gemini.max_output_tokens = args.max_output_tokens;
    }
}
