//! Gateway configuration
//!
//! A [`GatewayConfig`] is built once at start-up (file, then environment
//! overrides, or the builder) and shared read-only afterwards.
//!
//! Environment variables:
//! - `KINDMIND_MODE`: `mock` or `live` for every action
//! - `KINDMIND_<ACTION>_MODE`: per-action override (`ACCESSIBILITY`, `SPEECH`,
//!   `COMPANION`, `MOOD`, `SIGN_LANGUAGE`)
//! - `GEMINI_API_KEY`, `GEMINI_BASE_URL`, `GEMINI_TEXT_MODEL`,
//!   `GEMINI_VISION_MODEL`, `GEMINI_TTS_MODEL`, `GEMINI_TTS_VOICE`
//! - `PROVIDER_TIMEOUT_MS`, `PROVIDER_MAX_RETRIES`
//! - `HOST`, `PORT`

use secrecy::{ExposeSecret, Secret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::contracts::GatewayAction;
use crate::error::{GatewayError, Result};

/// Where an action's answer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Deterministic canned values, no provider contact
    #[default]
    Mock,
    /// Delegate to the generative provider
    Live,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Mock => "mock",
            SourceMode::Live => "live",
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(SourceMode::Mock),
            "live" => Ok(SourceMode::Live),
            other => Err(GatewayError::config(format!(
                "unknown mode '{}', expected 'mock' or 'live'",
                other
            ))),
        }
    }
}

/// Per-action source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayModes {
    pub accessibility: SourceMode,
    pub speech: SourceMode,
    pub companion: SourceMode,
    pub mood: SourceMode,
    pub sign_language: SourceMode,
}

impl GatewayModes {
    /// Same mode for every action
    pub fn uniform(mode: SourceMode) -> Self {
        Self {
            accessibility: mode,
            speech: mode,
            companion: mode,
            mood: mode,
            sign_language: mode,
        }
    }

    pub fn get(&self, action: GatewayAction) -> SourceMode {
        match action {
            GatewayAction::AccessibilitySuggestions => self.accessibility,
            GatewayAction::TextToSpeech => self.speech,
            GatewayAction::EmpatheticResponse => self.companion,
            GatewayAction::MoodInsights => self.mood,
            GatewayAction::SignLanguageTranslation => self.sign_language,
        }
    }

    pub fn set(&mut self, action: GatewayAction, mode: SourceMode) {
        let slot = match action {
            GatewayAction::AccessibilitySuggestions => &mut self.accessibility,
            GatewayAction::TextToSpeech => &mut self.speech,
            GatewayAction::EmpatheticResponse => &mut self.companion,
            GatewayAction::MoodInsights => &mut self.mood,
            GatewayAction::SignLanguageTranslation => &mut self.sign_language,
        };
        *slot = mode;
    }

    pub fn any_live(&self) -> bool {
        GatewayAction::ALL
            .iter()
            .any(|a| self.get(*a) == SourceMode::Live)
    }
}

/// Generative provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    /// Deadline for one provider call, retries included
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            vision_model: "gemini-2.5-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            tts_voice: "Algenib".to_string(),
            timeout_ms: 60_000,
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .map(|k| !k.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies; sign-language clips arrive inline
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub modes: GatewayModes,
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Load from a TOML or YAML file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| GatewayError::config(format!("invalid TOML in {}: {}", path.display(), e))),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| GatewayError::config(format!("invalid YAML in {}: {}", path.display(), e))),
            _ => Err(GatewayError::config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides from any lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("KINDMIND_MODE") {
            self.modes = GatewayModes::uniform(mode.parse()?);
        }
        for action in GatewayAction::ALL {
            let key = format!("KINDMIND_{}_MODE", action.as_str().to_ascii_uppercase());
            if let Some(mode) = lookup(&key) {
                self.modes.set(action, mode.parse()?);
            }
        }

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.provider.api_key = Some(Secret::new(key));
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            self.provider.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_VISION_MODEL") {
            self.provider.vision_model = model;
        }
        if let Some(model) = lookup("GEMINI_TTS_MODEL") {
            self.provider.tts_model = model;
        }
        if let Some(voice) = lookup("GEMINI_TTS_VOICE") {
            self.provider.tts_voice = voice;
        }
        if let Some(ms) = lookup("PROVIDER_TIMEOUT_MS") {
            self.provider.timeout_ms = parse_number("PROVIDER_TIMEOUT_MS", &ms)?;
        }
        if let Some(n) = lookup("PROVIDER_MAX_RETRIES") {
            self.provider.max_retries = parse_number("PROVIDER_MAX_RETRIES", &n)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        Ok(())
    }

    /// Reject configurations the gateway cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.modes.any_live() && !self.provider.has_api_key() {
            return Err(GatewayError::config(
                "live mode requires GEMINI_API_KEY (or provider.api_key)",
            ));
        }
        if self.provider.timeout_ms == 0 {
            return Err(GatewayError::config("provider timeout must be greater than zero"));
        }
        if self.provider.backoff_multiplier < 1.0 {
            return Err(GatewayError::config("backoff_multiplier must be at least 1.0"));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(GatewayError::config("provider base_url is empty"));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::config(format!("{} must be a number, got '{}'", key, value)))
}

/// Builder for GatewayConfig
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
        }
    }

    pub fn mode(mut self, mode: SourceMode) -> Self {
        self.config.modes = GatewayModes::uniform(mode);
        self
    }

    pub fn action_mode(mut self, action: GatewayAction, mode: SourceMode) -> Self {
        self.config.modes.set(action, mode);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.provider.api_key = Some(Secret::new(key.into()));
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider.base_url = url.into();
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.config.provider.timeout_ms = timeout;
        self
    }

    /// Set retry count and backoff bounds
    pub fn retries(mut self, max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        self.config.provider.max_retries = max_retries;
        self.config.provider.initial_backoff_ms = initial_backoff_ms;
        self.config.provider.max_backoff_ms = max_backoff_ms;
        self
    }

    pub fn tts_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.provider.tts_voice = voice.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
