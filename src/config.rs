//! Configuration loading and validation.
//!
//! Two sources, loaded once at startup:
//! - `homework_bot.toml` (or `$HOMEWORK_BOT_CONFIG`): non-secret settings,
//!   every field optional. A missing file means defaults.
//! - Environment and `.env`: the three secrets. Process environment wins over
//!   the `.env` file.
//!
//! Precedence for settings: env vars > config file > defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::error::ConfigError;

/// Homework review API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Seconds between poll iterations.
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;

/// OAuth token for the homework API.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Chat that receives notifications.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
/// Endpoint override, also the name reported when the endpoint is blank.
pub const ENDPOINT_VAR: &str = "HOMEWORK_BOT_ENDPOINT";

// ── Settings file ───────────────────────────────────────────────

/// Non-secret settings from `homework_bot.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Poll loop settings (`[poll]`).
    pub poll: PollSettings,
    /// Log output settings (`[logging]`).
    pub logging: LoggingSettings,
}

/// `[poll]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Homework API endpoint URL.
    pub endpoint: String,
    /// Seconds to sleep between iterations.
    pub retry_period_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            retry_period_secs: DEFAULT_RETRY_PERIOD_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for the rotating log file.
    pub dir: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Load settings with precedence: env vars > TOML file > defaults.
    ///
    /// File path: `$HOMEWORK_BOT_CONFIG` or `./homework_bot.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the merged settings fail validation.
    pub fn load(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let path = env("HOMEWORK_BOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("homework_bot.toml"));
        let mut settings = load_settings(&path)?;
        settings.apply_overrides(env);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `HOMEWORK_BOT_*` environment overrides.
    ///
    /// Takes a resolver function so tests never touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env(ENDPOINT_VAR) {
            self.poll.endpoint = v;
        }
        if let Some(v) = env("HOMEWORK_BOT_RETRY_SECS") {
            match v.parse() {
                Ok(n) => self.poll.retry_period_secs = n,
                Err(_) => tracing::warn!(
                    var = "HOMEWORK_BOT_RETRY_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("HOMEWORK_BOT_LOG_DIR") {
            self.logging.dir = PathBuf::from(v);
        }
    }

    /// Validate that values are within sane bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry period is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.poll.retry_period_secs >= 1,
            "poll.retry_period_secs must be >= 1"
        );
        Ok(())
    }
}

/// Read settings from a TOML file.
///
/// A missing file is not an error and yields [`Settings::default`].
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::info!(path = %path.display(), "loading settings from file");
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse settings at {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to read settings at {}", path.display()))
        }
    }
}

// ── Secrets ─────────────────────────────────────────────────────

/// Variable lookup over the process environment and an optional `.env` file.
#[derive(Clone, Default)]
pub struct EnvSource {
    file_vars: BTreeMap<String, String>,
    process_env: bool,
}

impl std::fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSource")
            .field("keys", &self.file_vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .field("process_env", &self.process_env)
            .finish()
    }
}

impl EnvSource {
    /// Build a source from a fixed map, ignoring the process environment.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self {
            file_vars: vars,
            process_env: false,
        }
    }

    /// Load `.env` from `path` (if it exists) layered under the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut vars = BTreeMap::new();
        if path.exists() {
            let iter = dotenvy::from_path_iter(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            for item in iter {
                let (key, value) = item.with_context(|| {
                    format!("failed to parse key-value entry in {}", path.display())
                })?;
                vars.insert(key, value);
            }
        }
        Ok(Self {
            file_vars: vars,
            process_env: true,
        })
    }

    /// Look up a variable. Process environment takes precedence.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.process_env {
            if let Ok(value) = std::env::var(key) {
                return Some(value);
            }
        }
        self.file_vars.get(key).cloned()
    }
}

// ── Runtime config ──────────────────────────────────────────────

/// Immutable runtime configuration handed to the poll loop.
#[derive(Clone)]
pub struct Config {
    /// OAuth token for the homework API.
    pub practicum_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Target chat: numeric id or `@channel` username.
    pub telegram_chat_id: String,
    /// Homework API endpoint URL.
    pub endpoint: String,
    /// Delay between iterations.
    pub retry_period: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"[REDACTED]")
            .field("telegram_token", &"[REDACTED]")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("retry_period", &self.retry_period)
            .finish()
    }
}

impl Config {
    /// Build the runtime config, enforcing the startup precondition.
    ///
    /// Checks, in order, the API token, bot token, chat id and endpoint. Each
    /// must be present and not blank. The endpoint must also be an http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn from_env(
        settings: &Settings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let practicum_token = require(PRACTICUM_TOKEN_VAR, env(PRACTICUM_TOKEN_VAR))?;
        let telegram_token = require(TELEGRAM_TOKEN_VAR, env(TELEGRAM_TOKEN_VAR))?;
        let telegram_chat_id = require(TELEGRAM_CHAT_ID_VAR, env(TELEGRAM_CHAT_ID_VAR))?;
        let endpoint = require(ENDPOINT_VAR, Some(settings.poll.endpoint.clone()))?;

        let parsed = url::Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            name: ENDPOINT_VAR,
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: ENDPOINT_VAR,
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            retry_period: Duration::from_secs(settings.poll.retry_period_secs),
        })
    }
}

fn require(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        None => Err(ConfigError::Missing(name)),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(v) => Ok(v),
    }
}
