//! Application-level configuration loading: game rules, fallbacks and the score location.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::rules::GameRules;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PIXEL_COVER_CONFIG_PATH";
/// Artist searched when the catalog cannot come up with a random one.
const DEFAULT_FALLBACK_ARTIST: &str = "Daft Punk";
/// Default location of the persisted XP balance.
const DEFAULT_SCORE_PATH: &str = "data/score.json";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    rules: GameRules,
    fallback_artist: String,
    score_path: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        max_guesses = app_config.rules.max_guesses,
                        fallback_artist = %app_config.fallback_artist,
                        "loaded game configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Guess, pixelation, timer and XP constants.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Artist name used when the catalog has no random suggestion.
    pub fn fallback_artist(&self) -> &str {
        &self.fallback_artist
    }

    /// File holding the persisted XP balance.
    pub fn score_path(&self) -> &PathBuf {
        &self.score_path
    }

    /// Replace the game rules, mostly for tests.
    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules.normalized();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            fallback_artist: DEFAULT_FALLBACK_ARTIST.to_string(),
            score_path: PathBuf::from(DEFAULT_SCORE_PATH),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    rules: GameRules,
    fallback_artist: Option<String>,
    score_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            rules: value.rules.normalized(),
            fallback_artist: value
                .fallback_artist
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.fallback_artist),
            score_path: value.score_path.unwrap_or(defaults.score_path),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
