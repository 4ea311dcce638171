//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Model used for syllabus topic extraction unless configured otherwise.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Claude API key for syllabus extraction.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Claude model for syllabus extraction.
    pub model: String,

    /// Daily study hours when `--daily-hours` is not given.
    pub daily_hours: f64,

    /// Study weekdays (0 = Sunday) when `--study-days` is not given.
    #[serde(deserialize_with = "string_or_number")]
    pub study_days: String,
}

/// Accepts `study_days = 6` as well as `"6"`, since `SP_STUDY_DAYS=6` parses as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("daily_hours", &self.daily_hours)
            .field("study_days", &self.study_days)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sp.db"),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            daily_hours: 2.0,
            study_days: "1,2,3,4,5".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[allow(clippy::result_large_err)]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/sp/config.toml`, the given
    /// file, then `SP_*` environment variables.
    #[allow(clippy::result_large_err)]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("SP_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for sp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sp"))
}

/// Returns the platform-specific data directory for sp.
///
/// On Linux: `~/.local/share/sp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sp"))
}
