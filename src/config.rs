//! Configuration management
//!
//! Settings come from an optional JSON file in the user's config directory,
//! overridden by environment variables. Command-line flags override both.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{NotelyError, Result};

// Environment variable names
pub const ENV_API_URL: &str = "NOTELY_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "NOTELY_TIMEOUT_SECS";
pub const ENV_UTC_OFFSET: &str = "NOTELY_UTC_OFFSET";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8181/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Timestamps are displayed in one fixed offset (Asia/Dhaka has no DST).
const DEFAULT_UTC_OFFSET: &str = "+06:00";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

impl Config {
    /// Load the config file (if present), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            NotelyError::Config(format!("Could not parse {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NotelyError::Config("Could not find config directory".to_string()))?;
        Ok(config_dir.join("notely").join("config.json"))
    }

    /// Apply overrides from a variable lookup. Unparseable timeouts are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(url);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = Some(secs);
        }
        if let Some(offset) = lookup(ENV_UTC_OFFSET).filter(|v| !v.trim().is_empty()) {
            self.utc_offset = Some(offset);
        }
    }

    /// Fold in values that are set on `other`.
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.utc_offset.is_some() {
            self.utc_offset = other.utc_offset;
        }
    }

    pub fn effective_api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn display_offset(&self) -> Result<FixedOffset> {
        let raw = self.utc_offset.as_deref().unwrap_or(DEFAULT_UTC_OFFSET);
        parse_utc_offset(raw)
            .ok_or_else(|| NotelyError::Config(format!("Invalid UTC offset '{}'", raw)))
    }
}

/// Parse `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.effective_api_url(), "http://127.0.0.1:8181/api/");
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.display_offset().unwrap(),
            FixedOffset::east_opt(6 * 3600).unwrap()
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config {
            api_url: Some("http://file.example/api/".to_string()),
            timeout_secs: Some(5),
            utc_offset: None,
        };
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://env.example/api/"),
            (ENV_TIMEOUT_SECS, "not-a-number"),
            (ENV_UTC_OFFSET, "-05:00"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.effective_api_url(), "http://env.example/api/");
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(
            config.display_offset().unwrap(),
            FixedOffset::west_opt(5 * 3600).unwrap()
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("http://notes.local/api/".to_string()),
            timeout_secs: Some(10),
            utc_offset: Some("+05:30".to_string()),
        };
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 3}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timeout_secs, Some(3));
        assert!(loaded.api_url.is_none());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(Config::load_from(&path), Err(NotelyError::Config(_))));
    }

    #[test]
    fn test_merge() {
        let mut config = Config {
            api_url: Some("http://a/".to_string()),
            timeout_secs: Some(1),
            utc_offset: None,
        };
        config.merge(Config {
            timeout_secs: Some(9),
            ..Config::default()
        });
        assert_eq!(config.api_url.as_deref(), Some("http://a/"));
        assert_eq!(config.timeout_secs, Some(9));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+0530"), FixedOffset::east_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("-03:00"), FixedOffset::west_opt(3 * 3600));
        assert!(parse_utc_offset("06:00").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
        assert!(parse_utc_offset("").is_none());
    }
}
