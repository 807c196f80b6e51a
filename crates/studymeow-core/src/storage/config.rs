//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and break durations
//! - The share of a task's estimate a focus session must cover to complete it
//! - Whether sessions roll straight into the next one
//! - An optional seed for reproducible card drops
//!
//! Configuration is stored at `~/.config/studymeow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{SessionTimer, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration_secs: u64,
    #[serde(default = "default_break_duration")]
    pub break_duration_secs: u64,
    /// Fraction of the estimate a focus session must reach to complete its task.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
    #[serde(default)]
    pub auto_continue: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Seed for the drop generator. Unset means fresh entropy each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studymeow/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
}

fn default_focus_duration() -> u64 {
    DEFAULT_FOCUS_SECS
}
fn default_break_duration() -> u64 {
    DEFAULT_BREAK_SECS
}
fn default_completion_threshold() -> f64 {
    0.8
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration_secs: default_focus_duration(),
            break_duration_secs: default_break_duration(),
            completion_threshold: default_completion_threshold(),
            auto_continue: false,
        }
    }
}

impl TimerConfig {
    pub fn session_timer(&self) -> SessionTimer {
        SessionTimer::new(self.focus_duration_secs, self.break_duration_secs)
            .with_auto_continue(self.auto_continue)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn parse_for(
        existing: &serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        // Clearing is decided by the target type, not the current value.
        if matches!(value, "none" | "null") && !existing.is_string() {
            return Ok(serde_json::Value::Null);
        }
        let parsed = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")));
                }
            }
            // Optional fields: "none" clears, anything numeric sets.
            serde_json::Value::Null => match value {
                "" => serde_json::Value::Null,
                v => v
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{v}' as number")))?,
            },
            _ => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let new_value = Self::parse_for(existing, key, value)?;
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }
            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.focus_duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.focus_duration_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.timer.break_duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.break_duration_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        let threshold = self.timer.completion_threshold;
        if !(threshold > 0.0 && threshold <= 1.5) {
            return Err(ConfigError::InvalidValue {
                key: "timer.completion_threshold".into(),
                message: format!("{threshold} is outside (0, 1.5]"),
            });
        }
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/studymeow"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}
