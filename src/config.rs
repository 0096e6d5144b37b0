//! Application-level configuration loading for the duel server.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DIGIT_DUEL_BACK_CONFIG_PATH";

/// Secret/guess length used when the configuration does not specify one.
const DEFAULT_CODE_LENGTH: usize = 4;
/// Room-code length used when the configuration does not specify one.
const DEFAULT_ROOM_CODE_LENGTH: usize = 6;
/// Grace period before a room with a dropped connection is reaped.
const DEFAULT_DISCONNECT_GRACE_SECS: u64 = 5 * 60;

/// Longest secret length the evaluator is expected to handle sensibly.
const MAX_CODE_LENGTH: usize = 12;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    code_length: usize,
    room_code_length: usize,
    disconnect_grace: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        code_length = config.code_length,
                        "loaded configuration"
                    );
                    config
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

    /// Fixed number of digits in every secret and guess.
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Number of characters in generated room codes.
    pub fn room_code_length(&self) -> usize {
        self.room_code_length
    }

    /// How long a disconnected room is kept alive before the reaper deletes it.
    pub fn disconnect_grace(&self) -> Duration {
        self.disconnect_grace
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            room_code_length: DEFAULT_ROOM_CODE_LENGTH,
            disconnect_grace: Duration::from_secs(DEFAULT_DISCONNECT_GRACE_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    code_length: Option<usize>,
    room_code_length: Option<usize>,
    disconnect_grace_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let code_length = match value.code_length {
            Some(length) if (1..=MAX_CODE_LENGTH).contains(&length) => length,
            Some(length) => {
                warn!(
                    code_length = length,
                    "configured code length out of range; using default"
                );
                defaults.code_length
            }
            None => defaults.code_length,
        };

        let room_code_length = match value.room_code_length {
            Some(length) if length >= 4 => length,
            Some(length) => {
                warn!(
                    room_code_length = length,
                    "configured room-code length too short; using default"
                );
                defaults.room_code_length
            }
            None => defaults.room_code_length,
        };

        let disconnect_grace = value
            .disconnect_grace_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.disconnect_grace);

        Self {
            code_length,
            room_code_length,
            disconnect_grace,
        }
    }
}

/// Resolve the configuration path from the environment, with a default.
fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.code_length(), 4);
        assert_eq!(config.room_code_length(), 6);
        assert_eq!(config.disconnect_grace(), Duration::from_secs(300));
    }

    #[test]
    fn raw_values_are_applied() {
        let raw = RawConfig {
            code_length: Some(5),
            room_code_length: Some(8),
            disconnect_grace_secs: Some(60),
        };
        let config: AppConfig = raw.into();
        assert_eq!(config.code_length(), 5);
        assert_eq!(config.room_code_length(), 8);
        assert_eq!(config.disconnect_grace(), Duration::from_secs(60));
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let raw = RawConfig {
            code_length: Some(0),
            room_code_length: Some(1),
            disconnect_grace_secs: None,
        };
        let config: AppConfig = raw.into();
        assert_eq!(config.code_length(), 4);
        assert_eq!(config.room_code_length(), 6);
    }
}
