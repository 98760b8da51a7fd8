//! Configuration file handling for braille-player.
//!
//! Loads configuration from `<config dir>/braille-player/config.toml` or a
//! custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::braille::ToneParams;
use crate::session::SessionConfig;

/// Configuration file structure for braille-player.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    pub fps: u32,
    pub contrast: f32,
    pub brightness: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            contrast: 1.0,
            brightness: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    /// Rows left free under the frame for the status line and help
    pub reserved_rows: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { reserved_rows: 3 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ascii_export"),
            file_name: "main.c".to_string(),
        }
    }
}

/// Commented default config written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# braille-player configuration

[playback]
# Initial frames per second (adjust live with t/g)
fps = 24
# Initial contrast, 0.1 - 3.0 (adjust live with e/d)
contrast = 1.0
# Initial brightness, -1.0 - 1.0 (adjust live with r/f)
brightness = 0.0

[terminal]
# Rows kept free below the frame for the status line
reserved_rows = 3

[export]
# Directory the generated C program is written to
dir = "ascii_export"
file_name = "main.c"
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Settings the interactive session starts from.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tone: ToneParams::new(self.playback.contrast, self.playback.brightness),
            fps: self.playback.fps.max(1),
            reserved_rows: self.terminal.reserved_rows,
        }
    }

    /// Path the exported program is written to.
    pub fn export_path(&self) -> PathBuf {
        self.export.dir.join(&self.export.file_name)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("braille-player").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/braille-player/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(&tmp.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.playback.fps, 24);
        assert_eq!(config.terminal.reserved_rows, 3);
        assert_eq!(config.export_path(), PathBuf::from("ascii_export/main.c"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[playback]\nfps = 12\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.playback.fps, 12);
        assert_eq!(config.playback.contrast, 1.0);
        assert_eq!(config.export.file_name, "main.c");
    }

    #[test]
    fn test_default_toml_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[playback\nfps = ").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_session_config_clamps() {
        let mut config = Config::default();
        config.playback.contrast = 7.5;
        config.playback.brightness = 0.25;
        config.playback.fps = 0;
        let session = config.session_config();
        assert_eq!(session.tone.contrast, 3.0);
        assert_eq!(session.tone.brightness, 0.25);
        assert_eq!(session.fps, 1);
    }

    #[test]
    fn test_nan_tone_in_file_falls_back_to_defaults() {
        use crate::session::{Event, SessionState};

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[playback]\ncontrast = nan\nbrightness = -inf\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.playback.contrast.is_nan());

        let mut state = SessionState::new(&config.session_config());
        assert_eq!(state.tone, ToneParams::default());
        for _ in 0..5 {
            state.apply(Event::IncreaseContrast);
        }
        assert!((state.tone.contrast - 1.5).abs() < 1e-5);
        assert!(state.status_line(80, 21).starts_with("Contrast: 1.5 | Brightness: 0.00"));
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        assert!(default_path().ends_with("braille-player/config.toml"));
    }
}
