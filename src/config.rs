//! Configuration loading for retrotype.
//!
//! Settings are read once at startup from a TOML file, by default
//! `~/.retrotype/config.toml`:
//!
//! ```toml
//! # Physical line capacity in columns
//! width = 80
//!
//! # Carriage-return automatically in the margin bell zone
//! autoreturn = false
//!
//! # Line spacing: 0 = 1, 1 = 1.5, 2 = 2
//! spacing_index = 1
//!
//! # Columns before the right margin where the bell zone begins
//! margin_bell = 8
//!
//! left_margin = 0
//!
//! # Folder for session transcripts and the log file
//! save_folder = "/home/me/.retrotype"
//!
//! # What a lone Escape does: "quit" or "ignore"
//! bare_escape = "quit"
//!
//! # Receipt printer device node
//! printer_device = "/dev/usb/lp0"
//!
//! use_file = true
//! use_printer = true
//! ```
//!
//! Configuration is a precondition: a missing or malformed file stops the
//! program before the terminal is touched. `--write-default-config` creates
//! a starter file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::discipline::{TypewriterSettings, SPACING_CHOICES};
use crate::core::session::BareEscape;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {path} (use --write-default-config to create one)")]
    Missing { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the home directory")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Physical line capacity in columns
    pub width: usize,
    /// Autoreturn default
    pub autoreturn: bool,
    /// Line spacing index (0 = 1, 1 = 1.5, 2 = 2)
    pub spacing_index: usize,
    /// Columns before the right margin where the bell zone begins
    pub margin_bell: usize,
    /// Left margin default
    pub left_margin: usize,
    /// Folder for session transcripts and the log file
    pub save_folder: PathBuf,
    /// Bare-escape policy
    pub bare_escape: BareEscapePolicy,
    /// Receipt printer device node
    pub printer_device: PathBuf,
    /// Master switch for the file sink
    pub use_file: bool,
    /// Master switch for the printer sink
    pub use_printer: bool,
}

/// Serializable mirror of [`BareEscape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BareEscapePolicy {
    Quit,
    Ignore,
}

impl From<BareEscapePolicy> for BareEscape {
    fn from(policy: BareEscapePolicy) -> Self {
        match policy {
            BareEscapePolicy::Quit => BareEscape::Quit,
            BareEscapePolicy::Ignore => BareEscape::Ignore,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 80,
            autoreturn: false,
            spacing_index: 1,
            margin_bell: 8,
            left_margin: 0,
            save_folder: home_dir()
                .map(|h| h.join(".retrotype"))
                .unwrap_or_else(|| PathBuf::from(".retrotype")),
            bare_escape: BareEscapePolicy::Quit,
            printer_device: PathBuf::from("/dev/usb/lp0"),
            use_file: true,
            use_printer: true,
        }
    }
}

impl Config {
    /// Default configuration file path: `~/.retrotype/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        home_dir()
            .map(|h| h.join(".retrotype").join("config.toml"))
            .ok_or(ConfigError::NoHome)
    }

    /// Load and validate the configuration. Missing or malformed files are
    /// errors: configuration is a startup precondition.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to `path`, creating parent folders.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| ConfigError::Invalid(format!("failed to serialize defaults: {}", e)))?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.width < 2 {
            return Err(ConfigError::Invalid(format!(
                "width must be at least 2, got {}",
                self.width
            )));
        }
        if self.spacing_index >= SPACING_CHOICES.len() {
            return Err(ConfigError::Invalid(format!(
                "spacing_index must be 0, 1 or 2, got {}",
                self.spacing_index
            )));
        }
        if self.left_margin >= self.width {
            return Err(ConfigError::Invalid(format!(
                "left_margin must lie within [0, {}), got {}",
                self.width, self.left_margin
            )));
        }
        Ok(())
    }

    /// Seed typewriter settings from this configuration. The right margin
    /// starts at the full line width.
    pub fn typewriter_settings(&self) -> TypewriterSettings {
        TypewriterSettings {
            width: self.width,
            spacing_index: self.spacing_index,
            autoreturn: self.autoreturn,
            margin_bell: self.margin_bell,
            margin_release: false,
            left_margin: self.left_margin,
            right_margin: self.width,
        }
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("retrotype-test-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let path = temp_file("bad.toml", "width = \"eighty\"");
        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_file("partial.toml", "width = 60\nautoreturn = true\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.width, 60);
        assert!(config.autoreturn);
        assert_eq!(config.spacing_index, 1);
        assert_eq!(config.margin_bell, 8);
        assert!(config.use_file);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_bare_escape_policy_parses() {
        let path = temp_file("escape.toml", "bare_escape = \"ignore\"");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.bare_escape, BareEscapePolicy::Ignore);
        assert_eq!(BareEscape::from(config.bare_escape), BareEscape::Ignore);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let path = temp_file("spacing.toml", "spacing_index = 3");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
        let _ = fs::remove_file(&path);

        let path = temp_file("margin.toml", "width = 40\nleft_margin = 40");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_default_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "retrotype-test-{}-default/config.toml",
            std::process::id()
        ));
        Config::write_default(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.width, 80);
        assert_eq!(config.bare_escape, BareEscapePolicy::Quit);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_settings_seed() {
        let config = Config {
            width: 60,
            left_margin: 4,
            ..Config::default()
        };
        let settings = config.typewriter_settings();
        assert_eq!(settings.width, 60);
        assert_eq!(settings.right_margin, 60);
        assert_eq!(settings.left_margin, 4);
        assert!(!settings.margin_release);
    }
}
