//! Configuration file support.
//!
//! Settings live in `$XDG_CONFIG_HOME/scicalc/config.toml`. Every key is
//! optional:
//!
//! ```toml
//! angle_mode = "rad"
//! layout = "basic"
//! thousands_separators = true
//! auto_close_parens = true
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculator::AngleMode;
use crate::keypad::Layout;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Angle mode the keypad starts in.
    pub angle_mode: AngleMode,
    /// Keypad layout.
    pub layout: Layout,
    /// Group result digits in threes on the display.
    pub thousands_separators: bool,
    /// Close unbalanced parentheses before evaluating.
    pub auto_close_parens: bool,
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scicalc").join("config.toml"))
    }

    /// Load the config from `path`, or from the default location when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loading config");
                Self::parse(&contents).map_err(|source| ConfigError::Parse { path, source })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Parse config file contents.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.angle_mode, AngleMode::Degrees);
        assert_eq!(config.layout, Layout::Scientific);
        assert!(!config.thousands_separators);
        assert!(!config.auto_close_parens);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            angle_mode = "rad"
            layout = "basic"
            thousands_separators = true
            auto_close_parens = true
            "#,
        )
        .unwrap();
        assert_eq!(config.angle_mode, AngleMode::Radians);
        assert_eq!(config.layout, Layout::Basic);
        assert!(config.thousands_separators);
        assert!(config.auto_close_parens);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Config::parse(r#"angle_mode = "grad""#).is_err());
        assert!(Config::parse("colour = 3").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/scicalc/config.toml");
        assert!(matches!(
            Config::load(Some(path)),
            Err(ConfigError::Read { .. })
        ));
    }
}
