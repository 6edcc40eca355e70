//! `tabula.toml` configuration.
//!
//! ```toml
//! [browser]
//! page_size = 10
//! page_window = 2
//!
//! [export]
//! output_dir = "exports"
//! rows_per_page = 25
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabula_core::paginate::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_WINDOW};
use tabula_report::DEFAULT_ROWS_PER_PAGE;
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "tabula.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub page_size: NonZeroUsize,
    /// Pages shown on each side of the current one in the page index.
    pub page_window: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_window: DEFAULT_PAGE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub rows_per_page: NonZeroUsize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `tabula.toml` in the working
    /// directory is used when present, and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("No {CONFIG_FILE_NAME} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::parse("[browser]\npage_size = 25\n").unwrap();
        assert_eq!(config.browser.page_size.get(), 25);
        assert_eq!(config.browser.page_window, DEFAULT_PAGE_WINDOW);
        assert_eq!(config.export, ExportConfig::default());
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(Config::parse("[browser]\npage_size = 0\n").is_err());
        assert!(Config::parse("[export]\nrows_per_page = 0\n").is_err());
    }

    #[test]
    fn export_section_is_read() {
        let config =
            Config::parse("[export]\noutput_dir = \"out/lists\"\nrows_per_page = 40\n").unwrap();
        assert_eq!(config.export.output_dir, PathBuf::from("out/lists"));
        assert_eq!(config.export.rows_per_page.get(), 40);
    }

    #[test]
    fn explicit_path_must_exist() {
        let error = Config::load(Some(Path::new("/nonexistent/tabula.toml"))).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
