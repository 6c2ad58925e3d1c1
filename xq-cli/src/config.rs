//! The `.xq` config file.
//!
//! Looked up in the home directory, then the current directory; values in the
//! second file override the first. Keys are written in lowercase or, as in
//! env-style files, in uppercase:
//!
//! ```toml
//! indent = 4
//! tab = false
//! color = false
//! no-color = true
//! html = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use xq_common::warn_once;
use xq_format::ConfigError;

/// File name looked up in each config directory.
pub const CONFIG_NAME: &str = ".xq";

const KNOWN_KEYS: &[&str] = &[
    "indent", "INDENT", "tab", "TAB", "color", "COLOR", "no-color", "NO-COLOR", "no_color",
    "NO_COLOR", "html", "HTML",
];

/// Settings read from config files. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Indentation width.
    #[serde(alias = "INDENT")]
    pub indent: Option<i64>,
    /// Indent with tabs.
    #[serde(alias = "TAB")]
    pub tab: Option<bool>,
    /// Force colors.
    #[serde(alias = "COLOR")]
    pub color: Option<bool>,
    /// Disable colors.
    #[serde(
        rename = "no-color",
        alias = "NO-COLOR",
        alias = "no_color",
        alias = "NO_COLOR"
    )]
    pub no_color: Option<bool>,
    /// Always parse as HTML.
    #[serde(alias = "HTML")]
    pub html: Option<bool>,
}

impl FileConfig {
    /// Directories searched for [`CONFIG_NAME`], lowest precedence first.
    #[must_use]
    pub fn search_dirs() -> Vec<PathBuf> {
        [dirs::home_dir(), std::env::current_dir().ok()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Load and merge the config files found in `dirs`, later directories
    /// overriding earlier ones.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`] for a file that exists
    /// but cannot be used.
    pub fn discover(dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for dir in dirs {
            if let Some(found) = Self::load(&dir.join(CONFIG_NAME))? {
                config = config.overridden_by(found);
            }
        }
        Ok(config)
    }

    /// Load one config file; `None` when there is no file at `path`.
    ///
    /// # Errors
    ///
    /// See [`FileConfig::discover`].
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(target: "config", "loading {}", path.display());
        Self::parse(&text, path).map(Some)
    }

    /// Parse config text; `path` is only used in messages.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for invalid TOML or a value of the wrong type.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let invalid = |err: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string().trim_end().to_string(),
        };

        let table: toml::Table = toml::from_str(text).map_err(invalid)?;
        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn_once(
                    "config",
                    &format!("unknown key `{key}` in {}", path.display()),
                );
            }
        }
        toml::from_str(text).map_err(invalid)
    }

    fn overridden_by(self, other: Self) -> Self {
        Self {
            indent: other.indent.or(self.indent),
            tab: other.tab.or(self.tab),
            color: other.color.or(self.color),
            no_color: other.no_color.or(self.no_color),
            html: other.html.or(self.html),
        }
    }
}
