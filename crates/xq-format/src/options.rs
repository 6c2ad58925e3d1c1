use std::fmt;
use std::path::PathBuf;

use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Smallest accepted `--indent`.
pub const MIN_INDENT: u8 = 1;
/// Largest accepted `--indent`.
pub const MAX_INDENT: u8 = 8;
/// Indentation width when none is configured.
pub const DEFAULT_INDENT: u8 = 2;

/// Rejected formatting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--indent` outside `MIN_INDENT..=MAX_INDENT`.
    #[error("indent must be between {MIN_INDENT} and {MAX_INDENT}, got {value}")]
    IndentOutOfRange {
        /// The rejected width.
        value: i64,
    },
    /// Two options that cannot be combined.
    #[error("conflicting options: {message}")]
    ConflictingOptions {
        /// Which options clash.
        message: String,
    },
    /// A configuration file exists but could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
    /// A configuration file is not valid.
    #[error("invalid config file {}: {message}", path.display())]
    Parse {
        /// The file.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },
}

/// One level of indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentUnit {
    /// `n` spaces, 1 to 8.
    Spaces(u8),
    /// A single tab character.
    Tab,
}

impl IndentUnit {
    /// Append `depth` levels of indentation to `out`.
    pub fn push_to(self, out: &mut String, depth: usize) {
        match self {
            Self::Spaces(n) => out.extend(std::iter::repeat_n(' ', depth * usize::from(n))),
            Self::Tab => out.extend(std::iter::repeat_n('\t', depth)),
        }
    }
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self::Spaces(DEFAULT_INDENT)
    }
}

impl fmt::Display for IndentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spaces(n) => write!(f, "{n} spaces"),
            Self::Tab => f.write_str("tab"),
        }
    }
}

/// Whether to emit ANSI color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorMode {
    /// Never.
    Disabled,
    /// Always, even into a pipe or file.
    Forced,
    /// Only when the output is an interactive terminal.
    #[default]
    Default,
}

impl ColorMode {
    /// Combine `--color` and `--no-color`; `--color` wins when both are set.
    #[must_use]
    pub const fn from_flags(color: bool, no_color: bool) -> Self {
        if color {
            Self::Forced
        } else if no_color {
            Self::Disabled
        } else {
            Self::Default
        }
    }

    /// Resolve against the terminal check for the actual output sink.
    #[must_use]
    pub const fn enabled(self, is_tty: bool) -> bool {
        match self {
            Self::Disabled => false,
            Self::Forced => true,
            Self::Default => is_tty,
        }
    }
}

/// Validated formatter configuration. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatOptions {
    indent: IndentUnit,
    color: ColorMode,
}

impl FormatOptions {
    /// Build options from an optional indent width and the `--tab` flag.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::IndentOutOfRange`] unless `1 <= indent <= 8`.
    /// - [`ConfigError::ConflictingOptions`] when both an indent width and
    ///   `tab` are given.
    pub fn new(indent: Option<i64>, tab: bool, color: ColorMode) -> Result<Self, ConfigError> {
        let indent = match (indent, tab) {
            (Some(value), true) => {
                return Err(ConfigError::ConflictingOptions {
                    message: format!("--indent {value} and --tab"),
                });
            }
            (None, true) => IndentUnit::Tab,
            (None, false) => IndentUnit::default(),
            (Some(value), false) => match u8::try_from(value) {
                Ok(n) if (MIN_INDENT..=MAX_INDENT).contains(&n) => IndentUnit::Spaces(n),
                _ => return Err(ConfigError::IndentOutOfRange { value }),
            },
        };
        Ok(Self { indent, color })
    }

    /// The indentation unit.
    #[must_use]
    pub const fn indent(&self) -> IndentUnit {
        self.indent
    }

    /// The color mode.
    #[must_use]
    pub const fn color(&self) -> ColorMode {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_bounds() {
        for bad in [0, 9, -1, 300] {
            match FormatOptions::new(Some(bad), false, ColorMode::Disabled) {
                Err(ConfigError::IndentOutOfRange { value }) => assert_eq!(value, bad),
                other => panic!("Expected IndentOutOfRange for {bad}, got {other:?}"),
            }
        }
        for good in [1, 8] {
            let options = FormatOptions::new(Some(good), false, ColorMode::Disabled).unwrap();
            assert_eq!(options.indent(), IndentUnit::Spaces(u8::try_from(good).unwrap()));
        }
    }

    #[test]
    fn test_tab_and_default() {
        let tab = FormatOptions::new(None, true, ColorMode::Default).unwrap();
        assert_eq!(tab.indent(), IndentUnit::Tab);
        let default = FormatOptions::new(None, false, ColorMode::Default).unwrap();
        assert_eq!(default.indent(), IndentUnit::Spaces(2));
        assert!(matches!(
            FormatOptions::new(Some(4), true, ColorMode::Default),
            Err(ConfigError::ConflictingOptions { .. })
        ));
    }

    #[test]
    fn test_color_flags() {
        assert_eq!(ColorMode::from_flags(true, true), ColorMode::Forced);
        assert_eq!(ColorMode::from_flags(false, true), ColorMode::Disabled);
        assert_eq!(ColorMode::from_flags(false, false), ColorMode::Default);
        assert!(ColorMode::Default.enabled(true));
        assert!(!ColorMode::Default.enabled(false));
        assert!(ColorMode::Forced.enabled(false));
        assert_eq!("FORCED".parse::<ColorMode>(), Ok(ColorMode::Forced));
    }

    #[test]
    fn test_indent_unit() {
        let mut out = String::new();
        IndentUnit::Spaces(3).push_to(&mut out, 2);
        assert_eq!(out, "      ");
        out.clear();
        IndentUnit::Tab.push_to(&mut out, 2);
        assert_eq!(out, "\t\t");
    }
}
