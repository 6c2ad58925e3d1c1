//! Diagnostics with colored terminal output.
//!
//! Installs a small stderr backend for the `log` facade so every component can
//! use `log::debug!` and friends, and provides deduplication to avoid spamming
//! the same warning multiple times.

use std::collections::HashSet;
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use strum_macros::{Display, EnumString};

/// Environment variable that overrides the log level.
pub const LOG_ENV: &str = "XQ_LOG";

/// Verbosity of the stderr logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    /// Nothing is printed.
    Off,
    /// Only errors.
    Error,
    /// Errors and warnings (the default).
    Warn,
    /// Informational messages.
    Info,
    /// Parser recovery notes, pipeline decisions.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Resolve the effective level: `XQ_LOG` wins, then `--verbose`, then `warn`.
    #[must_use]
    pub fn resolve(verbose: bool) -> Self {
        let from_env = std::env::var(LOG_ENV)
            .ok()
            .and_then(|raw| Self::from_str(raw.trim()).ok());
        match from_env {
            Some(level) => level,
            None if verbose => Self::Debug,
            None => Self::Warn,
        }
    }

    const fn as_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// `log` backend writing one line per record to stderr.
struct StderrLogger {
    colored: bool,
}

impl StderrLogger {
    fn level_style(level: Level) -> Style {
        match level {
            Level::Error => Style::new().red().bold(),
            Level::Warn => Style::new().yellow(),
            Level::Info => Style::new().green(),
            Level::Debug => Style::new().cyan(),
            Level::Trace => Style::new().dimmed(),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = record.level().as_str().to_ascii_lowercase();
        let line = format!("[xq {}] {level}: {}", record.target(), record.args());
        let mut stderr = std::io::stderr().lock();
        // A failing stderr has nowhere left to report to.
        let _ = if self.colored {
            writeln!(stderr, "{}", line.style(Self::level_style(record.level())))
        } else {
            writeln!(stderr, "{line}")
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger { colored: false };
static COLORED_LOGGER: StderrLogger = StderrLogger { colored: true };

/// Install the stderr logger at the given level.
///
/// Calling this more than once only adjusts the level; the first installed
/// backend stays in place.
pub fn init(level: LogLevel) {
    let logger = if std::io::stderr().is_terminal() {
        &COLORED_LOGGER
    } else {
        &LOGGER
    };
    let _ = log::set_logger(logger);
    log::set_max_level(level.as_filter());
}

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recoverable problem (logged once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("config", "unknown key 'colour' in ~/.xq");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_log = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_log {
        log::warn!(target: component, "{message}");
    }
}

/// Clear all recorded warnings.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parses_case_insensitively() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("off").unwrap(), LogLevel::Off);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_level_display_is_lowercase() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn test_level_ordering_matches_verbosity() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Warn < LogLevel::Debug);
        assert_eq!(LogLevel::Debug.as_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_warn_once_deduplicates() {
        clear_warnings();
        warn_once("test", "same message");
        warn_once("test", "same message");
        let guard = WARNED.lock().unwrap();
        let set = guard.as_ref().unwrap();
        assert_eq!(
            set.iter().filter(|k| k.as_str() == "[test] same message").count(),
            1
        );
    }
}
