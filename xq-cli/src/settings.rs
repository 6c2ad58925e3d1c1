//! Resolving flags and config files into one immutable [`Settings`] value.

use xq_dom::Grammar;
use xq_engine::{Job, QueryRequest};
use xq_format::{ColorMode, ConfigError, FormatOptions};
use xq_query::{QueryLanguage, QueryMode};

use crate::cli::Cli;
use crate::config::FileConfig;

/// What a run does, fixed before any input is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Indentation and color.
    pub options: FormatOptions,
    /// `Some(Html)` when HTML parsing is forced.
    pub grammar: Option<Grammar>,
    /// The query, if any.
    pub query: Option<QueryRequest>,
}

impl Settings {
    /// Combine command-line flags with config file values; flags win.
    ///
    /// An indent width and `tab` from the same source conflict. When they
    /// come from different sources the command line decides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IndentOutOfRange`] and
    /// [`ConfigError::ConflictingOptions`].
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<Self, ConfigError> {
        let (indent, tab) = match (cli.indent, cli.tab) {
            (None, false) => (file.indent, file.tab.unwrap_or(false)),
            (indent, tab) => (indent, tab),
        };

        let color = if cli.color || cli.no_color {
            ColorMode::from_flags(cli.color, cli.no_color)
        } else {
            ColorMode::from_flags(
                file.color.unwrap_or(false),
                file.no_color.unwrap_or(false),
            )
        };

        let options = FormatOptions::new(indent, tab, color)?;
        let html = cli.html || file.html.unwrap_or(false);

        Ok(Self {
            options,
            grammar: html.then_some(Grammar::Html),
            query: query_request(cli),
        })
    }

    /// The producer's job for output that is (`is_tty`) or is not a terminal.
    #[must_use]
    pub fn into_job(self, is_tty: bool) -> Job {
        Job {
            grammar: self.grammar,
            query: self.query,
            options: self.options,
            is_tty,
        }
    }
}

/// `-x` before `-e` before `-q`; empty expressions count as absent.
fn query_request(cli: &Cli) -> Option<QueryRequest> {
    let given = |flag: Option<&String>| flag.filter(|e| !e.is_empty()).cloned();

    if let Some(expression) = given(cli.xpath.as_ref()) {
        Some(QueryRequest::new(expression, QueryLanguage::XPath, QueryMode::Multi))
    } else if let Some(expression) = given(cli.extract.as_ref()) {
        Some(QueryRequest::new(expression, QueryLanguage::XPath, QueryMode::Single))
    } else {
        given(cli.query.as_ref()).map(|e| QueryRequest::new(e, QueryLanguage::Css, QueryMode::Multi))
    }
}
