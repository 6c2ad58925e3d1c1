//! Typed errors for the engine.
//!
//! [`Error`] gathers every failure a run can end with so the binary can match
//! on the kind. A broken pipe is its own variant: it means the consumer went
//! away, and the top level treats it as success.

use std::io;

use thiserror::Error;
use xq_format::ConfigError;
use xq_query::QueryError;
use xq_xml::ParseError;

/// Failures of the conduit between producer and consumer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The consumer closed its end before the producer finished.
    #[error("broken pipe")]
    BrokenPipe,

    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// The producer thread panicked instead of returning.
    #[error("producer thread panicked")]
    ProducerPanicked,
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            Self::BrokenPipe
        } else {
            Self::Io(err)
        }
    }
}

/// Everything a run can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not well-formed XML.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The query is malformed, or single mode found nothing.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Formatting options or the config file are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Moving bytes between input, producer and consumer failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Pipeline(err.into())
    }
}

impl Error {
    /// Whether the run only stopped because the consumer went away.
    #[must_use]
    pub const fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Pipeline(PipelineError::BrokenPipe))
    }
}
