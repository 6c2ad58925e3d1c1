//! Execution engine for the xq markup tools.
//!
//! Connects the parts of a run: bytes are sniffed ([`sniff`]), parsed with
//! the chosen grammar ([`parse`]), formatted or queried ([`transform`]) and
//! streamed through a bounded [`conduit`] to a consumer running alongside the
//! producer thread ([`run_pipeline`]).
//!
//! # Example
//!
//! ```ignore
//! let job = Job { grammar: None, query: None, options, is_tty: false };
//! run_pipeline(std::io::stdin(), job, |reader| {
//!     std::io::copy(reader, &mut std::io::stdout()).map(|_| ())
//! })?;
//! ```

pub mod conduit;
mod error;
mod parse;
mod pipeline;
pub mod sniff;
mod transform;

pub use conduit::{ConduitReader, ConduitWriter, conduit};
pub use error::{Error, PipelineError};
pub use parse::parse;
pub use pipeline::{Job, run, run_pipeline};
pub use sniff::{SNIFF_LEN, Sniffed, sniff};
pub use transform::{QueryRequest, transform};
