//! Producer/consumer execution of a run.
//!
//! The producer thread reads the input, sniffs and parses it, and streams the
//! transform's output into a [`conduit`]. The caller's consumer reads the
//! other end concurrently, typically feeding a pager. The producer's outcome
//! comes back once, as its join value, after the consumer returns.

use std::io::{self, Read, Write};
use std::thread;

use xq_dom::Grammar;
use xq_format::FormatOptions;

use crate::conduit::{ConduitReader, DEFAULT_CAPACITY, conduit};
use crate::error::{Error, PipelineError};
use crate::parse::parse;
use crate::sniff::{Sniffed, sniff};
use crate::transform::{QueryRequest, transform};

/// Everything the producer needs, fixed before any input is read.
#[derive(Debug, Clone)]
pub struct Job {
    /// Forced grammar; `None` sniffs the input.
    pub grammar: Option<Grammar>,
    /// Query to run; `None` formats the whole document.
    pub query: Option<QueryRequest>,
    /// Indentation and color settings.
    pub options: FormatOptions,
    /// Whether the final output is an interactive terminal.
    pub is_tty: bool,
}

/// Run `job` over `input` synchronously, writing to `sink`.
///
/// # Errors
///
/// Parse, query and I/O failures. A sink that reports
/// [`io::ErrorKind::BrokenPipe`] yields [`PipelineError::BrokenPipe`].
pub fn run<R: Read, W: Write + ?Sized>(input: R, job: &Job, sink: &mut W) -> Result<(), Error> {
    let (grammar, bytes) = read_input(input, job.grammar)?;
    log::debug!(target: "engine", "grammar: {grammar} ({} bytes)", bytes.len());

    let tree = parse(&bytes, grammar)?;
    transform(&tree, job.query.as_ref(), &job.options, job.is_tty, sink)?;
    sink.flush()?;
    Ok(())
}

/// Run `job` on a producer thread and hand its output to `consume`.
///
/// `consume` may stop reading at any point; the producer then halts at its
/// next write. A broken pipe on either side counts as success.
///
/// # Errors
///
/// The producer's failure if it had one, otherwise the consumer's.
pub fn run_pipeline<R, C>(input: R, job: Job, consume: C) -> Result<(), Error>
where
    R: Read + Send + 'static,
    C: FnOnce(&mut ConduitReader) -> io::Result<()>,
{
    let (mut writer, mut reader) = conduit(DEFAULT_CAPACITY);
    let producer = thread::Builder::new()
        .name("xq-producer".into())
        .spawn(move || run(input, &job, &mut writer))?;

    let consumed = consume(&mut reader);
    // Unblocks a producer waiting on a full conduit.
    drop(reader);

    let produced = producer
        .join()
        .map_err(|_| PipelineError::ProducerPanicked)?;
    settle(produced, consumed)
}

fn settle(produced: Result<(), Error>, consumed: io::Result<()>) -> Result<(), Error> {
    match produced {
        Err(err) if err.is_broken_pipe() => {
            log::debug!(target: "engine", "consumer closed early, output truncated");
        }
        Err(err) => return Err(err),
        Ok(()) => {}
    }
    match consumed {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!(target: "engine", "output closed early: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
        Ok(()) => Ok(()),
    }
}

fn read_input<R: Read>(mut input: R, forced: Option<Grammar>) -> io::Result<(Grammar, Vec<u8>)> {
    let mut bytes = Vec::new();
    if let Some(grammar) = forced {
        let _ = input.read_to_end(&mut bytes)?;
        return Ok((grammar, bytes));
    }

    let Sniffed {
        is_html,
        mut reader,
    } = sniff(input);
    let _ = reader.read_to_end(&mut bytes)?;
    let grammar = if is_html { Grammar::Html } else { Grammar::Xml };
    Ok((grammar, bytes))
}
