//! xq: command-line XML and HTML beautifier and content extractor.
//!
//! Reads one document from a file or stdin, then formats it or extracts the
//! nodes matching an XPath or CSS query. Output goes through a pager when
//! stdout is a terminal.

mod cli;
mod config;
mod pager;
mod settings;

use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use xq_common::{LogLevel, init};
use xq_engine::run_pipeline;

use cli::Cli;
use config::FileConfig;
use pager::{Pager, deliver};
use settings::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init(LogLevel::resolve(cli.verbose));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_broken_pipe(&err) => {
            log::debug!(target: "xq", "output closed: {err}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("xq: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let file_config =
        FileConfig::discover(&FileConfig::search_dirs()).context("failed to load config")?;
    let settings = Settings::resolve(cli, &file_config)?;

    let stdin = io::stdin();
    let input: Box<dyn Read + Send> = match cli.files.last() {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None if stdin.is_terminal() => {
            Cli::command().print_help()?;
            return Ok(());
        }
        None => Box::new(stdin),
    };

    let is_tty = io::stdout().is_terminal();
    let pager = if is_tty {
        Some(Pager::from_env()?)
    } else {
        None
    };

    run_pipeline(input, settings.into_job(is_tty), |reader| {
        deliver(reader, pager.as_ref())
    })?;
    Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<xq_engine::Error>()
            .is_some_and(xq_engine::Error::is_broken_pipe)
            || cause
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
