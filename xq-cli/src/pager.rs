//! Handing output to a pager, or straight to stdout.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};

use anyhow::Context;
use xq_common::warn_once;

/// Environment variable naming the pager command.
pub const PAGER_ENV: &str = "PAGER";

/// Used when `PAGER` is unset or blank.
pub const DEFAULT_PAGER: &str = "less -R -F -X";

/// An external pager command, split into program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    program: String,
    args: Vec<String>,
}

impl Pager {
    /// The pager from `PAGER`, or [`DEFAULT_PAGER`].
    ///
    /// # Errors
    ///
    /// When `PAGER` is not a valid shell command line.
    pub fn from_env() -> anyhow::Result<Self> {
        let configured = std::env::var(PAGER_ENV).unwrap_or_default();
        Self::parse(&configured)
    }

    /// Split `command` with shell quoting rules; blank means the default.
    ///
    /// # Errors
    ///
    /// Unbalanced quotes or a trailing escape.
    pub fn parse(command: &str) -> anyhow::Result<Self> {
        let command = if command.trim().is_empty() {
            DEFAULT_PAGER
        } else {
            command
        };
        let mut words = shell_words::split(command)
            .with_context(|| format!("invalid {PAGER_ENV} command `{command}`"))?
            .into_iter();
        let program = words
            .next()
            .with_context(|| format!("empty {PAGER_ENV} command `{command}`"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// The executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Its arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Copy everything from `reader` into `pager`'s stdin, or to stdout when
/// there is no pager or it cannot be started. Returns once the pager exits.
///
/// # Errors
///
/// Write failures, including [`io::ErrorKind::BrokenPipe`] when the pager
/// or stdout closes before the end of the output.
pub fn deliver<R: Read + ?Sized>(reader: &mut R, pager: Option<&Pager>) -> io::Result<()> {
    let Some(pager) = pager else {
        return copy_to_stdout(reader);
    };

    let spawned = Command::new(pager.program())
        .args(pager.args())
        .stdin(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            warn_once(
                "pager",
                &format!("cannot start `{}`: {err}; writing to stdout", pager.program()),
            );
            return copy_to_stdout(reader);
        }
    };
    log::debug!(target: "pager", "started `{}`", pager.program());

    // Dropping stdin after the copy is the pager's end of input.
    let copied = child
        .stdin
        .take()
        .map_or(Ok(0), |mut stdin| io::copy(reader, &mut stdin));
    let status = child.wait()?;
    if !status.success() {
        log::debug!(target: "pager", "`{}` exited with {status}", pager.program());
    }
    copied.map(|_| ())
}

fn copy_to_stdout<R: Read + ?Sized>(reader: &mut R) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let _ = io::copy(reader, &mut stdout)?;
    stdout.flush()
}
