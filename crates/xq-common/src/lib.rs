//! Common utilities for the xq markup tools.
//!
//! This crate provides shared infrastructure used by all components:
//! - **Diagnostics** - a colored stderr backend for the `log` facade, plus
//!   deduplicated warnings for recoverable input problems

pub mod diagnostics;

pub use diagnostics::{LogLevel, init, warn_once};
