//! Produto CLI Library
//!
//! Command-line interface for the product registration end-to-end suite.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, DriverArg, FormatArg, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_json, OutputFormat, ProgressReporter};
pub use runner::{apply_overrides, load_config, SuiteRunner};
