//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Produto: end-to-end suite for the product registration form
#[derive(Parser, Debug)]
#[command(name = "produto")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the registration scenarios
    Run(RunArgs),

    /// List the registration scenarios
    List(ListArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Suite configuration file (YAML)
    #[arg(short, long, env = "PRODUTO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address of the application under test
    #[arg(long, env = "PRODUTO_BASE_URL")]
    pub base_url: Option<String>,

    /// Driver to run the scenarios on
    #[arg(long, value_enum, default_value = "chromium")]
    pub driver: DriverArg,

    /// Wait timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Wait polling interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Click Create and Exit again when the first click is swallowed
    #[arg(long)]
    pub double_dispatch: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite configuration file (YAML)
    #[arg(short, long, env = "PRODUTO_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Driver selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverArg {
    /// Real Chromium over CDP (needs the `browser` feature)
    Chromium,
    /// In-process simulation of the application
    Simulated,
}

/// Report format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    Text,
    /// JSON on stdout
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic detection
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["produto", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.driver, DriverArg::Chromium);
        assert_eq!(args.format, FormatArg::Text);
        assert!(!args.fail_fast);
        assert!(!args.double_dispatch);
        assert!(args.timeout_ms.is_none());
    }

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "produto",
            "-vv",
            "run",
            "--driver",
            "simulated",
            "--base-url",
            "http://127.0.0.1:3000/",
            "--timeout-ms",
            "2500",
            "--poll-ms",
            "50",
            "--filter",
            "TC01",
            "--fail-fast",
            "--double-dispatch",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.driver, DriverArg::Simulated);
        assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:3000/"));
        assert_eq!(args.timeout_ms, Some(2500));
        assert_eq!(args.poll_ms, Some(50));
        assert_eq!(args.filter.as_deref(), Some("TC01"));
        assert!(args.fail_fast);
        assert!(args.double_dispatch);
        assert_eq!(args.format, FormatArg::Json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["produto", "list", "--quiet", "--color", "never"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorArg::Never);
    }

    #[test]
    fn test_unknown_driver_rejected() {
        assert!(Cli::try_parse_from(["produto", "run", "--driver", "firefox"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["produto"]).is_err());
    }

    #[test]
    fn test_color_conversion() {
        let auto: ColorChoice = ColorArg::Auto.into();
        assert_eq!(auto, ColorChoice::Auto);
        let never: ColorChoice = ColorArg::Never.into();
        assert_eq!(never, ColorChoice::Never);
    }
}
