//! Produto CLI: runs the product registration end-to-end suite
//!
//! ## Usage
//!
//! ```bash
//! produto run                                   # Run every scenario on Chromium
//! produto run --driver simulated                # Run against the simulated app
//! produto run --filter TC01 --format json       # One scenario, JSON report
//! produto list                                  # List scenarios
//! produto config --config suite.yaml            # Show effective configuration
//! ```

use clap::Parser;
use produto_cli::{
    load_config, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs,
    ListArgs, ProgressReporter, RunArgs, SuiteRunner, Verbosity,
};
use produto_e2e::{catalog, Expectation, TestHarness};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Run(args) => run_scenarios(&config, &args),
        Commands::List(args) => {
            run_list(&args);
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_scenarios(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let runner = SuiteRunner::from_args(args)?;
    let mut reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let results = runtime.block_on(runner.run(&mut reporter))?;

    runner.report(&results, &reporter, args.output.as_deref())?;

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} of {} scenarios failed{}",
            results.failed_count(),
            results.total(),
            if results.skipped.is_empty() {
                String::new()
            } else {
                format!(", {} skipped", results.skipped.len())
            }
        )))
    }
}

fn run_list(args: &ListArgs) {
    let mut harness = TestHarness::new();
    harness.filter.clone_from(&args.filter);
    let scenarios = catalog();

    for scenario in harness.select(&scenarios) {
        let expectation = match scenario.expectation {
            Expectation::ValidationMessage { ref text } => format!("message {text:?}"),
            Expectation::RowListed { ref code, ref name } => format!("row {code} / {name}"),
        };
        println!("{:<26} {:<54} {expectation}", scenario.name, scenario.description);
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
