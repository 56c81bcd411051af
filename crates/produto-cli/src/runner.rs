//! Suite runner: effective configuration, driver selection and reporting

use crate::commands::{DriverArg, RunArgs};
use crate::error::{CliError, CliResult};
use crate::output::{render_json, OutputFormat, ProgressReporter};
use produto_e2e::sim::SimulatedApp;
use produto_e2e::{catalog, run_suite, SuiteConfig, SuiteResults, TestHarness};
use std::path::Path;
use tracing::info;

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> CliResult<SuiteConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Ok(SuiteConfig::from_file(path)?)
        }
        None => Ok(SuiteConfig::default()),
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(mut config: SuiteConfig, args: &RunArgs) -> CliResult<SuiteConfig> {
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ms) = args.timeout_ms {
        config.wait.timeout_ms = ms;
    }
    if let Some(ms) = args.poll_ms {
        config.wait.poll_interval_ms = ms;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.double_dispatch {
        config.double_dispatch = true;
    }
    config.validate()?;
    Ok(config)
}

/// Runs the scenario catalog for the `run` command
#[derive(Debug)]
pub struct SuiteRunner {
    config: SuiteConfig,
    harness: TestHarness,
    driver: DriverArg,
    format: OutputFormat,
}

impl SuiteRunner {
    /// Build a runner from the command-line arguments
    pub fn from_args(args: &RunArgs) -> CliResult<Self> {
        let config = apply_overrides(load_config(args.config.as_deref())?, args)?;
        let mut harness = TestHarness::new();
        harness.fail_fast = args.fail_fast;
        harness.filter.clone_from(&args.filter);
        Ok(Self {
            config,
            harness,
            driver: args.driver,
            format: args.format.into(),
        })
    }

    /// The effective suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run the selected scenarios, reporting progress on `reporter`
    pub async fn run(&self, reporter: &mut ProgressReporter) -> CliResult<SuiteResults> {
        let scenarios = catalog();
        let selected = self.harness.select(&scenarios).len();
        if selected == 0 {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches filter {:?}",
                self.harness.filter.as_deref().unwrap_or_default()
            )));
        }

        if self.format == OutputFormat::Text {
            reporter.header(&format!("Product registration ({:?} driver)", self.driver));
            reporter.start_progress(selected as u64, "Running scenarios");
        }
        let on_result = |result: &produto_e2e::TestResult| reporter.scenario(result);

        let results = match self.driver {
            DriverArg::Simulated => {
                let app = SimulatedApp::new(self.config.sim.clone());
                run_suite(app, self.config.clone(), &self.harness, &scenarios, on_result).await?
            }
            DriverArg::Chromium => self.run_chromium(&scenarios, on_result).await?,
        };
        reporter.finish();
        Ok(results)
    }

    #[cfg(feature = "browser")]
    async fn run_chromium(
        &self,
        scenarios: &[produto_e2e::Scenario],
        on_result: impl FnMut(&produto_e2e::TestResult),
    ) -> CliResult<SuiteResults> {
        let driver = produto_e2e::ChromiumDriver::launch(self.config.browser.clone()).await?;
        Ok(run_suite(driver, self.config.clone(), &self.harness, scenarios, on_result).await?)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_chromium(
        &self,
        _scenarios: &[produto_e2e::Scenario],
        _on_result: impl FnMut(&produto_e2e::TestResult),
    ) -> CliResult<SuiteResults> {
        Err(CliError::invalid_argument(
            "chromium driver not available. Rebuild with --features browser or use --driver simulated",
        ))
    }

    /// Print the report in the selected format and write `output` if given
    pub fn report(
        &self,
        results: &SuiteResults,
        reporter: &ProgressReporter,
        output: Option<&Path>,
    ) -> CliResult<()> {
        match self.format {
            OutputFormat::Text => {
                reporter.summary(results);
                if !results.skipped.is_empty() {
                    reporter.warning(&format!(
                        "{} scenarios skipped after the first failure",
                        results.skipped.len()
                    ));
                }
            }
            OutputFormat::Json => println!("{}", render_json(results)?),
        }
        if let Some(path) = output {
            std::fs::write(path, render_json(results)?)?;
            reporter.info(&format!("Report written to {}", path.display()));
        }
        Ok(())
    }
}
