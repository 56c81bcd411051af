//! Test harness for running scenario suites.

use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::result::E2eResult;
use crate::scenario::Scenario;
use serde::{Serialize, Serializer};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Scenario duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl TestResult {
    /// Create a passing test result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running a suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual scenario results, in execution order
    pub results: Vec<TestResult>,
    /// Scenarios selected but not run (fail-fast)
    pub skipped: Vec<String>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed and none were skipped
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.skipped.is_empty() && self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total count of scenarios that ran
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Test harness for running scenario suites
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    /// Whether to stop on first failure
    pub fail_fast: bool,
    /// Only run scenarios whose name contains this substring
    pub filter: Option<String>,
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Restrict the run to names containing `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Scenarios this harness would run, in lexical name order
    #[must_use]
    pub fn select<'s>(&self, scenarios: &'s [Scenario]) -> Vec<&'s Scenario> {
        let mut selected: Vec<&Scenario> = scenarios
            .iter()
            .filter(|s| {
                self.filter
                    .as_deref()
                    .map_or(true, |needle| s.name.contains(needle))
            })
            .collect();
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        selected
    }

    /// Run scenarios against an open session
    pub async fn run<D: PageDriver>(
        &self,
        session: &Session<D>,
        scenarios: &[Scenario],
    ) -> SuiteResults {
        self.run_with(session, scenarios, |_| {}).await
    }

    /// Run scenarios against an open session, reporting each result as it
    /// completes.
    ///
    /// Each scenario starts from a reloaded page. A failure is recorded and
    /// the run continues unless fail-fast is set.
    pub async fn run_with<D, F>(
        &self,
        session: &Session<D>,
        scenarios: &[Scenario],
        mut on_result: F,
    ) -> SuiteResults
    where
        D: PageDriver,
        F: FnMut(&TestResult),
    {
        let start = Instant::now();
        let selected = self.select(scenarios);
        let mut results = Vec::with_capacity(selected.len());
        let mut skipped = Vec::new();

        for (index, scenario) in selected.iter().enumerate() {
            info!(scenario = %scenario.name, "scenario started");
            let scenario_start = Instant::now();

            let outcome = async {
                session.reset().await?;
                let mut page = session.product_page();
                scenario.run(&mut page).await
            }
            .await;

            let result = match outcome {
                Ok(()) => {
                    info!(scenario = %scenario.name, "scenario passed");
                    TestResult::pass(&scenario.name)
                }
                Err(e) => {
                    warn!(scenario = %scenario.name, error = %e, "scenario failed");
                    TestResult::fail(&scenario.name, e.to_string())
                }
            }
            .with_duration(scenario_start.elapsed());

            on_result(&result);
            let stop = self.fail_fast && !result.passed;
            results.push(result);

            if stop {
                skipped = selected[index + 1..]
                    .iter()
                    .map(|s| s.name.clone())
                    .collect();
                break;
            }
        }

        SuiteResults {
            suite_name: "product registration".to_string(),
            results,
            skipped,
            duration: start.elapsed(),
        }
    }
}

/// Open a session on `driver`, run the scenarios and release the session.
///
/// Scenario failures land in the results; the session is closed either way.
/// A failure to close is logged and does not discard the results.
pub async fn run_suite<D: PageDriver>(
    driver: D,
    config: SuiteConfig,
    harness: &TestHarness,
    scenarios: &[Scenario],
    on_result: impl FnMut(&TestResult),
) -> E2eResult<SuiteResults> {
    let mut session = Session::open(driver, config).await?;
    let results = harness.run_with(&session, scenarios, on_result).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "closing the session failed");
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementState, Key};
    use crate::locator::Selector;
    use crate::page_object::ProductForm;
    use crate::result::E2eError;
    use crate::scenario::{catalog, Expectation};
    use crate::sim::{SimConfig, SimulatedApp};
    use crate::wait::WaitOptions;
    use async_trait::async_trait;

    fn config() -> SuiteConfig {
        SuiteConfig {
            wait: WaitOptions::new().with_timeout(1_000).with_poll_interval(10),
            ..SuiteConfig::default()
        }
    }

    fn failing(name: &str) -> Scenario {
        Scenario::new(
            name,
            "",
            ProductForm::empty(),
            Expectation::ValidationMessage {
                text: "outra mensagem".to_string(),
            },
        )
    }

    /// Simulated app whose browser is already gone at teardown
    #[derive(Debug)]
    struct GoneOnClose(SimulatedApp);

    #[async_trait]
    impl PageDriver for GoneOnClose {
        async fn navigate(&self, url: &str) -> E2eResult<()> {
            self.0.navigate(url).await
        }

        async fn reload(&self) -> E2eResult<()> {
            self.0.reload().await
        }

        async fn title(&self) -> E2eResult<String> {
            self.0.title().await
        }

        async fn probe(&self, selector: &Selector) -> E2eResult<Option<ElementState>> {
            self.0.probe(selector).await
        }

        async fn click(&self, selector: &Selector) -> E2eResult<()> {
            self.0.click(selector).await
        }

        async fn clear(&self, selector: &Selector) -> E2eResult<()> {
            self.0.clear(selector).await
        }

        async fn send_keys(&self, selector: &Selector, text: &str) -> E2eResult<()> {
            self.0.send_keys(selector, text).await
        }

        async fn press_key(&self, selector: &Selector, key: Key) -> E2eResult<()> {
            self.0.press_key(selector, key).await
        }

        async fn text(&self, selector: &Selector) -> E2eResult<String> {
            self.0.text(selector).await
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> E2eResult<Option<String>> {
            self.0.attribute(selector, name).await
        }

        async fn close(&self) -> E2eResult<()> {
            Err(E2eError::driver("browser already gone"))
        }
    }

    mod result_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let results = SuiteResults {
                suite_name: "s".to_string(),
                results: vec![TestResult::pass("a"), TestResult::fail("b", "boom")],
                skipped: Vec::new(),
                duration: Duration::ZERO,
            };
            assert_eq!(results.total(), 2);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.failures()[0].name, "b");
            assert!(!results.all_passed());
        }

        #[test]
        fn test_json_uses_millis() {
            let result = TestResult::pass("TC001").with_duration(Duration::from_millis(1500));
            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(json["duration_ms"], 1500);
            assert_eq!(json["passed"], true);
            assert!(json["error"].is_null());
        }

        #[test]
        fn test_skipped_scenarios_fail_the_suite() {
            let results = SuiteResults {
                suite_name: "s".to_string(),
                results: vec![TestResult::pass("a")],
                skipped: vec!["b".to_string()],
                duration: Duration::ZERO,
            };
            assert!(!results.all_passed());
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_select_sorts_by_name() {
            let mut scenarios = catalog();
            scenarios.reverse();
            let names: Vec<_> = TestHarness::new()
                .select(&scenarios)
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            assert_eq!(names.first().copied(), Some("TC001_all_fields_empty"));
            assert_eq!(names.last().copied(), Some("TC010_all_fields_filled"));
        }

        #[test]
        fn test_select_filters_by_substring() {
            let scenarios = catalog();
            let selected = TestHarness::new().with_filter("only").select(&scenarios);
            assert_eq!(selected.len(), 5);
            assert!(selected.iter().all(|s| s.name.contains("only")));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_full_catalog_passes_and_releases_session() {
            let mut seen = Vec::new();

            let results = run_suite(
                SimulatedApp::new(SimConfig::default()),
                config(),
                &TestHarness::new(),
                &catalog(),
                |r| seen.push(r.name.clone()),
            )
            .await
            .unwrap();

            assert!(results.all_passed(), "{:?}", results.failures());
            assert_eq!(results.total(), 10);
            assert_eq!(seen.len(), 10);
        }

        #[tokio::test(start_paused = true)]
        async fn test_results_survive_failed_teardown() {
            let mut seen = 0;

            let results = run_suite(
                GoneOnClose(SimulatedApp::new(SimConfig::default())),
                config(),
                &TestHarness::new(),
                &catalog(),
                |_| seen += 1,
            )
            .await
            .unwrap();

            assert_eq!(seen, 10);
            assert_eq!(results.total(), 10);
            assert!(results.all_passed(), "{:?}", results.failures());
        }

        #[tokio::test(start_paused = true)]
        async fn test_failure_does_not_stop_run_and_next_scenario_starts_clean() {
            let session = Session::open(SimulatedApp::new(SimConfig::default()), config())
                .await
                .unwrap();
            let mut scenarios = vec![failing("TC000_wrong_message")];
            scenarios.extend(catalog().into_iter().take(2));

            let results = TestHarness::new().run(&session, &scenarios).await;

            assert_eq!(results.total(), 3);
            assert_eq!(results.failed_count(), 1);
            let error = results.failures()[0].error.clone().unwrap();
            assert!(error.contains("outra mensagem"), "{error}");
            assert!(results.results[1].passed);
        }

        #[tokio::test(start_paused = true)]
        async fn test_fail_fast_skips_remaining() {
            let session = Session::open(SimulatedApp::new(SimConfig::default()), config())
                .await
                .unwrap();
            let mut scenarios = vec![failing("TC000_wrong_message")];
            scenarios.extend(catalog().into_iter().take(3));

            let results = TestHarness::new()
                .with_fail_fast()
                .run(&session, &scenarios)
                .await;

            assert_eq!(results.total(), 1);
            assert_eq!(results.skipped.len(), 3);
            assert_eq!(results.skipped[0], "TC001_all_fields_empty");
        }

        #[tokio::test(start_paused = true)]
        async fn test_swallowed_click_fails_every_scenario_without_workaround() {
            let mut cfg = config();
            cfg.sim.swallow_first_click = true;

            let results = run_suite(
                SimulatedApp::new(cfg.sim.clone()),
                cfg.clone(),
                &TestHarness::new().with_filter("TC00"),
                &catalog(),
                |_| {},
            )
            .await
            .unwrap();
            assert_eq!(results.failed_count(), 9);

            cfg.double_dispatch = true;
            cfg.double_dispatch_settle_ms = 300;
            let results = run_suite(
                SimulatedApp::new(cfg.sim.clone()),
                cfg,
                &TestHarness::new().with_filter("TC00"),
                &catalog(),
                |_| {},
            )
            .await
            .unwrap();
            assert!(results.all_passed(), "{:?}", results.failures());
        }
    }
}
