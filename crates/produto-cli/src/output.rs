//! Output formatting and progress reporting

use crate::error::{CliError, CliResult};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use produto_e2e::{SuiteResults, TestResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format for suite results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Render suite results as pretty JSON
pub fn render_json(results: &SuiteResults) -> CliResult<String> {
    serde_json::to_string_pretty(results)
        .map_err(|e| CliError::report_generation(e.to_string()))
}

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() && !pb.is_hidden() => pb.println(text),
            _ => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, paint: fn(&str) -> String, message: &str) {
        let prefix = if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("✓", "PASS", |s| style(s).green().bold().to_string(), message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.prefixed("✗", "FAIL", |s| style(s).red().bold().to_string(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("⚠", "WARN", |s| style(s).yellow().bold().to_string(), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("ℹ", "INFO", |s| style(s).blue().bold().to_string(), message);
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.line("");
        self.line(&styled);
    }

    /// Report one finished scenario and advance the bar
    pub fn scenario(&self, result: &TestResult) {
        let millis = result.duration.as_millis();
        match result.error {
            None => self.success(&format!("{} ({millis}ms)", result.name)),
            Some(ref error) => self.failure(&format!("{} ({millis}ms)\n    {error}", result.name)),
        }
        self.increment(1);
    }

    /// Print the summary of a suite run
    pub fn summary(&self, results: &SuiteResults) {
        self.totals(
            results.passed_count(),
            results.failed_count(),
            results.skipped.len(),
            results.duration,
        );
    }

    fn totals(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> SuiteResults {
        SuiteResults {
            suite_name: "product registration".to_string(),
            results: vec![
                TestResult::pass("TC001_all_fields_empty").with_duration(Duration::from_millis(120)),
                TestResult::fail("TC010_all_fields_filled", "first row code: expected \"007\", got \"006\""),
            ],
            skipped: Vec::new(),
            duration: Duration::from_millis(900),
        }
    }

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }

        #[test]
        fn test_render_json() {
            let json = render_json(&results()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["suite_name"], "product registration");
            assert_eq!(value["duration_ms"], 900);
            assert_eq!(value["results"][0]["name"], "TC001_all_fields_empty");
            assert_eq!(value["results"][1]["passed"], false);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("warning");
            reporter.info("info");
            reporter.header("Header");
        }

        #[test]
        fn test_progress_with_scenarios() {
            let mut reporter = ProgressReporter::new(false, false);
            let results = results();
            reporter.start_progress(2, "Running scenarios");
            for result in &results.results {
                reporter.scenario(result);
            }
            reporter.finish();
            reporter.summary(&results);
        }

        #[test]
        fn test_quiet_mode_suppresses_progress() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.success("hidden");
            // Failure is still printed
            reporter.failure("shown");
        }
    }
}
