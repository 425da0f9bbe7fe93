//! Main scenario runner: check the target, run scenarios one by one, report

use std::path::PathBuf;
use std::time::Instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::RunnerConfig;
use crate::error::{E2eError, E2eResult};
use crate::playwright::{PlaywrightHandle, ScriptOutcome, StepResult};
use crate::spec::Scenario;
use crate::suite;
use crate::target;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub group: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub screenshot_path: Option<String>,
    pub error: Option<String>,
}

impl TestResult {
    /// Build the result of one script run
    pub fn from_outcome(scenario: &Scenario, outcome: ScriptOutcome, duration_ms: u64) -> Self {
        let error = outcome.steps.iter().find(|s| !s.success).map(|s| {
            E2eError::StepFailed {
                step: s.step_name.clone(),
                reason: s.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            }
            .to_string()
        });

        Self {
            name: scenario.name.clone(),
            group: scenario.group.clone(),
            success: error.is_none(),
            duration_ms,
            steps: outcome.steps,
            screenshot_path: outcome
                .screenshot_path
                .map(|p| p.to_string_lossy().to_string()),
            error,
        }
    }

    /// Result for a scenario whose script could not run to a verdict
    pub fn errored(scenario: &Scenario, err: &E2eError, duration_ms: u64) -> Self {
        Self {
            name: scenario.name.clone(),
            group: scenario.group.clone(),
            success: false,
            duration_ms,
            steps: vec![],
            screenshot_path: None,
            error: Some(err.to_string()),
        }
    }
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(
        base_url: &str,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        results: Vec<TestResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            base_url: base_url.to_string(),
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E scenario runner
pub struct TestRunner {
    config: RunnerConfig,
    playwright: PlaywrightHandle,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        let mut pw_config = config.playwright();
        // The script runs from node_dir, so the screenshot path must not be relative.
        if pw_config.screenshot_dir.is_relative() {
            if let Ok(cwd) = std::env::current_dir() {
                pw_config.screenshot_dir = cwd.join(&pw_config.screenshot_dir);
            }
        }

        Self {
            playwright: PlaywrightHandle::new(pw_config),
            config,
        }
    }

    /// Scenarios from the configured directory, or the built-in suite
    pub fn load_scenarios(&self) -> E2eResult<Vec<Scenario>> {
        match &self.config.specs_dir {
            Some(dir) => Scenario::load_all(dir),
            None => Ok(suite::builtin()),
        }
    }

    /// Check the browser toolchain and the target before running anything
    pub async fn preflight(&self) -> E2eResult<()> {
        self.playwright.check_playwright_installed()?;
        debug!("Playwright found from {}", self.playwright.node_dir().display());

        if self.config.reachability.enabled {
            target::wait_until_reachable(&self.config.base_url, &self.config.reachability).await?;
        }
        Ok(())
    }

    /// Run all scenarios
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let scenarios = self.load_scenarios()?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = self.load_scenarios()?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        if filtered.is_empty() {
            return Err(E2eError::NoScenariosTagged(tag.to_string()));
        }
        self.run_scenarios(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_named(&self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = self.load_scenarios()?;
        let scenario = Scenario::find(&scenarios, name)?.clone();
        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run a list of scenarios sequentially
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        if scenarios.is_empty() {
            warn!("No scenarios to run");
        }

        info!("Running {} scenario(s) against {}", scenarios.len(), self.config.base_url);

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                info!("✓ [{}] {} ({} ms)", result.group, result.name, result.duration_ms);
            } else {
                error!(
                    "✗ [{}] {} - {}",
                    result.group,
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = TestSuiteResult::from_results(&self.config.base_url, started_at, duration_ms, results);

        info!(
            "Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );

        Ok(suite)
    }

    /// Run a single scenario in a fresh browser context.
    ///
    /// Script failures are folded into the result so one broken scenario
    /// does not stop the suite.
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let steps = scenario.steps(&self.config.login_form);
        let outcome = self.playwright.execute(&scenario.slug(), &steps).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(outcome) => TestResult::from_outcome(scenario, outcome, duration_ms),
            Err(e) => TestResult::errored(scenario, &e, duration_ms),
        }
    }

    /// Generated script for one scenario, for inspection
    pub fn script_for(&self, name: &str) -> E2eResult<String> {
        let scenarios = self.load_scenarios()?;
        let scenario = Scenario::find(&scenarios, name)?;
        let steps = scenario.steps(&self.config.login_form);
        Ok(self.playwright.build_script(&scenario.slug(), &steps))
    }

    /// Write results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}
