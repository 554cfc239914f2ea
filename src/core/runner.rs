use crate::config::suite_config::{ScenarioDefinition, SuiteConfig};
use crate::core::steps::StepContext;
use crate::domain::model::{RunResult, ScenarioResult, ScenarioStatus, StepResult, StepStatus};
use crate::domain::ports::{CartPage, PageLauncher};
use crate::utils::error::{HarnessError, Result};
use std::time::Instant;

/// Runs scenarios, one fresh page per scenario.
pub struct ScenarioRunner<L: PageLauncher> {
    launcher: L,
    context: StepContext,
}

impl<L: PageLauncher> ScenarioRunner<L> {
    pub fn new(launcher: L, expected_title: impl Into<String>) -> Self {
        Self {
            launcher,
            context: StepContext {
                expected_title: expected_title.into(),
            },
        }
    }

    /// Runs the suite, or only the named features when `features` is not empty.
    pub fn run_suite(&self, suite: &SuiteConfig, features: &[String]) -> Result<RunResult> {
        for requested in features {
            if suite.feature(requested).is_none() {
                return Err(HarnessError::InvalidConfigValueError {
                    field: "feature".to_string(),
                    value: requested.clone(),
                    reason: format!("Unknown feature. Available: {}", suite.feature_names().join(", ")),
                });
            }
        }

        let started = Instant::now();
        let mut scenarios = Vec::new();

        for feature in suite
            .features
            .iter()
            .filter(|f| features.is_empty() || features.contains(&f.name))
        {
            tracing::info!("🧪 Feature: {}", feature.name);
            for scenario in &feature.scenarios {
                scenarios.push(self.run_scenario(&feature.name, scenario));
            }
        }

        let result = RunResult {
            suite: suite.suite.name.clone(),
            scenarios,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Finished {} scenarios in {}ms",
            result.scenarios.len(),
            result.duration_ms
        );
        Ok(result)
    }

    fn before_scenario(&self, scenario: &ScenarioDefinition) -> Result<L::Page> {
        tracing::info!("Starting scenario: {}", scenario.name);
        let mut page = self.launcher.launch()?;
        page.navigate()?;

        let title = page.title();
        if !title.contains(&self.context.expected_title) {
            return Err(HarnessError::page(format!(
                "Could not open homepage: expected '{}' in title, got '{}'",
                self.context.expected_title, title
            )));
        }
        Ok(page)
    }

    fn after_scenario(&self, scenario: &ScenarioDefinition, page: L::Page) {
        drop(page);
        tracing::info!("Completed scenario: {}", scenario.name);
    }

    pub fn run_scenario(&self, feature: &str, scenario: &ScenarioDefinition) -> ScenarioResult {
        let started = Instant::now();

        let mut page = match self.before_scenario(scenario) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("❌ Setup failed for '{}': {}", scenario.name, e);
                return ScenarioResult {
                    feature: feature.to_string(),
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Errored,
                    steps: scenario
                        .steps
                        .iter()
                        .map(|step| StepResult::skipped(step.to_string()))
                        .collect(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    setup_error: Some(e.to_string()),
                    failure_snapshot: None,
                };
            }
        };

        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut status = ScenarioStatus::Passed;
        let mut failure_snapshot = None;

        for step in &scenario.steps {
            let text = step.to_string();
            if status != ScenarioStatus::Passed {
                steps.push(StepResult::skipped(text));
                continue;
            }

            let step_started = Instant::now();
            let outcome = step.execute(&mut page, &self.context);
            let duration_ms = step_started.elapsed().as_millis() as u64;

            let (step_status, message) = match outcome {
                Ok(()) => {
                    tracing::debug!("✅ {}", text);
                    (StepStatus::Passed, None)
                }
                Err(HarnessError::AssertionFailed { message }) => {
                    tracing::warn!("❌ {}: {}", text, message);
                    status = ScenarioStatus::Failed;
                    (StepStatus::Failed, Some(message))
                }
                Err(e) => {
                    tracing::warn!("💥 {}: {}", text, e);
                    status = ScenarioStatus::Errored;
                    (StepStatus::Errored, Some(e.to_string()))
                }
            };

            if step_status != StepStatus::Passed {
                failure_snapshot = Some(page.snapshot());
            }

            steps.push(StepResult {
                text,
                status: step_status,
                message,
                duration_ms,
            });
        }

        self.after_scenario(scenario, page);

        ScenarioResult {
            feature: feature.to_string(),
            name: scenario.name.clone(),
            status,
            steps,
            duration_ms: started.elapsed().as_millis() as u64,
            setup_error: None,
            failure_snapshot,
        }
    }
}
