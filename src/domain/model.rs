use serde::{Deserialize, Serialize};
use std::fmt;

/// A product tile as rendered in the product grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub name: String,
    pub price_text: String,
}

/// A rendered cart row, text exactly as the page shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRow {
    pub name: String,
    pub price_text: String,
    pub quantity_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Errored,
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
            StepStatus::Errored => "error",
            StepStatus::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub text: String,
    pub status: StepStatus,
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn skipped(text: String) -> Self {
        Self {
            text,
            status: StepStatus::Skipped,
            message: None,
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Errored,
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Errored => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub feature: String,
    pub name: String,
    pub status: ScenarioStatus,
    pub steps: Vec<StepResult>,
    pub duration_ms: u64,
    /// before hook 失敗時的原因
    pub setup_error: Option<String>,
    /// 失敗當下的頁面文字快照
    pub failure_snapshot: Option<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Everything one suite run produced, before it is summarised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub suite: String,
    pub scenarios: Vec<ScenarioResult>,
    pub duration_ms: u64,
}

impl RunResult {
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioResult::passed)
    }
}
