//! Suite summary: counts, pass rates, verdict, and the report renderers.

use crate::domain::model::{RunResult, ScenarioResult, ScenarioStatus, StepStatus};
use crate::utils::error::{HarnessError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl Stats {
    pub fn new(passed: usize, failed: usize, errors: usize, skipped: usize) -> Self {
        Self {
            total: passed + failed + errors + skipped,
            passed,
            failed,
            errors,
            skipped,
        }
    }

    /// 通過率 (百分比)，沒有任何執行時為 None
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.passed as f64 / self.total as f64 * 100.0)
    }

    pub fn unsuccessful(&self) -> usize {
        self.failed + self.errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_tests: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub execution_time: f64,
}

impl OverallSummary {
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total_tests > 0).then(|| self.total_passed as f64 / self.total_tests as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AllPassed,
    MostlyPassing,
    MultipleFailures,
}

impl Verdict {
    pub fn from_failures(failed: usize) -> Self {
        match failed {
            0 => Verdict::AllPassed,
            1..=2 => Verdict::MostlyPassing,
            _ => Verdict::MultipleFailures,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::AllPassed => "ALL TESTS PASSED!",
            Verdict::MostlyPassing => "MOSTLY PASSING - Minor issues detected",
            Verdict::MultipleFailures => "MULTIPLE FAILURES DETECTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Transcript,
}

impl ReportFormat {
    pub const NAMES: [&'static str; 4] = ["text", "json", "csv", "transcript"];

    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Text => "test_summary_report.txt",
            ReportFormat::Json => "test_results.json",
            ReportFormat::Csv => "step_results.csv",
            ReportFormat::Transcript => "run_output.txt",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "transcript" => Ok(ReportFormat::Transcript),
            other => Err(HarnessError::InvalidConfigValueError {
                field: "report.formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    ReportFormat::NAMES.join(", ")
                ),
            }),
        }
    }
}

/// Aggregated outcome of a suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub generated_at: DateTime<Local>,
    pub step_stats: Stats,
    pub scenario_stats: Stats,
    pub feature_stats: Stats,
    /// 秒
    pub execution_time: f64,
    pub scenarios: Vec<ScenarioResult>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    timestamp: String,
    suite: &'a str,
    step_stats: &'a Stats,
    scenario_stats: &'a Stats,
    summary: JsonSummary,
    scenarios: &'a [ScenarioResult],
}

#[derive(Serialize)]
struct JsonSummary {
    total_tests: usize,
    total_passed: usize,
    total_failed: usize,
    pass_rate: Option<f64>,
    execution_time: f64,
    verdict: Verdict,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    feature: &'a str,
    scenario: &'a str,
    step: &'a str,
    status: String,
    duration_ms: u64,
    message: &'a str,
}

impl SuiteReport {
    pub fn from_run(run: RunResult) -> Self {
        let mut steps = [0usize; 4];
        let mut scenarios = [0usize; 3];

        for scenario in &run.scenarios {
            match scenario.status {
                ScenarioStatus::Passed => scenarios[0] += 1,
                ScenarioStatus::Failed => scenarios[1] += 1,
                ScenarioStatus::Errored => scenarios[2] += 1,
            }
            for step in &scenario.steps {
                match step.status {
                    StepStatus::Passed => steps[0] += 1,
                    StepStatus::Failed => steps[1] += 1,
                    StepStatus::Errored => steps[2] += 1,
                    StepStatus::Skipped => steps[3] += 1,
                }
            }
        }

        // 功能的狀態取其最差的情境
        let mut feature_names: Vec<&str> = Vec::new();
        for scenario in &run.scenarios {
            if !feature_names.contains(&scenario.feature.as_str()) {
                feature_names.push(&scenario.feature);
            }
        }
        let (mut features_passed, mut features_failed, mut features_errored) = (0, 0, 0);
        for name in &feature_names {
            let statuses: Vec<ScenarioStatus> = run
                .scenarios
                .iter()
                .filter(|s| s.feature == *name)
                .map(|s| s.status)
                .collect();
            if statuses.contains(&ScenarioStatus::Failed) {
                features_failed += 1;
            } else if statuses.contains(&ScenarioStatus::Errored) {
                features_errored += 1;
            } else {
                features_passed += 1;
            }
        }

        Self {
            suite: run.suite,
            generated_at: Local::now(),
            step_stats: Stats::new(steps[0], steps[1], steps[2], steps[3]),
            scenario_stats: Stats::new(scenarios[0], scenarios[1], scenarios[2], 0),
            feature_stats: Stats::new(features_passed, features_failed, features_errored, 0),
            execution_time: run.duration_ms as f64 / 1000.0,
            scenarios: run.scenarios,
        }
    }

    /// Report built from counts alone, e.g. imported from an old run log.
    pub fn from_counts(
        suite: impl Into<String>,
        step_stats: Stats,
        scenario_stats: Stats,
        execution_time: f64,
    ) -> Self {
        Self {
            suite: suite.into(),
            generated_at: Local::now(),
            step_stats,
            scenario_stats,
            feature_stats: Stats::default(),
            execution_time,
            scenarios: Vec::new(),
        }
    }

    pub fn summary(&self) -> OverallSummary {
        OverallSummary {
            total_tests: self.step_stats.total + self.scenario_stats.total,
            total_passed: self.step_stats.passed + self.scenario_stats.passed,
            total_failed: self.step_stats.unsuccessful() + self.scenario_stats.unsuccessful(),
            execution_time: self.execution_time,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_failures(self.summary().total_failed)
    }

    pub fn all_passed(&self) -> bool {
        self.scenario_stats.unsuccessful() == 0 && self.step_stats.unsuccessful() == 0
    }

    fn write_stats(out: &mut Vec<String>, stats: &Stats, total_label: &str, rate_label: &str) {
        out.push(format!("{}: {}", total_label, stats.total));
        out.push(format!("Passed: {}", stats.passed));
        out.push(format!("Failed: {}", stats.failed));
        out.push(format!("Errors: {}", stats.errors));
        out.push(format!("Skipped: {}", stats.skipped));
        if let Some(rate) = stats.pass_rate() {
            out.push(format!("{}: {:.1}%", rate_label, rate));
        }
    }

    /// 終端機輸出的摘要
    pub fn render_console(&self) -> String {
        let summary = self.summary();
        let mut out = Vec::new();
        let rule = "=".repeat(60);

        out.push(rule.clone());
        out.push(format!("🧪 {} TEST EXECUTION SUMMARY", self.suite.to_uppercase()));
        out.push(rule.clone());
        out.push(format!(
            "📅 Report Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push(String::new());

        out.push("🔧 Step Statistics".to_string());
        out.push("-".repeat(30));
        Self::write_stats(&mut out, &self.step_stats, "Total Steps Executed", "Pass Rate");
        out.push(format!("Execution Time: {:.1} seconds", self.execution_time));
        out.push(String::new());

        out.push("🥒 Scenario Statistics".to_string());
        out.push("-".repeat(30));
        Self::write_stats(
            &mut out,
            &self.scenario_stats,
            "Total Scenarios Executed",
            "Scenario Pass Rate",
        );
        out.push(String::new());

        out.push("📈 Overall Summary".to_string());
        out.push("-".repeat(30));
        out.push(format!("Total Test Executions: {}", summary.total_tests));
        out.push(format!("Total Passed: {}", summary.total_passed));
        out.push(format!("Total Failed: {}", summary.total_failed));
        if let Some(rate) = summary.pass_rate() {
            out.push(format!("Overall Pass Rate: {:.1}%", rate));
        }
        out.push(String::new());

        out.push("🎯 Test Status".to_string());
        out.push("-".repeat(30));
        let marker = match self.verdict() {
            Verdict::AllPassed => "✅",
            Verdict::MostlyPassing => "⚠️",
            Verdict::MultipleFailures => "❌",
        };
        out.push(format!("{} {}", marker, self.verdict().headline()));
        out.push(rule.clone());
        finish(out)
    }

    /// Plain-text summary written to `test_summary_report.txt`.
    pub fn render_text(&self) -> String {
        let summary = self.summary();
        let mut out = Vec::new();

        out.push(format!("{} TEST EXECUTION SUMMARY", self.suite.to_uppercase()));
        out.push("=".repeat(50));
        out.push(format!(
            "Report Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push(String::new());

        out.push("Step Statistics".to_string());
        out.push("-".repeat(25));
        Self::write_stats(&mut out, &self.step_stats, "Total Steps", "Pass Rate");
        out.push(format!("Execution Time: {:.1}", self.execution_time));
        out.push(String::new());

        out.push("Scenario Statistics".to_string());
        out.push("-".repeat(25));
        Self::write_stats(&mut out, &self.scenario_stats, "Total Scenarios", "Pass Rate");
        out.push(String::new());

        let failing: Vec<&ScenarioResult> =
            self.scenarios.iter().filter(|s| !s.passed()).collect();
        if !failing.is_empty() {
            out.push("Failing Scenarios".to_string());
            out.push("-".repeat(25));
            for scenario in failing {
                let reason = scenario
                    .setup_error
                    .as_deref()
                    .or_else(|| {
                        scenario
                            .steps
                            .iter()
                            .find_map(|step| step.message.as_deref())
                    })
                    .unwrap_or("unknown");
                out.push(format!(
                    "[{}] {} / {}: {}",
                    scenario.status, scenario.feature, scenario.name, reason
                ));
            }
            out.push(String::new());
        }

        out.push("Summary".to_string());
        out.push("-".repeat(10));
        out.push(format!("Total Tests: {}", summary.total_tests));
        out.push(format!("Total Passed: {}", summary.total_passed));
        out.push(format!("Total Failed: {}", summary.total_failed));
        out.push(format!("Status: {}", self.verdict().headline()));
        finish(out)
    }

    pub fn to_json(&self) -> Result<String> {
        let summary = self.summary();
        let report = JsonReport {
            timestamp: self.generated_at.to_rfc3339(),
            suite: &self.suite,
            step_stats: &self.step_stats,
            scenario_stats: &self.scenario_stats,
            summary: JsonSummary {
                total_tests: summary.total_tests,
                total_passed: summary.total_passed,
                total_failed: summary.total_failed,
                pass_rate: summary.pass_rate(),
                execution_time: summary.execution_time,
                verdict: self.verdict(),
            },
            scenarios: &self.scenarios,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// One CSV row per executed step.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for scenario in &self.scenarios {
            for step in &scenario.steps {
                writer.serialize(CsvRow {
                    feature: &scenario.feature,
                    scenario: &scenario.name,
                    step: &step.text,
                    status: step.status.to_string(),
                    duration_ms: step.duration_ms,
                    message: step.message.as_deref().unwrap_or(""),
                })?;
            }
        }
        let data = writer.into_inner().map_err(|e| HarnessError::ReportError {
            message: format!("Failed to flush CSV writer: {}", e),
        })?;
        String::from_utf8(data).map_err(|e| HarnessError::ReportError {
            message: format!("CSV output is not UTF-8: {}", e),
        })
    }

    /// Pretty run log, closed by the classic behave summary lines.
    pub fn render_transcript(&self) -> String {
        let mut out = Vec::new();
        let mut current_feature: Option<&str> = None;

        for scenario in &self.scenarios {
            if current_feature != Some(scenario.feature.as_str()) {
                if current_feature.is_some() {
                    out.push(String::new());
                }
                out.push(format!("Feature: {}", scenario.feature));
                current_feature = Some(scenario.feature.as_str());
            }
            out.push(String::new());
            out.push(format!("  Scenario: {}", scenario.name));
            if let Some(error) = &scenario.setup_error {
                out.push(format!("    HOOK-ERROR in before_scenario: {}", error));
            }
            for step in &scenario.steps {
                out.push(format!(
                    "    {} ... {} in {:.3}s",
                    step.text,
                    step.status,
                    step.duration_ms as f64 / 1000.0
                ));
                if let Some(message) = &step.message {
                    out.push(format!("      {}", message));
                }
            }
        }

        out.push(String::new());
        let features = &self.feature_stats;
        let scenarios = &self.scenario_stats;
        let steps = &self.step_stats;
        out.push(format!(
            "{} feature{} passed, {} failed, {} error, {} skipped",
            features.passed,
            if features.passed == 1 { "" } else { "s" },
            features.failed,
            features.errors,
            features.skipped
        ));
        out.push(format!(
            "{} scenario{} passed, {} failed, {} error, {} skipped",
            scenarios.passed,
            if scenarios.passed == 1 { "" } else { "s" },
            scenarios.failed,
            scenarios.errors,
            scenarios.skipped
        ));
        out.push(format!(
            "{} step{} passed, {} failed, {} error, {} skipped, 0 undefined",
            steps.passed,
            if steps.passed == 1 { "" } else { "s" },
            steps.failed,
            steps.errors,
            steps.skipped
        ));
        let minutes = (self.execution_time / 60.0).floor();
        out.push(format!(
            "Took {}m{:.3}s",
            minutes as u64,
            self.execution_time - minutes * 60.0
        ));
        finish(out)
    }
}

/// 把逐行輸出接成以換行結尾的文字
fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StepResult;

    fn step(text: &str, status: StepStatus) -> StepResult {
        StepResult {
            text: text.to_string(),
            status,
            message: (status == StepStatus::Failed).then(|| "Expected $7.75, got $0.00".into()),
            duration_ms: 4,
        }
    }

    fn scenario(feature: &str, name: &str, status: ScenarioStatus, steps: Vec<StepResult>) -> ScenarioResult {
        ScenarioResult {
            feature: feature.to_string(),
            name: name.to_string(),
            status,
            steps,
            duration_ms: 12,
            setup_error: None,
            failure_snapshot: None,
        }
    }

    fn sample_run() -> RunResult {
        RunResult {
            suite: "Mini E-Kart".to_string(),
            scenarios: vec![
                scenario(
                    "add_to_cart",
                    "add one",
                    ScenarioStatus::Passed,
                    vec![
                        step("Given the user is on the e-kart homepage", StepStatus::Passed),
                        step("Then the cart should display that product", StepStatus::Passed),
                    ],
                ),
                scenario(
                    "total_price",
                    "total",
                    ScenarioStatus::Failed,
                    vec![
                        step("When the user adds 2 products", StepStatus::Passed),
                        step("Then the total price should be correctly updated", StepStatus::Failed),
                        step("And the cart should contain 2 items", StepStatus::Skipped),
                    ],
                ),
            ],
            duration_ms: 1500,
        }
    }

    #[test]
    fn test_counts_from_run() {
        let report = SuiteReport::from_run(sample_run());

        assert_eq!(report.step_stats, Stats::new(3, 1, 0, 1));
        assert_eq!(report.scenario_stats, Stats::new(1, 1, 0, 0));
        assert_eq!(report.feature_stats, Stats::new(1, 1, 0, 0));
        assert_eq!(report.execution_time, 1.5);

        let summary = report.summary();
        assert_eq!(summary.total_tests, 7);
        assert_eq!(summary.total_passed, 4);
        assert_eq!(summary.total_failed, 2);
        assert_eq!(report.verdict(), Verdict::MostlyPassing);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_failures(0), Verdict::AllPassed);
        assert_eq!(Verdict::from_failures(2), Verdict::MostlyPassing);
        assert_eq!(Verdict::from_failures(3), Verdict::MultipleFailures);
    }

    #[test]
    fn test_pass_rate_needs_executions() {
        assert_eq!(Stats::default().pass_rate(), None);
        assert_eq!(Stats::new(3, 1, 0, 0).pass_rate(), Some(75.0));
    }

    #[test]
    fn test_text_report_lists_failures() {
        let text = SuiteReport::from_run(sample_run()).render_text();
        assert!(text.starts_with("MINI E-KART TEST EXECUTION SUMMARY"));
        assert!(text.contains("Total Scenarios: 2"));
        assert!(text.contains("[failed] total_price / total: Expected $7.75, got $0.00"));
        assert!(text.contains("Status: MOSTLY PASSING - Minor issues detected"));
    }

    #[test]
    fn test_json_report_shape() {
        let json = SuiteReport::from_run(sample_run()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["suite"], "Mini E-Kart");
        assert_eq!(value["step_stats"]["passed"], 3);
        assert_eq!(value["scenario_stats"]["failed"], 1);
        assert_eq!(value["summary"]["total_tests"], 7);
        assert_eq!(value["summary"]["verdict"], "mostly_passing");
        assert_eq!(value["scenarios"][1]["steps"][2]["status"], "skipped");
    }

    #[test]
    fn test_csv_has_row_per_step() {
        let csv = SuiteReport::from_run(sample_run()).to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "feature,scenario,step,status,duration_ms,message");
        assert_eq!(lines.len(), 6);
        assert!(lines[4].starts_with("total_price,total,Then the total price"));
        assert!(lines[4].contains(",failed,4,"));
    }

    #[test]
    fn test_transcript_summary_lines() {
        let transcript = SuiteReport::from_run(sample_run()).render_transcript();
        assert!(transcript.contains("Feature: add_to_cart"));
        assert!(transcript.contains("  Scenario: total\n"));
        assert!(transcript.contains("1 feature passed, 1 failed, 0 error, 0 skipped"));
        assert!(transcript.contains("1 scenario passed, 1 failed, 0 error, 0 skipped"));
        assert!(transcript.contains("3 steps passed, 1 failed, 0 error, 1 skipped, 0 undefined"));
        assert!(transcript.contains("Took 0m1.500s"));
        assert!(transcript.ends_with("Took 0m1.500s\n"));
    }

    #[test]
    fn test_rendered_reports_end_with_single_newline() {
        let report = SuiteReport::from_run(sample_run());
        for text in [report.render_console(), report.render_text()] {
            assert!(text.ends_with('\n'));
            assert!(!text.ends_with("\n\n"));
        }
        assert!(report.render_console().contains("\n\n🔧 Step Statistics\n"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
