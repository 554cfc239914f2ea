//! Imports pass/fail counts from the text output of the old behave runner.
//!
//! Only the closing summary lines are read, for example
//!
//! ```text
//! 4 scenarios passed, 1 failed, 0 skipped
//! 11 steps passed, 1 failed, 2 skipped, 0 undefined
//! Took 0m12.345s
//! ```
//!
//! The counts come from the captured numbers, not from how many lines match.

use crate::core::report::{Stats, SuiteReport};
use crate::utils::error::{HarnessError, Result};
use regex::{Captures, Regex};
use std::sync::OnceLock;

struct Patterns {
    scenarios: Regex,
    steps: Regex,
    took: Regex,
    seconds: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        scenarios: Regex::new(
            r"(\d+) scenarios? passed, (\d+) failed(?:, (\d+) error)?, (\d+) skipped",
        )
        .expect("valid scenario summary pattern"),
        steps: Regex::new(r"(\d+) steps? passed, (\d+) failed(?:, (\d+) error)?, (\d+) skipped")
            .expect("valid step summary pattern"),
        took: Regex::new(r"Took ([0-9]+)m([0-9]+(?:\.[0-9]+)?)s").expect("valid duration pattern"),
        seconds: Regex::new(r"([0-9]+(?:\.[0-9]*)?) seconds").expect("valid seconds pattern"),
    })
}

fn count(caps: &Captures<'_>, index: usize) -> usize {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn stats_from(caps: &Captures<'_>) -> Stats {
    Stats::new(count(caps, 1), count(caps, 2), count(caps, 3), count(caps, 4))
}

/// Counts read from one behave run log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaveCounts {
    pub scenarios: Stats,
    pub steps: Stats,
    pub execution_time: f64,
}

impl BehaveCounts {
    pub fn into_report(self, suite: impl Into<String>) -> SuiteReport {
        SuiteReport::from_counts(suite, self.steps, self.scenarios, self.execution_time)
    }
}

/// 解析 behave 輸出的摘要行
pub fn parse_behave_output(content: &str) -> Result<BehaveCounts> {
    let patterns = patterns();

    // 取最後一組摘要，前面可能夾雜其他輸出
    let scenarios = patterns
        .scenarios
        .captures_iter(content)
        .last()
        .map(|caps| stats_from(&caps))
        .ok_or_else(|| HarnessError::ReportError {
            message: "No scenario summary line found in run output".to_string(),
        })?;

    let steps = patterns
        .steps
        .captures_iter(content)
        .last()
        .map(|caps| stats_from(&caps))
        .ok_or_else(|| HarnessError::ReportError {
            message: "No step summary line found in run output".to_string(),
        })?;

    // 時間也取最後一組，與摘要對應同一次執行
    let execution_time = if let Some(caps) = patterns.took.captures_iter(content).last() {
        let minutes: f64 = caps[1].parse().unwrap_or(0.0);
        let seconds: f64 = caps[2].parse().unwrap_or(0.0);
        minutes * 60.0 + seconds
    } else if let Some(caps) = patterns.seconds.captures_iter(content).last() {
        caps[1].parse().unwrap_or(0.0)
    } else {
        tracing::warn!("No execution time found in run output");
        0.0
    };

    tracing::debug!(
        "Parsed run output: {} scenarios, {} steps, {:.1}s",
        scenarios.total,
        steps.total,
        execution_time
    );

    Ok(BehaveCounts {
        scenarios,
        steps,
        execution_time,
    })
}
