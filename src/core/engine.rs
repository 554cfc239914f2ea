use crate::config::suite_config::SuiteConfig;
use crate::core::report::{ReportFormat, SuiteReport};
use crate::core::runner::ScenarioRunner;
use crate::domain::ports::{PageLauncher, Reporter, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Writes the selected report formats, plus one snapshot per failing
/// scenario under `failures/`.
pub struct FileReporter<S: Storage> {
    storage: S,
    formats: Vec<ReportFormat>,
}

impl<S: Storage> FileReporter<S> {
    pub fn new(storage: S, formats: Vec<ReportFormat>) -> Self {
        Self { storage, formats }
    }
}

/// 以執行順序編號，名稱只差標點的情境也不會互相覆蓋
fn snapshot_file_name(index: usize, feature: &str, scenario: &str) -> String {
    let slug: String = format!("{}_{}", feature, scenario)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("failures/{:02}_{}.txt", index + 1, slug)
}

#[async_trait]
impl<S: Storage> Reporter for FileReporter<S> {
    async fn publish(&self, report: &SuiteReport) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in &self.formats {
            let content = match format {
                ReportFormat::Text => report.render_text(),
                ReportFormat::Json => report.to_json()?,
                ReportFormat::Csv => report.to_csv()?,
                ReportFormat::Transcript => report.render_transcript(),
            };
            let name = format.file_name();
            tracing::debug!("Writing {} ({} bytes)", name, content.len());
            self.storage.write_file(name, content.as_bytes()).await?;
            written.push(name.to_string());
        }

        for (index, scenario) in report.scenarios.iter().enumerate() {
            if let Some(snapshot) = &scenario.failure_snapshot {
                let name = snapshot_file_name(index, &scenario.feature, &scenario.name);
                self.storage.write_file(&name, snapshot.as_bytes()).await?;
                written.push(name);
            }
        }

        tracing::info!("📄 Wrote {} report files", written.len());
        Ok(written)
    }
}

#[derive(Debug)]
pub struct HarnessOutcome {
    pub report: SuiteReport,
    pub written: Vec<String>,
}

pub struct HarnessEngine<L: PageLauncher, R: Reporter> {
    suite: SuiteConfig,
    runner: ScenarioRunner<L>,
    reporter: R,
}

impl<L: PageLauncher, R: Reporter> HarnessEngine<L, R> {
    pub fn new(suite: SuiteConfig, launcher: L, reporter: R) -> Self {
        let runner = ScenarioRunner::new(launcher, suite.page.expected_title());
        Self {
            suite,
            runner,
            reporter,
        }
    }

    /// Runs the suite (optionally limited to `features`) and publishes reports.
    pub async fn run(&self, features: &[String]) -> Result<HarnessOutcome> {
        tracing::info!(
            "🚀 Running suite '{}' ({} scenarios)",
            self.suite.suite.name,
            self.suite.scenario_count()
        );

        let run = self.runner.run_suite(&self.suite, features)?;
        let report = SuiteReport::from_run(run);

        tracing::info!(
            "Scenarios: {} passed, {} failed, {} errors",
            report.scenario_stats.passed,
            report.scenario_stats.failed,
            report.scenario_stats.errors
        );

        let written = self.reporter.publish(&report).await?;
        Ok(HarnessOutcome { report, written })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::simulated_page::SimulatedBrowser;
    use crate::utils::error::HarnessError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                HarnessError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn engine(
        suite: SuiteConfig,
        storage: MockStorage,
        formats: Vec<ReportFormat>,
    ) -> HarnessEngine<SimulatedBrowser, FileReporter<MockStorage>> {
        let launcher = SimulatedBrowser::from_config(&suite.page);
        HarnessEngine::new(suite, launcher, FileReporter::new(storage, formats))
    }

    #[tokio::test]
    async fn test_builtin_suite_passes_and_writes_reports() {
        let storage = MockStorage::new();
        let suite = SuiteConfig::builtin().unwrap();
        let formats = suite.report.report_formats().unwrap();
        let engine = engine(suite, storage.clone(), formats);

        let outcome = engine.run(&[]).await.unwrap();

        assert!(outcome.report.all_passed());
        assert_eq!(outcome.report.scenario_stats.total, 10);
        assert_eq!(outcome.report.feature_stats.passed, 4);
        assert_eq!(outcome.written.len(), 4);

        let json = storage.get_file("test_results.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["summary"]["verdict"], "all_passed");
        assert!(storage.read_file("run_output.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_feature_filter_and_failure_snapshot() {
        let storage = MockStorage::new();
        let mut suite = SuiteConfig::builtin().unwrap();

        // 故意讓一個總額檢查失敗
        let scenario = &mut suite.features[3].scenarios[0];
        scenario.steps[2].action = crate::core::steps::StepAction::TotalEquals { amount: 5.0 };

        let engine = engine(suite, storage.clone(), vec![ReportFormat::Text]);
        let outcome = engine.run(&["empty_cart".to_string()]).await.unwrap();

        assert_eq!(outcome.report.scenario_stats.total, 2);
        assert_eq!(outcome.report.scenario_stats.failed, 1);
        assert!(outcome
            .written
            .contains(&"failures/01_empty_cart_cart_starts_empty.txt".to_string()));

        let snapshot = storage
            .get_file("failures/01_empty_cart_cart_starts_empty.txt")
            .await
            .unwrap();
        assert!(String::from_utf8(snapshot).unwrap().contains("Total: 0.00"));
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let suite = SuiteConfig::builtin().unwrap();
        let engine = engine(suite, MockStorage::new(), vec![]);

        let err = tokio_test::block_on(engine.run(&["checkout".to_string()])).unwrap_err();
        assert!(err.to_string().contains("checkout"));
        assert!(err.to_string().contains("empty_cart"));
    }

    #[test]
    fn test_snapshot_file_name_is_slugged() {
        assert_eq!(
            snapshot_file_name(4, "total_price", "Total reflects added products"),
            "failures/05_total_price_total_reflects_added_products.txt"
        );
    }

    #[tokio::test]
    async fn test_similar_scenario_names_keep_separate_snapshots() {
        let storage = MockStorage::new();
        let mut suite = SuiteConfig::builtin().unwrap();

        // 兩個情境名稱只差標點，且都失敗
        let feature = &mut suite.features[3];
        feature.scenarios.truncate(1);
        feature.scenarios[0].name = "wrong total!".to_string();
        feature.scenarios[0].steps[2].action =
            crate::core::steps::StepAction::TotalEquals { amount: 5.0 };
        let mut twin = feature.scenarios[0].clone();
        twin.name = "wrong total?".to_string();
        feature.scenarios.push(twin);

        let engine = engine(suite, storage.clone(), vec![]);
        let outcome = engine.run(&["empty_cart".to_string()]).await.unwrap();

        assert_eq!(outcome.report.scenario_stats.failed, 2);
        assert_eq!(
            outcome.written,
            vec![
                "failures/01_empty_cart_wrong_total_.txt".to_string(),
                "failures/02_empty_cart_wrong_total_.txt".to_string(),
            ]
        );
        assert_eq!(storage.files.lock().await.len(), 2);
    }
}
