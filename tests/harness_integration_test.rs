use anyhow::Result;
use ekart_harness::core::behave_log::parse_behave_output;
use ekart_harness::core::report::ReportFormat;
use ekart_harness::utils::validation::Validate;
use ekart_harness::{FileReporter, HarnessEngine, LocalStorage, SimulatedBrowser, SuiteConfig};
use tempfile::TempDir;

fn engine_for(
    suite: SuiteConfig,
    output_path: &str,
    formats: Vec<ReportFormat>,
) -> HarnessEngine<SimulatedBrowser, FileReporter<LocalStorage>> {
    let launcher = SimulatedBrowser::from_config(&suite.page);
    let reporter = FileReporter::new(LocalStorage::new(output_path.to_string()), formats);
    HarnessEngine::new(suite, launcher, reporter)
}

#[tokio::test]
async fn test_builtin_suite_writes_all_reports() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let suite = SuiteConfig::builtin()?;
    suite.validate()?;
    let formats = suite.report.report_formats()?;
    let engine = engine_for(suite, &output_path, formats);

    let outcome = engine.run(&[]).await?;
    assert!(outcome.report.all_passed());
    assert_eq!(outcome.report.scenario_stats.passed, 10);
    assert_eq!(outcome.report.step_stats.total, 50);

    for name in [
        "test_summary_report.txt",
        "test_results.json",
        "step_results.csv",
        "run_output.txt",
    ] {
        assert!(temp_dir.path().join(name).exists(), "missing {}", name);
    }
    assert!(!temp_dir.path().join("failures").exists());

    let summary = std::fs::read_to_string(temp_dir.path().join("test_summary_report.txt"))?;
    assert!(summary.contains("Status: ALL TESTS PASSED!"));

    let csv = std::fs::read_to_string(temp_dir.path().join("step_results.csv"))?;
    assert_eq!(csv.lines().count(), 51);

    Ok(())
}

#[tokio::test]
async fn test_transcript_round_trips_through_legacy_parser() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let suite = SuiteConfig::builtin()?;
    let engine = engine_for(suite, &output_path, vec![ReportFormat::Transcript]);
    let outcome = engine
        .run(&["add_to_cart".to_string(), "total_price".to_string()])
        .await?;

    let transcript = tokio::fs::read_to_string(temp_dir.path().join("run_output.txt")).await?;
    let counts = parse_behave_output(&transcript)?;

    assert_eq!(counts.scenarios, outcome.report.scenario_stats);
    assert_eq!(counts.steps, outcome.report.step_stats);
    assert_eq!(counts.scenarios.total, 6);

    Ok(())
}

#[tokio::test]
async fn test_suite_file_with_failing_checks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let config_content = format!(
        r#"
[suite]
name = "regressions"

[page]
title = "Mini E-Kart - Shopping Cart"

[[page.products]]
name = "Wireless Mouse"
price = 29.99

[[page.products]]
name = "USB-C Hub"
price = 34.99

[report]
output_path = "{}"
formats = ["text", "json"]

[[features]]
name = "total_price"

[[features.scenarios]]
name = "Wrong expected total"
steps = [
  {{ keyword = "given", action = "on_homepage" }},
  {{ keyword = "when", action = "add_product", product = "Wireless Mouse" }},
  {{ keyword = "then", action = "total_equals", amount = 30.99 }},
  {{ keyword = "and", action = "total_correct" }},
]

[[features.scenarios]]
name = "Too many products requested"
steps = [
  {{ keyword = "given", action = "on_homepage" }},
  {{ keyword = "when", action = "add_products", count = 5 }},
]

[[features.scenarios]]
name = "Remove before adding"
steps = [
  {{ keyword = "given", action = "on_homepage" }},
  {{ keyword = "when", action = "remove_product", product = "USB-C Hub" }},
  {{ keyword = "then", action = "cart_empty" }},
]

[[features.scenarios]]
name = "Still fine"
steps = [
  {{ keyword = "given", action = "on_homepage" }},
  {{ keyword = "when", action = "add_product", product = "USB-C Hub" }},
  {{ keyword = "then", action = "total_correct" }},
]
"#,
        output_path
    );

    let config_path = temp_dir.path().join("regressions.toml");
    tokio::fs::write(&config_path, config_content).await?;
    let suite = SuiteConfig::from_file(&config_path)?;
    suite.validate()?;

    let formats = suite.report.report_formats()?;
    let engine = engine_for(suite, &output_path, formats);
    let outcome = engine.run(&[]).await?;
    let report = &outcome.report;

    assert!(!report.all_passed());
    assert_eq!(report.scenario_stats.passed, 1);
    assert_eq!(report.scenario_stats.failed, 2);
    assert_eq!(report.scenario_stats.errors, 1);
    assert_eq!(report.step_stats.skipped, 2);

    let failures = temp_dir.path().join("failures");
    assert_eq!(std::fs::read_dir(&failures)?.count(), 3);

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(
        temp_dir.path().join("test_results.json"),
    )?)?;
    assert_eq!(json["summary"]["verdict"], "multiple_failures");
    assert_eq!(json["scenario_stats"]["errors"], 1);

    Ok(())
}
