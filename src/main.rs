use anyhow::Context;
use clap::Parser;
use ekart_harness::config::{CliConfig, Command};
use ekart_harness::core::behave_log::parse_behave_output;
use ekart_harness::core::price::{reconciliation_delta, try_parse_currency};
use ekart_harness::core::report::ReportFormat;
use ekart_harness::domain::ports::Reporter;
use ekart_harness::utils::{logger, validation::Validate};
use ekart_harness::{
    parse_currency, reconcile_total, FileReporter, HarnessEngine, HarnessError, LineItem,
    LocalStorage, MonetaryAmount, SimulatedBrowser, SuiteConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    match cli.command {
        Command::Run {
            config,
            features,
            output,
            formats,
        } => run_suite(config, features, output, formats).await,
        Command::List { config } => {
            let suite = load_suite(config.as_deref());
            list_suite(&suite);
            Ok(())
        }
        Command::ParsePrice { text } => {
            if try_parse_currency(&text).is_none() {
                tracing::warn!("⚠️ No number found in {:?}, falling back to 0.00", text);
            }
            println!("{:.2}", parse_currency(&text).value());
            Ok(())
        }
        Command::Reconcile { items, total } => reconcile(&items, &total),
        Command::Summarize {
            input,
            output,
            suite,
        } => summarize(&input, output, suite).await,
    }
}

fn exit_with(e: &HarnessError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn load_suite(path: Option<&str>) -> SuiteConfig {
    let loaded = match path {
        Some(path) => {
            tracing::info!("📁 Loading suite from: {}", path);
            SuiteConfig::from_file(path)
        }
        None => {
            tracing::info!("📁 Using the built-in Mini E-Kart suite");
            SuiteConfig::builtin()
        }
    };

    match loaded {
        Ok(suite) => suite,
        Err(e) => exit_with(&e),
    }
}

async fn run_suite(
    config: Option<String>,
    features: Vec<String>,
    output: Option<String>,
    formats: Vec<String>,
) -> anyhow::Result<()> {
    let mut suite = load_suite(config.as_deref());

    // 應用命令列覆蓋設定
    if let Some(output) = output {
        tracing::info!("🔧 Report directory overridden to: {}", output);
        suite.report.output_path = output;
    }
    if !formats.is_empty() {
        tracing::info!("🔧 Report formats overridden to: {}", formats.join(", "));
        suite.report.formats = formats;
    }

    // 驗證配置
    if let Err(e) = suite.validate() {
        exit_with(&e);
    }
    let report_formats = match suite.report.report_formats() {
        Ok(formats) => formats,
        Err(e) => exit_with(&e),
    };

    display_suite_summary(&suite, &features);

    let output_path = suite.report.output_path.clone();
    let launcher = SimulatedBrowser::from_config(&suite.page);
    let reporter = FileReporter::new(LocalStorage::new(output_path.clone()), report_formats);
    let engine = HarnessEngine::new(suite, launcher, reporter);

    let outcome = match engine.run(&features).await {
        Ok(outcome) => outcome,
        Err(e) => exit_with(&e),
    };

    println!("{}", outcome.report.render_console());
    println!("📁 Reports saved in: {}", output_path);
    for file in &outcome.written {
        println!("  📄 {}", file);
    }

    if outcome.report.all_passed() {
        println!("\n🎉 All tests completed successfully!");
        Ok(())
    } else {
        println!("\n⚠️ Some tests failed. Check the reports for details.");
        std::process::exit(1);
    }
}

fn display_suite_summary(suite: &SuiteConfig, features: &[String]) {
    println!("📋 Suite Summary:");
    println!("  Suite: {}", suite.suite.name);
    if let Some(version) = &suite.suite.version {
        println!("  Version: {}", version);
    }
    println!("  Page: {}", suite.page.title);
    println!("  Products: {}", suite.page.products.len());
    println!("  Scenarios: {}", suite.scenario_count());
    if features.is_empty() {
        println!("  Features: all ({})", suite.feature_names().join(", "));
    } else {
        println!("  Features: {}", features.join(", "));
    }
    println!("  Output: {}", suite.report.output_path);
    println!("  Formats: {}", suite.report.formats.join(", "));
    println!();
}

fn list_suite(suite: &SuiteConfig) {
    println!("{}", suite.suite.name);
    for (index, feature) in suite.features.iter().enumerate() {
        match &feature.description {
            Some(description) => println!("{}. {} - {}", index + 1, feature.name, description),
            None => println!("{}. {}", index + 1, feature.name),
        }
        for scenario in &feature.scenarios {
            println!("     - {} ({} steps)", scenario.name, scenario.steps.len());
        }
    }
}

fn parse_item(raw: &str) -> anyhow::Result<LineItem> {
    let (name, price) = raw
        .split_once('=')
        .with_context(|| format!("Line item '{}' must look like NAME=PRICE", raw))?;
    Ok(LineItem::from_text(name.trim(), price))
}

fn reconcile(items: &[String], total: &str) -> anyhow::Result<()> {
    let items = items
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for item in &items {
        println!("  {} {}", item.name, item.amount);
    }
    let computed: MonetaryAmount = items.iter().map(|item| item.amount).sum();
    println!("Computed total:  {}", computed);
    println!("Displayed total: {}", parse_currency(total));

    if reconcile_total(&items, total) {
        println!("✅ Totals match");
        Ok(())
    } else {
        println!(
            "❌ Totals differ by {:.2}",
            reconciliation_delta(&items, total).abs()
        );
        std::process::exit(1);
    }
}

async fn summarize(input: &str, output: String, suite: String) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read run output '{}'", input))?;

    let counts = match parse_behave_output(&content) {
        Ok(counts) => counts,
        Err(e) => exit_with(&e),
    };
    let report = counts.into_report(suite);
    println!("{}", report.render_console());

    let reporter = FileReporter::new(
        LocalStorage::new(output.clone()),
        vec![ReportFormat::Text, ReportFormat::Json],
    );
    let written = reporter.publish(&report).await?;
    println!("📁 Reports saved in: {}", output);
    for file in &written {
        println!("  📄 {}", file);
    }
    Ok(())
}
