pub mod suite_config;

pub use suite_config::SuiteConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ekart-harness")]
#[command(about = "Acceptance harness for the Mini E-Kart shopping cart page")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the suite and write reports
    Run {
        /// Suite TOML file; the built-in Mini E-Kart suite when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Only run these features (repeatable)
        #[arg(short, long = "feature")]
        features: Vec<String>,

        /// Override the report directory from the suite file
        #[arg(short, long)]
        output: Option<String>,

        /// Override report formats (text, json, csv, transcript)
        #[arg(long, value_delimiter = ',')]
        formats: Vec<String>,
    },

    /// List the features and scenarios of a suite
    List {
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Parse a displayed price, e.g. "Total: $7.75"
    ParsePrice { text: String },

    /// Check that line items add up to a displayed total
    Reconcile {
        /// Line item as NAME=PRICE_TEXT (repeatable)
        #[arg(short, long = "item")]
        items: Vec<String>,

        /// Displayed total text
        #[arg(short, long)]
        total: String,
    },

    /// Build reports from the text output of an old behave run
    Summarize {
        /// Path to the saved run output
        input: String,

        #[arg(short, long, default_value = "./reports")]
        output: String,

        #[arg(long, default_value = "Mini E-Kart")]
        suite: String,
    },
}
