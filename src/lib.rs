pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, SimulatedBrowser};
pub use config::SuiteConfig;
pub use crate::core::engine::{FileReporter, HarnessEngine, HarnessOutcome};
pub use crate::core::price::{parse_currency, reconcile_total, LineItem, MonetaryAmount};
pub use crate::core::report::SuiteReport;
pub use utils::error::{HarnessError, Result};
