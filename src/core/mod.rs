pub mod behave_log;
pub mod cart;
pub mod engine;
pub mod price;
pub mod report;
pub mod runner;
pub mod steps;

pub use crate::domain::model::{RunResult, ScenarioResult, StepResult};
pub use crate::domain::ports::{CartPage, PageLauncher, Reporter, Storage};
pub use crate::utils::error::Result;
