// Adapters layer: concrete implementations of the domain ports (page, storage).

pub mod simulated_page;
pub mod storage;

pub use simulated_page::{SimulatedBrowser, SimulatedPage};
pub use storage::LocalStorage;
