use crate::domain::model::{CartRow, ProductCard};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The cart page as seen by the steps. Every accessor returns text that has
/// already been pulled off the page.
pub trait CartPage {
    fn navigate(&mut self) -> Result<()>;
    fn title(&self) -> String;
    fn product_cards(&self) -> Vec<ProductCard>;
    fn click_add(&mut self, index: usize) -> Result<()>;
    fn cart_rows(&self) -> Vec<CartRow>;
    fn click_remove(&mut self, index: usize) -> Result<()>;
    fn total_text(&self) -> Result<String>;
    fn empty_message_visible(&self) -> bool;
    /// 供失敗報告使用的文字快照
    fn snapshot(&self) -> String;
}

/// Opens a fresh page for each scenario.
pub trait PageLauncher {
    type Page: CartPage;

    fn launch(&self) -> Result<Self::Page>;
}

#[async_trait]
pub trait Reporter: Send + Sync {
    /// Writes every configured report and returns the paths written.
    async fn publish(&self, report: &crate::core::report::SuiteReport) -> Result<Vec<String>>;
}
