use crate::core::price::{
    parse_currency, reconcile_total, reconciliation_delta, try_parse_currency, LineItem,
    MonetaryAmount,
};
use crate::domain::model::CartRow;
use crate::domain::ports::CartPage;
use crate::utils::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Given,
    When,
    Then,
    And,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Keyword::Given => "Given",
            Keyword::When => "When",
            Keyword::Then => "Then",
            Keyword::And => "And",
        };
        f.write_str(word)
    }
}

/// What a step does. Declared in the suite file as
/// `{ keyword = "when", action = "add_product", product = "Smart Watch" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    OnHomepage,
    CartEmpty,
    AddProduct {
        product: String,
    },
    RemoveProduct {
        product: String,
    },
    AddProducts {
        count: usize,
    },
    CartShowsProduct {
        #[serde(default)]
        product: Option<String>,
    },
    CartItemCount {
        expected: usize,
    },
    TotalCorrect,
    TotalEquals {
        amount: f64,
    },
    ProductPrice {
        product: String,
        amount: f64,
    },
}

impl StepAction {
    /// Catalogue product this step refers to, if any.
    pub fn product(&self) -> Option<&str> {
        match self {
            StepAction::AddProduct { product }
            | StepAction::RemoveProduct { product }
            | StepAction::ProductPrice { product, .. } => Some(product),
            StepAction::CartShowsProduct { product } => product.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub keyword: Keyword,
    #[serde(flatten)]
    pub action: StepAction,
}

impl Step {
    pub fn new(keyword: Keyword, action: StepAction) -> Self {
        Self { keyword, action }
    }

    fn phrase(&self) -> String {
        match &self.action {
            StepAction::OnHomepage => "the user is on the e-kart homepage".to_string(),
            StepAction::CartEmpty if self.keyword == Keyword::Given => {
                "the cart is empty".to_string()
            }
            StepAction::CartEmpty => "the cart should be empty".to_string(),
            StepAction::AddProduct { product } => {
                format!("the user clicks \"Add to Cart\" for \"{}\"", product)
            }
            StepAction::RemoveProduct { product } => {
                format!("the user clicks \"Remove\" for \"{}\"", product)
            }
            StepAction::AddProducts { count } => format!("the user adds {} products", count),
            StepAction::CartShowsProduct { product: None } => {
                "the cart should display that product".to_string()
            }
            StepAction::CartShowsProduct {
                product: Some(product),
            } => format!("the cart should display \"{}\"", product),
            StepAction::CartItemCount { expected } => {
                format!("the cart should contain {} items", expected)
            }
            StepAction::TotalCorrect => "the total price should be correctly updated".to_string(),
            StepAction::TotalEquals { amount } => {
                format!("the total price should be {}", MonetaryAmount::new(*amount))
            }
            StepAction::ProductPrice { product, amount } => format!(
                "the price of \"{}\" should be {}",
                product,
                MonetaryAmount::new(*amount)
            ),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.phrase())
    }
}

/// Settings the steps need from the suite.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub expected_title: String,
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::assertion(message()))
    }
}

/// 依名稱取得商品卡片上的價格，找不到時為 0
pub fn product_price_by_name<P: CartPage>(page: &P, product_name: &str) -> MonetaryAmount {
    match page
        .product_cards()
        .into_iter()
        .find(|card| card.name.trim() == product_name)
    {
        Some(card) => parse_currency(&card.price_text),
        None => {
            tracing::warn!("⚠️ Product {} not found", product_name);
            MonetaryAmount::ZERO
        }
    }
}

pub fn cart_item_count<P: CartPage>(page: &P) -> usize {
    page.cart_rows().len()
}

/// Displayed total, zero when the total element cannot be read.
pub fn cart_total_price<P: CartPage>(page: &P) -> MonetaryAmount {
    match page.total_text() {
        Ok(text) => parse_currency(&text),
        Err(e) => {
            tracing::warn!("Error reading total: {}", e);
            MonetaryAmount::ZERO
        }
    }
}

pub fn is_cart_empty<P: CartPage>(page: &P) -> bool {
    page.empty_message_visible() && page.cart_rows().is_empty()
}

fn row_quantity(row: &CartRow) -> u32 {
    row.quantity_text
        .as_deref()
        .and_then(|text| text.trim().trim_start_matches("Qty:").trim().parse().ok())
        .unwrap_or(1)
}

/// Line items for the rows on screen, each worth unit price times quantity.
pub fn line_items_from_rows(rows: &[CartRow]) -> Vec<LineItem> {
    rows.iter()
        .map(|row| {
            let unit = LineItem::from_text(row.name.trim(), &row.price_text);
            LineItem::new(unit.name, unit.amount.times(row_quantity(row)))
        })
        .collect()
}

impl Step {
    pub fn execute<P: CartPage>(&self, page: &mut P, ctx: &StepContext) -> Result<()> {
        match &self.action {
            StepAction::OnHomepage => {
                let title = page.title();
                ensure(title.contains(&ctx.expected_title), || {
                    format!(
                        "Expected '{}' in title, got '{}'",
                        ctx.expected_title, title
                    )
                })?;
                ensure(!page.product_cards().is_empty(), || {
                    "Product grid did not render any products".to_string()
                })
            }
            StepAction::CartEmpty => {
                ensure(page.empty_message_visible(), || {
                    "Empty-cart message is not displayed".to_string()
                })?;
                let count = cart_item_count(page);
                ensure(count == 0, || {
                    format!("Expected no cart items, found {}", count)
                })
            }
            StepAction::AddProduct { product } => {
                let index = page
                    .product_cards()
                    .iter()
                    .position(|card| card.name.trim() == product)
                    .ok_or_else(|| HarnessError::page(format!("{} not found to add", product)))?;
                page.click_add(index)?;
                tracing::debug!("✅ Added {}", product);
                Ok(())
            }
            StepAction::RemoveProduct { product } => {
                let index = page
                    .cart_rows()
                    .iter()
                    .position(|row| row.name.trim() == product)
                    .ok_or_else(|| {
                        HarnessError::page(format!("{} not found to remove", product))
                    })?;
                page.click_remove(index)?;
                tracing::debug!("✅ Removed {}", product);
                Ok(())
            }
            StepAction::AddProducts { count } => {
                let available = page.product_cards().len();
                ensure(available >= *count, || {
                    format!(
                        "Not enough products: wanted {}, page has {}",
                        count, available
                    )
                })?;
                for index in 0..*count {
                    page.click_add(index)?;
                    tracing::debug!("Added product {}", index + 1);
                }
                Ok(())
            }
            StepAction::CartShowsProduct { product } => {
                let rows = page.cart_rows();
                ensure(!rows.is_empty(), || "Cart shows no products".to_string())?;
                if let Some(product) = product {
                    ensure(rows.iter().any(|row| row.name.trim() == product), || {
                        format!("{} is not shown in the cart", product)
                    })?;
                }
                Ok(())
            }
            StepAction::CartItemCount { expected } => {
                let count = cart_item_count(page);
                ensure(count == *expected, || {
                    format!("Expected {} cart items, found {}", expected, count)
                })
            }
            StepAction::TotalCorrect => {
                let items = line_items_from_rows(&page.cart_rows());
                let total_text = page.total_text()?;
                if try_parse_currency(&total_text).is_none() {
                    tracing::warn!(
                        "Displayed total {:?} has no numeric value, treating it as 0.00",
                        total_text
                    );
                }
                let delta = reconciliation_delta(&items, &total_text);
                ensure(reconcile_total(&items, &total_text), || {
                    format!(
                        "Expected {}, got {} (off by {:.2})",
                        items.iter().map(|item| item.amount).sum::<MonetaryAmount>(),
                        parse_currency(&total_text),
                        delta
                    )
                })
            }
            StepAction::TotalEquals { amount } => {
                let actual = cart_total_price(page);
                ensure(actual.approx_eq(*amount), || {
                    format!(
                        "Expected total {}, got {}",
                        MonetaryAmount::new(*amount),
                        actual
                    )
                })
            }
            StepAction::ProductPrice { product, amount } => {
                let actual = product_price_by_name(page, product);
                ensure(actual.approx_eq(*amount), || {
                    format!(
                        "Expected {} to cost {}, got {}",
                        product,
                        MonetaryAmount::new(*amount),
                        actual
                    )
                })
            }
        }
    }
}
