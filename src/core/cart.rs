use crate::core::price::MonetaryAmount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: MonetaryAmount,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price: MonetaryAmount::new(price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub price: MonetaryAmount,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> MonetaryAmount {
        self.price.times(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    pub item_count: u32,
    pub total_price: MonetaryAmount,
    pub items: Vec<CartItem>,
}

/// 購物車狀態，與示範頁面腳本的行為一致
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit; an item with the same name has its quantity bumped
    /// instead of getting a second row.
    pub fn add(&mut self, product: &Product) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.name == product.name) {
            existing.quantity += 1;
            tracing::debug!(
                "Increased quantity of {} to {}",
                existing.name,
                existing.quantity
            );
            return;
        }

        self.items.push(CartItem {
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
        });
        tracing::debug!("Added new item: {}", product.name);
    }

    /// Removes the whole row regardless of quantity.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.items.iter().position(|item| item.name == name) {
            Some(index) => {
                self.items.remove(index);
                tracing::debug!("Removed {} from cart", name);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> MonetaryAmount {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.items.iter().map(|item| item.quantity).sum(),
            total_price: self.total(),
            items: self.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch() -> Product {
        Product::new("Smart Watch", 199.99)
    }

    fn mouse() -> Product {
        Product::new("Wireless Mouse", 29.99)
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        cart.add(&watch());
        cart.add(&mouse());
        cart.add(&watch());

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].name, "Smart Watch");
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].quantity, 1);
        assert!(cart.total().approx_eq(429.97));
    }

    #[test]
    fn test_remove_drops_whole_row() {
        let mut cart = Cart::new();
        cart.add(&watch());
        cart.add(&watch());

        assert!(cart.remove("Smart Watch"));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), MonetaryAmount::ZERO);
        assert!(!cart.remove("Smart Watch"));
    }

    #[test]
    fn test_summary_counts_units() {
        let mut cart = Cart::new();
        cart.add(&mouse());
        cart.add(&mouse());
        cart.add(&watch());

        let summary = cart.summary();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.items.len(), 2);
        assert!(summary.total_price.approx_eq(259.97));

        cart.clear();
        assert_eq!(cart.summary().item_count, 0);
    }
}
