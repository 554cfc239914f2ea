//! In-memory stand-in for the Mini E-Kart page.
//!
//! Renders the cart the same way the page script does: row prices are unit
//! prices with a `$`, a `Qty: N` label only appears past one unit, and the
//! total element holds the bare two-decimal number.

use crate::config::suite_config::PageConfig;
use crate::core::cart::{Cart, Product};
use crate::domain::model::{CartRow, ProductCard};
use crate::domain::ports::{CartPage, PageLauncher};
use crate::utils::error::{HarnessError, Result};
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct SimulatedBrowser {
    title: String,
    catalog: Vec<Product>,
}

impl SimulatedBrowser {
    pub fn new(title: impl Into<String>, catalog: Vec<Product>) -> Self {
        Self {
            title: title.into(),
            catalog,
        }
    }

    pub fn from_config(page: &PageConfig) -> Self {
        Self::new(page.title.clone(), page.catalog())
    }
}

impl PageLauncher for SimulatedBrowser {
    type Page = SimulatedPage;

    fn launch(&self) -> Result<SimulatedPage> {
        tracing::debug!("Launching simulated page with {} products", self.catalog.len());
        Ok(SimulatedPage {
            title: self.title.clone(),
            catalog: self.catalog.clone(),
            cart: Cart::new(),
            loaded: false,
        })
    }
}

#[derive(Debug)]
pub struct SimulatedPage {
    title: String,
    catalog: Vec<Product>,
    cart: Cart,
    loaded: bool,
}

impl SimulatedPage {
    fn ensure_loaded(&self) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(HarnessError::page("page has not been loaded"))
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }
}

impl CartPage for SimulatedPage {
    fn navigate(&mut self) -> Result<()> {
        self.cart.clear();
        self.loaded = true;
        tracing::debug!("Opened {}", self.title);
        Ok(())
    }

    fn title(&self) -> String {
        if self.loaded {
            self.title.clone()
        } else {
            String::new()
        }
    }

    fn product_cards(&self) -> Vec<ProductCard> {
        if !self.loaded {
            return Vec::new();
        }
        self.catalog
            .iter()
            .map(|product| ProductCard {
                name: product.name.clone(),
                price_text: product.price.to_string(),
            })
            .collect()
    }

    fn click_add(&mut self, index: usize) -> Result<()> {
        self.ensure_loaded()?;
        let product = self.catalog.get(index).ok_or_else(|| {
            HarnessError::page(format!("no \"Add to Cart\" button at position {}", index))
        })?;
        self.cart.add(product);
        Ok(())
    }

    fn cart_rows(&self) -> Vec<CartRow> {
        if !self.loaded {
            return Vec::new();
        }
        self.cart
            .items()
            .iter()
            .map(|item| CartRow {
                name: item.name.clone(),
                price_text: item.price.to_string(),
                quantity_text: (item.quantity > 1).then(|| format!("Qty: {}", item.quantity)),
            })
            .collect()
    }

    fn click_remove(&mut self, index: usize) -> Result<()> {
        self.ensure_loaded()?;
        let name = self
            .cart
            .items()
            .get(index)
            .map(|item| item.name.clone())
            .ok_or_else(|| {
                HarnessError::page(format!("no \"Remove\" button at position {}", index))
            })?;
        self.cart.remove(&name);
        Ok(())
    }

    fn total_text(&self) -> Result<String> {
        self.ensure_loaded()?;
        Ok(format!("{:.2}", self.cart.total().value()))
    }

    fn empty_message_visible(&self) -> bool {
        self.loaded && self.cart.is_empty()
    }

    fn snapshot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Title: {}", self.title());
        let _ = writeln!(out, "Products:");
        for card in self.product_cards() {
            let _ = writeln!(out, "  {} | {}", card.name, card.price_text);
        }
        let _ = writeln!(out, "Cart:");
        if self.empty_message_visible() {
            let _ = writeln!(out, "  (empty message visible)");
        }
        for row in self.cart_rows() {
            match &row.quantity_text {
                Some(quantity) => {
                    let _ = writeln!(out, "  {} | {} | {}", row.name, row.price_text, quantity);
                }
                None => {
                    let _ = writeln!(out, "  {} | {}", row.name, row.price_text);
                }
            }
        }
        let total = self.total_text().unwrap_or_default();
        let _ = writeln!(out, "Total: {}", total);
        out
    }
}
