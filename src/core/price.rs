//! 價格解析與總額對帳

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::sync::OnceLock;

/// 顯示總額與計算總額之間允許的絕對誤差
pub const RECONCILE_TOLERANCE: f64 = 0.01;

fn currency_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // 只接受 ASCII 數字，f64 解析不了其他數字系統
    PATTERN.get_or_init(|| {
        Regex::new(r"\$?([0-9]+(?:\.[0-9]*)?)").expect("valid currency pattern")
    })
}

/// A non-negative currency amount read off the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonetaryAmount(f64);

impl MonetaryAmount {
    pub const ZERO: MonetaryAmount = MonetaryAmount(0.0);

    /// Negative and non-finite inputs collapse to zero.
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.0 * f64::from(quantity))
    }

    pub fn approx_eq(&self, other: f64) -> bool {
        (self.0 - other).abs() < RECONCILE_TOLERANCE
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for MonetaryAmount {
    type Output = MonetaryAmount;

    fn add(self, rhs: Self) -> Self::Output {
        MonetaryAmount(self.0 + rhs.0)
    }
}

impl Sum for MonetaryAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MonetaryAmount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MonetaryAmount> for MonetaryAmount {
    fn sum<I: Iterator<Item = &'a MonetaryAmount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// One priced row of a cart-like listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub amount: MonetaryAmount,
}

impl LineItem {
    pub fn new(name: impl Into<String>, amount: MonetaryAmount) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }

    /// 由頁面擷取的名稱與價格文字建立
    pub fn from_text(name: impl Into<String>, price_text: &str) -> Self {
        Self::new(name, parse_currency(price_text))
    }
}

/// Scans `text` for the first `$12.50`-style number.
///
/// Returns `None` when the text holds no ASCII digits, or when the number is
/// too large to represent, so callers can tell a blank or broken field apart
/// from a genuine `0.00`.
pub fn try_parse_currency(text: &str) -> Option<MonetaryAmount> {
    let captures = currency_pattern().captures(text)?;
    let digits = captures.get(1)?.as_str();
    let value = digits.parse::<f64>().ok()?;
    if !value.is_finite() {
        tracing::warn!("⚠️ Currency value out of range ({} digits)", digits.len());
        return None;
    }
    Some(MonetaryAmount::new(value))
}

/// Parses displayed currency text, falling back to zero when nothing numeric
/// is present.
///
/// ```
/// use ekart_harness::core::price::parse_currency;
///
/// assert_eq!(parse_currency("Total: $7.75").value(), 7.75);
/// assert_eq!(parse_currency("n/a").value(), 0.0);
/// ```
pub fn parse_currency(text: &str) -> MonetaryAmount {
    try_parse_currency(text).unwrap_or_else(|| {
        tracing::debug!("No currency value found in {:?}, using 0.00", text);
        MonetaryAmount::ZERO
    })
}

/// Sum of line items minus the displayed total.
pub fn reconciliation_delta(items: &[LineItem], displayed_total_text: &str) -> f64 {
    let computed: MonetaryAmount = items.iter().map(|item| item.amount).sum();
    computed.value() - parse_currency(displayed_total_text).value()
}

/// True when the line items add up to the displayed total within a cent.
pub fn reconcile_total(items: &[LineItem], displayed_total_text: &str) -> bool {
    reconciliation_delta(items, displayed_total_text).abs() < RECONCILE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(rows: &[(&str, &str)]) -> Vec<LineItem> {
        rows.iter()
            .map(|(name, price)| LineItem::from_text(*name, price))
            .collect()
    }

    #[test]
    fn test_parse_currency_basic_forms() {
        assert_eq!(parse_currency("$12.50").value(), 12.50);
        assert_eq!(parse_currency("12.5").value(), 12.5);
        assert_eq!(parse_currency("Total: $0.00").value(), 0.0);
        assert_eq!(parse_currency("7").value(), 7.0);
        assert_eq!(parse_currency("12.").value(), 12.0);
    }

    #[test]
    fn test_parse_currency_without_digits_is_zero() {
        assert_eq!(parse_currency("no digits here"), MonetaryAmount::ZERO);
        assert_eq!(parse_currency(""), MonetaryAmount::ZERO);
        assert_eq!(parse_currency("$"), MonetaryAmount::ZERO);
    }

    #[test]
    fn test_parse_currency_uses_first_match() {
        assert_eq!(parse_currency("$1.00 and $2.00").value(), 1.0);
        assert_eq!(parse_currency("Qty: 3 at $4.00").value(), 3.0);
    }

    #[test]
    fn test_parse_currency_is_idempotent() {
        let text = "Subtotal $19.99 (2 items)";
        assert_eq!(parse_currency(text), parse_currency(text));
    }

    #[test]
    fn test_try_parse_distinguishes_blank_from_zero() {
        assert_eq!(try_parse_currency(""), None);
        assert_eq!(try_parse_currency("   "), None);
        assert_eq!(try_parse_currency("$0.00"), Some(MonetaryAmount::ZERO));
    }

    #[test]
    fn test_parse_currency_skips_non_ascii_digits() {
        // 阿拉伯數字 ٣ 不算價格
        let text = "\u{0663} x $4.00";
        assert_eq!(try_parse_currency(text), Some(MonetaryAmount::new(4.0)));
        assert_eq!(parse_currency(text).value(), 4.0);
        assert_eq!(try_parse_currency("\u{0663}\u{0664}"), None);
    }

    #[test]
    fn test_try_parse_rejects_out_of_range_number() {
        let text = format!("${}", "9".repeat(400));
        assert_eq!(try_parse_currency(&text), None);
        assert_eq!(parse_currency(&text), MonetaryAmount::ZERO);
    }

    #[test]
    fn test_reconcile_matching_total() {
        let rows = items(&[("A", "$3.50"), ("B", "$4.25")]);
        assert!(reconcile_total(&rows, "Total: $7.75"));
    }

    #[test]
    fn test_reconcile_mismatched_total() {
        let rows = items(&[("A", "$3.50")]);
        assert!(!reconcile_total(&rows, "Total: $4.00"));
        assert!((reconciliation_delta(&rows, "Total: $4.00") + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_absorbs_float_noise() {
        let rows = items(&[("A", "0.1"), ("B", "0.2")]);
        assert!(reconcile_total(&rows, "0.30"));

        // 一分錢的差距不在容許範圍內
        let rows = items(&[("A", "$1.00")]);
        assert!(!reconcile_total(&rows, "$1.02"));
    }

    #[test]
    fn test_reconcile_is_order_independent() {
        let forward = items(&[("A", "$79.99"), ("B", "$29.99"), ("C", "$49.99")]);
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            reconcile_total(&forward, "159.97"),
            reconcile_total(&reversed, "159.97")
        );
        assert!(reconcile_total(&reversed, "159.97"));
    }

    #[test]
    fn test_empty_items_reconcile_against_zero_or_blank() {
        assert!(reconcile_total(&[], "0.00"));
        assert!(reconcile_total(&[], ""));
        assert!(!reconcile_total(&[], "$5.00"));
    }

    #[test]
    fn test_monetary_amount_helpers() {
        assert_eq!(MonetaryAmount::new(-4.0), MonetaryAmount::ZERO);
        assert_eq!(MonetaryAmount::new(f64::NAN), MonetaryAmount::ZERO);
        assert_eq!(MonetaryAmount::new(3.5).times(2).value(), 7.0);
        assert_eq!(MonetaryAmount::new(3.5).to_string(), "$3.50");
        assert!(MonetaryAmount::new(7.749).approx_eq(7.75));
    }
}
