use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::product::ProductView;

#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CartLineWithProduct {
    pub line: CartLine,
    pub product: ProductView,
}

/// Outcome of an add-to-cart request: a brand-new line or an incremented one.
#[derive(Debug, Clone)]
pub enum CartUpdate {
    Created(CartLine),
    Incremented(CartLine),
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntryWithProduct {
    pub entry: HistoryEntry,
    pub product: ProductView,
}

/// One purchased line as captured inside the checkout transaction.
///
/// Name and unit price are copied out at purchase time so the receipt is
/// immune to later catalog edits.
#[derive(Debug, Clone)]
pub struct PurchasedLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i32,
}

/// Receipt handed to the notification gateway after checkout commits.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub recipient: String,
    pub lines: Vec<PurchasedLine>,
    pub total: i64,
}

impl Receipt {
    pub fn new(recipient: String, lines: Vec<PurchasedLine>) -> Self {
        let total = lines
            .iter()
            .map(|l| i64::from(l.unit_price) * i64::from(l.quantity))
            .sum();
        Self {
            recipient,
            lines,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, quantity: i32, unit_price: i32) -> PurchasedLine {
        PurchasedLine {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn receipt_total_sums_price_times_quantity() {
        let receipt = Receipt::new(
            "buyer@example.com".to_string(),
            vec![line("A", 2, 300), line("B", 1, 150)],
        );
        assert_eq!(receipt.total, 750);
    }

    #[test]
    fn receipt_total_is_zero_for_no_lines() {
        let receipt = Receipt::new("buyer@example.com".to_string(), vec![]);
        assert_eq!(receipt.total, 0);
    }

    #[test]
    fn receipt_total_does_not_overflow_i32() {
        let receipt = Receipt::new(
            "buyer@example.com".to_string(),
            vec![line("bulk", 2_000_000, 2_000_000)],
        );
        assert_eq!(receipt.total, 4_000_000_000_000);
    }
}
