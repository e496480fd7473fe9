use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, MerchantId, PurchaseId};

/// One bought item within a purchase.
///
/// Purchases are spend records against a merchant, so items are name-based
/// rather than catalog references; they do not move product stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    /// `quantity × price_per_unit`, maintained by [`Purchase::recompute_totals`].
    pub total_price: Decimal,
}

/// A purchase from a merchant: header plus its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub merchant_id: MerchantId,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    /// Sum of item total prices, maintained by [`Purchase::recompute_totals`].
    pub total_amount: Decimal,
    pub items: Vec<PurchaseItem>,
}

impl Purchase {
    /// Recompute every item's `total_price` and the header `total_amount`
    /// from the current quantities and unit prices.
    pub fn recompute_totals(&mut self) {
        let mut total = Decimal::ZERO;
        for item in &mut self.items {
            item.total_price = Decimal::from(item.quantity) * item.price_per_unit;
            total += item.total_price;
        }
        self.total_amount = total;
    }
}

/// Requested item content for purchase creation/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItemRequest {
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit: Decimal,
}

impl PurchaseItemRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.product_name.trim().is_empty() {
            return Err(DomainError::validation("item product name cannot be empty"));
        }
        if self.quantity < 1 {
            return Err(DomainError::validation("item quantity must be at least 1"));
        }
        if self.price_per_unit < Decimal::ZERO {
            return Err(DomainError::validation("item price cannot be negative"));
        }
        Ok(())
    }

    pub fn into_item(self) -> PurchaseItem {
        let total_price = Decimal::from(self.quantity) * self.price_per_unit;
        PurchaseItem {
            product_name: self.product_name,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            total_price,
        }
    }
}

/// Purchase creation/update request. Updates replace the item list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub merchant_id: MerchantId,
    /// Defaults to now when absent (creation) or keeps the stored date (update).
    pub order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseItemRequest>,
}

impl PurchaseRequest {
    pub fn validate(&self) -> DomainResult<()> {
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: i64, price: &str) -> PurchaseItemRequest {
        PurchaseItemRequest {
            product_name: "Beans".to_string(),
            quantity,
            price_per_unit: dec(price),
        }
    }

    #[test]
    fn into_item_computes_total_price() {
        let item = item(4, "2.50").into_item();
        assert_eq!(item.total_price, dec("10"));
    }

    #[test]
    fn recompute_totals_sums_items() {
        let mut purchase = Purchase {
            id: PurchaseId::new(),
            merchant_id: MerchantId::new(),
            order_date: Utc::now(),
            notes: None,
            total_amount: Decimal::ZERO,
            items: vec![item(4, "2.50").into_item(), item(1, "0.99").into_item()],
        };
        purchase.items[0].quantity = 2;
        purchase.recompute_totals();
        assert_eq!(purchase.items[0].total_price, dec("5"));
        assert_eq!(purchase.total_amount, dec("5.99"));
    }

    #[test]
    fn rejects_blank_name_and_bad_numbers() {
        assert!(item(0, "1").validate().is_err());
        assert!(item(1, "-0.01").validate().is_err());
        let mut blank = item(1, "1");
        blank.product_name = "  ".to_string();
        assert!(blank.validate().is_err());
    }
}
