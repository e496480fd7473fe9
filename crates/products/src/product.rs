use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopdesk_core::{CategoryId, ProductId};

/// Product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

/// Requested stock movement would drive the available quantity negative.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("insufficient stock: requested {requested}, available {available}")]
pub struct StockShortage {
    pub requested: i64,
    pub available: i64,
}

/// Catalog product.
///
/// `quantity` is the authoritative available stock count; `in_stock` is
/// derived (`quantity > 0`) and refreshed by every stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Shelf/barcode identifier, unique per catalog.
    pub unique_number: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i64,
    pub in_stock: bool,
    pub status: ProductStatus,
    pub category_id: Option<CategoryId>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unique_number: impl Into<String>,
        purchase_price: Decimal,
        selling_price: Decimal,
        quantity: i64,
        category_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unique_number: unique_number.into(),
            purchase_price,
            selling_price,
            quantity,
            in_stock: quantity > 0,
            status: ProductStatus::Active,
            category_id,
        }
    }

    /// Margin per unit at the current prices.
    pub fn profit(&self) -> Decimal {
        self.selling_price - self.purchase_price
    }

    /// Value of the stock on hand at purchase price.
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.purchase_price
    }

    /// Take `quantity` units out of stock.
    ///
    /// Fails without mutating when fewer than `quantity` units are available.
    pub fn consume(&mut self, quantity: i64) -> Result<(), StockShortage> {
        if self.quantity < quantity {
            return Err(StockShortage {
                requested: quantity,
                available: self.quantity,
            });
        }
        self.quantity -= quantity;
        self.refresh_stock_flag();
        Ok(())
    }

    /// Return `quantity` units to stock.
    pub fn release(&mut self, quantity: i64) {
        self.quantity += quantity;
        self.refresh_stock_flag();
    }

    /// Apply a signed stock delta in one step.
    ///
    /// A negative delta is subject to the same non-negative invariant as
    /// [`Product::consume`].
    pub fn adjust(&mut self, delta: i64) -> Result<(), StockShortage> {
        if self.quantity + delta < 0 {
            return Err(StockShortage {
                requested: -delta,
                available: self.quantity,
            });
        }
        self.quantity += delta;
        self.refresh_stock_flag();
        Ok(())
    }

    fn refresh_stock_flag(&mut self) {
        self.in_stock = self.quantity > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64) -> Product {
        Product::new(
            ProductId::new(),
            "Kettle",
            "SKU-001",
            Decimal::from(7),
            Decimal::from(10),
            quantity,
            None,
        )
    }

    #[test]
    fn consume_decrements_and_updates_flag() {
        let mut p = product(2);
        p.consume(2).unwrap();
        assert_eq!(p.quantity, 0);
        assert!(!p.in_stock);
    }

    #[test]
    fn consume_fails_without_mutating_on_shortage() {
        let mut p = product(1);
        let err = p.consume(3).unwrap_err();
        assert_eq!(
            err,
            StockShortage {
                requested: 3,
                available: 1
            }
        );
        assert_eq!(p.quantity, 1);
        assert!(p.in_stock);
    }

    #[test]
    fn release_restores_flag() {
        let mut p = product(0);
        assert!(!p.in_stock);
        p.release(4);
        assert_eq!(p.quantity, 4);
        assert!(p.in_stock);
    }

    #[test]
    fn adjust_rejects_negative_result() {
        let mut p = product(2);
        p.adjust(3).unwrap();
        assert_eq!(p.quantity, 5);
        p.adjust(-5).unwrap();
        assert_eq!(p.quantity, 0);
        let err = p.adjust(-1).unwrap_err();
        assert_eq!(err.requested, 1);
        assert_eq!(err.available, 0);
    }

    #[test]
    fn derived_prices() {
        let p = product(3);
        assert_eq!(p.profit(), Decimal::from(3));
        assert_eq!(p.total_value(), Decimal::from(21));
    }
}
