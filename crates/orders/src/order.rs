use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{CustomerId, DomainError, DomainResult, OrderId, ProductId, UserId};

/// One product entry within an order.
///
/// Exclusively owned by its [`Order`]. The unit price is not stored here;
/// it is read from the product at build time and amounts are recomputed on
/// every rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Percentage, 0–100.
    pub discount_percent: Decimal,
}

/// A recorded sale: header plus its full set of lines, one consistency unit.
///
/// `total_amount` and `total_discount` are always recomputed from the current
/// lines before persistence; they are never accepted from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Who recorded the sale.
    pub user_id: UserId,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    /// Sum of line subtotals after discount.
    pub total_amount: Decimal,
    /// Sum of line discount amounts.
    pub total_discount: Decimal,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Quantity currently on the order for `product_id`, if any.
    pub fn line_quantity(&self, product_id: ProductId) -> Option<i64> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
    }
}

/// Requested line content for order creation/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Percentage, 0–100.
    pub discount_percent: Decimal,
}

impl OrderLineRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity < 1 {
            return Err(DomainError::validation("line quantity must be at least 1"));
        }
        if self.discount_percent < Decimal::ZERO || self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "discount must be a percentage between 0 and 100",
            ));
        }
        Ok(())
    }
}

/// Order creation/update request.
///
/// Updates always carry the full requested line list; the builder reconciles
/// it against the existing order. There are no partial field patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    /// Defaults to now when absent.
    pub order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

impl OrderRequest {
    /// Validate line-level input and the one cross-line rule: a product may
    /// appear at most once, because lines are keyed by product on update.
    pub fn validate(&self) -> DomainResult<()> {
        for line in &self.lines {
            line.validate()?;
        }
        for (idx, line) in self.lines.iter().enumerate() {
            if self.lines[..idx].iter().any(|l| l.product_id == line.product_id) {
                return Err(DomainError::validation(format!(
                    "product {} appears more than once in the line list",
                    line.product_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, discount: i64) -> OrderLineRequest {
        OrderLineRequest {
            product_id: ProductId::new(),
            quantity,
            discount_percent: Decimal::from(discount),
        }
    }

    #[test]
    fn accepts_valid_lines() {
        let request = OrderRequest {
            customer_id: CustomerId::new(),
            order_date: None,
            notes: None,
            lines: vec![line(1, 0), line(10, 100)],
        };
        request.validate().unwrap();
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = line(0, 0).validate().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("quantity")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn rejects_discount_out_of_range() {
        assert!(line(1, 101).validate().is_err());
        assert!(line(1, -1).validate().is_err());
    }

    #[test]
    fn rejects_duplicate_product() {
        let repeated = line(1, 0);
        let request = OrderRequest {
            customer_id: CustomerId::new(),
            order_date: None,
            notes: None,
            lines: vec![repeated.clone(), repeated],
        };
        let err = request.validate().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("more than once")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn line_quantity_finds_by_product() {
        let product_id = ProductId::new();
        let order = Order {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            user_id: UserId::new(),
            order_date: Utc::now(),
            notes: None,
            total_amount: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            lines: vec![OrderLine {
                product_id,
                quantity: 4,
                discount_percent: Decimal::ZERO,
            }],
        };
        assert_eq!(order.line_quantity(product_id), Some(4));
        assert_eq!(order.line_quantity(ProductId::new()), None);
    }
}
