//! Invoice document description.
//!
//! Assembled from a committed order by [`super::OrderQueries::invoice`];
//! rendering (PDF, receipt printer) is a downstream concern and not handled
//! here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_name: String,
    pub user_name: String,
    /// Undiscounted order value.
    pub total_amount: Decimal,
    pub total_discount: Decimal,
    /// `total_amount − total_discount`; what the customer pays.
    pub final_amount: Decimal,
    pub items: Vec<InvoiceItem>,
}
