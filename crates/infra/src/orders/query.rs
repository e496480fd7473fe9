//! Order query projector.
//!
//! Read-only composition of order, customer, acting-user, and product records
//! into detail and listing views. Joined records that have gone missing
//! degrade to "Unknown ..." placeholders instead of failing the read; sorting
//! is restricted to a closed field enumeration with a deterministic fallback.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use shopdesk_core::{CustomerId, OrderId, ProductId, UserId};
use shopdesk_orders::pricing;
use shopdesk_orders::Order;

use crate::store::query::{PagedResult, Pagination, SortDirection};
use crate::store::Store;

use super::error::OrderError;
use super::invoice::{Invoice, InvoiceItem};

const UNKNOWN_CUSTOMER: &str = "Unknown Customer";
const UNKNOWN_PRODUCT: &str = "Unknown Product";
const UNKNOWN_PHONE: &str = "Unknown Phone";

/// Customer slice of an order view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
}

/// Acting-user slice of an order view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// One line of an order view, priced at the product's current selling price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineDetail {
    pub product_id: ProductId,
    pub product_name: String,
    pub selling_price: Decimal,
    pub quantity: i64,
    pub discount_percent: Decimal,
    pub subtotal: Decimal,
}

/// Full order view: header totals plus joined customer/user/line data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub total_discount: Decimal,
    pub customer: CustomerSummary,
    pub user: Option<UserSummary>,
    pub lines: Vec<OrderLineDetail>,
}

/// Listing filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive match against the customer name or any line's
    /// product name.
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
}

/// Closed enumeration of sortable listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortField {
    #[default]
    OrderDate,
    TotalAmount,
    CustomerName,
}

impl OrderSortField {
    /// Map a caller-supplied field name onto the enumeration.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "orderdate" | "order_date" | "date" => Some(OrderSortField::OrderDate),
            "totalamount" | "total_amount" | "amount" => Some(OrderSortField::TotalAmount),
            "customer" | "customername" | "customer_name" => Some(OrderSortField::CustomerName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub direction: SortDirection,
}

impl OrderSort {
    /// Resolve a caller-supplied sort. An unrecognized field name falls back
    /// to order date ascending.
    pub fn parse(field: &str, descending: bool) -> Self {
        match OrderSortField::parse(field) {
            Some(parsed) => Self {
                field: parsed,
                direction: if descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            },
            None => {
                warn!(field, "unrecognized order sort field; using order date ascending");
                Self::default()
            }
        }
    }
}

/// Read-side order queries. Never mutates state.
pub struct OrderQueries<S> {
    store: Arc<S>,
}

impl<S> OrderQueries<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Detail view of one order.
    pub async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;
        Ok(self.project(&order).await?)
    }

    /// Paged listing with optional filters and sort.
    pub async fn list_orders(
        &self,
        pagination: Pagination,
        filter: &OrderFilter,
        sort: OrderSort,
    ) -> Result<PagedResult<OrderDetail>, OrderError> {
        let orders = self.store.orders().await?;
        let mut details = Vec::with_capacity(orders.len());
        for order in &orders {
            details.push(self.project(order).await?);
        }

        details.retain(|d| matches_filter(d, filter));
        sort_details(&mut details, sort);
        Ok(PagedResult::paginate(details, pagination))
    }

    /// Paged listing of one customer's orders, in placement order.
    pub async fn customer_orders(
        &self,
        customer_id: CustomerId,
        pagination: Pagination,
    ) -> Result<PagedResult<OrderDetail>, OrderError> {
        let orders = self.store.orders().await?;
        let mut details = Vec::new();
        for order in &orders {
            if order.customer_id == customer_id {
                details.push(self.project(order).await?);
            }
        }
        Ok(PagedResult::paginate(details, pagination))
    }

    /// Recompute an order's value from its lines at current selling prices.
    pub async fn order_total(&self, order_id: OrderId) -> Result<Decimal, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;

        let mut total = Decimal::ZERO;
        for line in &order.lines {
            let selling_price = match self.store.product(line.product_id).await? {
                Some(product) => product.selling_price,
                None => Decimal::ZERO,
            };
            total += pricing::line_subtotal(line.quantity, selling_price, line.discount_percent);
        }
        Ok(total)
    }

    /// Sum of `total_amount` across all orders.
    pub async fn total_sales(&self) -> Result<Decimal, OrderError> {
        let orders = self.store.orders().await?;
        Ok(orders.iter().map(|o| o.total_amount).sum())
    }

    /// Invoice document description for a committed order.
    ///
    /// The gross total, discount, and final amount reconcile exactly:
    /// `final_amount = total_amount − total_discount` where `total_amount`
    /// here is the undiscounted value.
    pub async fn invoice(&self, order_id: OrderId) -> Result<Invoice, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;

        let customer_name = match self.store.customer(order.customer_id).await? {
            Some(customer) => customer.name,
            None => UNKNOWN_CUSTOMER.to_string(),
        };
        let user_name = match self.store.user(order.user_id).await? {
            Some(user) => user.display_name(),
            None => "Unknown User".to_string(),
        };

        let mut items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let (product_name, unit_price) = match self.store.product(line.product_id).await? {
                Some(product) => (product.name, product.selling_price),
                None => (UNKNOWN_PRODUCT.to_string(), Decimal::ZERO),
            };
            let amounts = pricing::line_amounts(line.quantity, unit_price, line.discount_percent);
            items.push(InvoiceItem {
                product_name,
                quantity: line.quantity,
                unit_price,
                discount_percent: line.discount_percent,
                subtotal: amounts.subtotal,
            });
        }

        Ok(Invoice {
            order_id: order.id,
            order_date: order.order_date,
            customer_name,
            user_name,
            total_amount: order.total_amount + order.total_discount,
            total_discount: order.total_discount,
            final_amount: order.total_amount,
            items,
        })
    }

    async fn project(&self, order: &Order) -> Result<OrderDetail, OrderError> {
        let customer = match self.store.customer(order.customer_id).await? {
            Some(customer) => CustomerSummary {
                id: customer.id,
                name: customer.name,
                phone: customer.phone,
            },
            None => CustomerSummary {
                id: order.customer_id,
                name: UNKNOWN_CUSTOMER.to_string(),
                phone: UNKNOWN_PHONE.to_string(),
            },
        };

        let user = self.store.user(order.user_id).await?.map(|user| UserSummary {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
        });

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let (product_name, selling_price) = match self.store.product(line.product_id).await? {
                Some(product) => (product.name, product.selling_price),
                None => (UNKNOWN_PRODUCT.to_string(), Decimal::ZERO),
            };
            lines.push(OrderLineDetail {
                product_id: line.product_id,
                product_name,
                selling_price,
                quantity: line.quantity,
                discount_percent: line.discount_percent,
                subtotal: pricing::line_subtotal(
                    line.quantity,
                    selling_price,
                    line.discount_percent,
                ),
            });
        }

        Ok(OrderDetail {
            id: order.id,
            order_date: order.order_date,
            notes: order.notes.clone(),
            total_amount: order.total_amount,
            total_discount: order.total_discount,
            customer,
            user,
            lines,
        })
    }
}

fn matches_filter(detail: &OrderDetail, filter: &OrderFilter) -> bool {
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let customer_hit = detail.customer.name.to_lowercase().contains(&needle);
        let product_hit = detail
            .lines
            .iter()
            .any(|l| l.product_name.to_lowercase().contains(&needle));
        if !customer_hit && !product_hit {
            return false;
        }
    }
    if let Some(min) = filter.min_amount {
        if detail.total_amount < min {
            return false;
        }
    }
    if let Some(max) = filter.max_amount {
        if detail.total_amount > max {
            return false;
        }
    }
    if let Some(after) = filter.placed_after {
        if detail.order_date < after {
            return false;
        }
    }
    if let Some(before) = filter.placed_before {
        if detail.order_date > before {
            return false;
        }
    }
    true
}

fn sort_details(details: &mut [OrderDetail], sort: OrderSort) {
    // Stable sort keeps the (order date, id) store order for equal keys.
    match sort.field {
        OrderSortField::OrderDate => details.sort_by_key(|d| d.order_date),
        OrderSortField::TotalAmount => details.sort_by(|a, b| a.total_amount.cmp(&b.total_amount)),
        OrderSortField::CustomerName => {
            details.sort_by(|a, b| a.customer.name.cmp(&b.customer.name))
        }
    }
    if sort.direction == SortDirection::Descending {
        details.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_field_parse_accepts_aliases() {
        assert_eq!(
            OrderSortField::parse("OrderDate"),
            Some(OrderSortField::OrderDate)
        );
        assert_eq!(
            OrderSortField::parse("total_amount"),
            Some(OrderSortField::TotalAmount)
        );
        assert_eq!(
            OrderSortField::parse("customer"),
            Some(OrderSortField::CustomerName)
        );
        assert_eq!(OrderSortField::parse("Profit"), None);
    }

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let sort = OrderSort::parse("Profit", true);
        assert_eq!(sort, OrderSort::default());
        assert_eq!(sort.direction, SortDirection::Ascending);
    }
}
