//! Order aggregate builder.
//!
//! Turns a request into a persistable [`Order`] inside the caller's open
//! transaction: resolves the acting user, walks the requested lines in input
//! order, moves stock through the [`StockLedger`], and recomputes every
//! amount with the pricing calculator. Any failure leaves the transaction to
//! the caller to roll back; no partial stock movement survives.

use chrono::Utc;

use shopdesk_core::{OrderId, UserId};
use shopdesk_orders::pricing::{self, LineAmounts};
use shopdesk_orders::{Order, OrderLine, OrderRequest};

use crate::stock::StockLedger;
use crate::store::StoreTx;

use super::error::OrderError;

/// Create path: build a fresh order aggregate from `request`.
pub(crate) async fn build_order(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    request: &OrderRequest,
    acting_user: UserId,
) -> Result<Order, OrderError> {
    validate(tx, request, acting_user).await?;

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut amounts = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        let product = StockLedger::try_consume(tx, line.product_id, line.quantity).await?;
        amounts.push(pricing::line_amounts(
            line.quantity,
            product.selling_price,
            line.discount_percent,
        ));
        lines.push(OrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            discount_percent: line.discount_percent,
        });
    }

    let totals = pricing::order_totals(amounts);
    Ok(Order {
        id: order_id,
        customer_id: request.customer_id,
        user_id: acting_user,
        order_date: request.order_date.unwrap_or_else(Utc::now),
        notes: request.notes.clone(),
        total_amount: totals.total_amount,
        total_discount: totals.total_discount,
        lines,
    })
}

/// Update path: reconcile `order` against the requested line list.
///
/// Lines are keyed by product: an already-present product is adjusted by its
/// quantity delta, a new product is consumed like on create, and a product
/// missing from the request has its stock released and its line dropped.
/// Every surviving line's amounts and the header totals are recomputed from
/// the current product prices.
pub(crate) async fn apply_update(
    tx: &mut dyn StoreTx,
    order: &mut Order,
    request: &OrderRequest,
    acting_user: UserId,
) -> Result<(), OrderError> {
    validate(tx, request, acting_user).await?;

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut amounts: Vec<LineAmounts> = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        let product = match order.line_quantity(line.product_id) {
            // Stock delta is old − new: a quantity increase consumes the
            // difference, a decrease releases it.
            Some(old_quantity) => {
                StockLedger::adjust_by_delta(tx, line.product_id, old_quantity - line.quantity)
                    .await?
            }
            None => StockLedger::try_consume(tx, line.product_id, line.quantity).await?,
        };
        amounts.push(pricing::line_amounts(
            line.quantity,
            product.selling_price,
            line.discount_percent,
        ));
        lines.push(OrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            discount_percent: line.discount_percent,
        });
    }

    for existing in &order.lines {
        let kept = request
            .lines
            .iter()
            .any(|l| l.product_id == existing.product_id);
        if !kept {
            StockLedger::release(tx, existing.product_id, existing.quantity).await?;
        }
    }

    let totals = pricing::order_totals(amounts);
    order.customer_id = request.customer_id;
    order.user_id = acting_user;
    order.notes = request.notes.clone();
    if let Some(order_date) = request.order_date {
        order.order_date = order_date;
    }
    order.total_amount = totals.total_amount;
    order.total_discount = totals.total_discount;
    order.lines = lines;
    Ok(())
}

async fn validate(
    tx: &mut dyn StoreTx,
    request: &OrderRequest,
    acting_user: UserId,
) -> Result<(), OrderError> {
    if request.lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    request.validate()?;
    if tx.user(acting_user).await?.is_none() {
        return Err(OrderError::UserNotFound {
            user_id: acting_user,
        });
    }
    Ok(())
}
