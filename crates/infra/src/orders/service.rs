//! Order transaction coordinator.
//!
//! Wraps aggregate construction/mutation in one unit of work against the
//! store: begin, delegate to the builder, persist, commit. On the first
//! failure everything rolls back and the originating error surfaces
//! unchanged.

use std::sync::Arc;

use tracing::{error, instrument};

use shopdesk_core::{OrderId, UserId};
use shopdesk_orders::{Order, OrderRequest};

use crate::stock::StockLedger;
use crate::store::{Store, StoreTx};

use super::builder;
use super::error::OrderError;

pub struct OrderService<S> {
    store: Arc<S>,
}

impl<S> OrderService<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a new sale.
    #[instrument(skip(self, request), fields(user_id = %acting_user), err)]
    pub async fn create_order(
        &self,
        request: OrderRequest,
        acting_user: UserId,
    ) -> Result<Order, OrderError> {
        let mut tx = self.store.begin().await?;
        let order_id = OrderId::new();
        match create_in_tx(&mut *tx, order_id, &request, acting_user).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(err) => {
                roll_back(tx, &err).await;
                Err(err)
            }
        }
    }

    /// Replace an existing order's content from a full request.
    #[instrument(skip(self, request), fields(order_id = %order_id, user_id = %acting_user), err)]
    pub async fn update_order(
        &self,
        order_id: OrderId,
        request: OrderRequest,
        acting_user: UserId,
    ) -> Result<Order, OrderError> {
        let mut tx = self.store.begin().await?;
        match update_in_tx(&mut *tx, order_id, &request, acting_user).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(err) => {
                roll_back(tx, &err).await;
                Err(err)
            }
        }
    }

    /// Delete a batch of orders, releasing the stock of every line.
    ///
    /// The batch is strict: one missing order aborts the whole operation and
    /// no stock moves.
    #[instrument(skip(self), err)]
    pub async fn delete_orders(&self, order_ids: &[OrderId]) -> Result<u64, OrderError> {
        let mut tx = self.store.begin().await?;
        match delete_in_tx(&mut *tx, order_ids).await {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(err) => {
                roll_back(tx, &err).await;
                Err(err)
            }
        }
    }
}

async fn create_in_tx(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    request: &OrderRequest,
    acting_user: UserId,
) -> Result<Order, OrderError> {
    let order = builder::build_order(tx, order_id, request, acting_user).await?;
    tx.insert_order(&order).await?;
    Ok(order)
}

async fn update_in_tx(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    request: &OrderRequest,
    acting_user: UserId,
) -> Result<Order, OrderError> {
    let mut order = tx
        .order(order_id)
        .await?
        .ok_or(OrderError::OrderNotFound { order_id })?;
    builder::apply_update(tx, &mut order, request, acting_user).await?;
    tx.update_order(&order).await?;
    Ok(order)
}

async fn delete_in_tx(tx: &mut dyn StoreTx, order_ids: &[OrderId]) -> Result<u64, OrderError> {
    let mut deleted = 0u64;
    for &order_id in order_ids {
        let order = tx
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound { order_id })?;
        for line in &order.lines {
            StockLedger::release(tx, line.product_id, line.quantity).await?;
        }
        tx.delete_order(order_id).await?;
        deleted += 1;
    }
    Ok(deleted)
}

async fn roll_back(tx: Box<dyn StoreTx>, cause: &OrderError) {
    if let Err(rollback_err) = tx.rollback().await {
        error!(cause = %cause, error = %rollback_err, "rollback failed after aborted order operation");
    }
}
