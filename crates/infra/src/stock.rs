//! Stock ledger: the single choke point for product quantity mutation.
//!
//! All quantity changes caused by order processing go through these three
//! operations, and always against the caller's open transaction; the ledger
//! never opens its own. That keeps the non-negative-stock invariant and the
//! derived in-stock flag enforced in exactly one place, inside the same
//! isolation scope as the order write.

use thiserror::Error;

use shopdesk_core::ProductId;
use shopdesk_products::Product;

use crate::store::{StoreError, StoreTx};

#[derive(Debug, Error)]
pub enum StockError {
    #[error("product {product_id} does not exist")]
    ProductNotFound { product_id: ProductId },

    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Transactional stock operations.
///
/// Each returns the product as written, so callers get the unit price and
/// remaining quantity without a second read.
pub struct StockLedger;

impl StockLedger {
    /// Decrement available quantity by `quantity` if and only if that many
    /// units are available.
    pub async fn try_consume(
        tx: &mut dyn StoreTx,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Product, StockError> {
        let mut product = Self::load(tx, product_id).await?;
        product
            .consume(quantity)
            .map_err(|shortage| StockError::InsufficientStock {
                product_id,
                requested: shortage.requested,
                available: shortage.available,
            })?;
        tx.upsert_product(&product).await?;
        Ok(product)
    }

    /// Return `quantity` units to stock (line removed or reduced, order
    /// deleted).
    pub async fn release(
        tx: &mut dyn StoreTx,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Product, StockError> {
        let mut product = Self::load(tx, product_id).await?;
        product.release(quantity);
        tx.upsert_product(&product).await?;
        Ok(product)
    }

    /// Apply a signed delta in one step; a negative delta is subject to the
    /// same non-negative invariant as [`StockLedger::try_consume`].
    pub async fn adjust_by_delta(
        tx: &mut dyn StoreTx,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Product, StockError> {
        let mut product = Self::load(tx, product_id).await?;
        if delta == 0 {
            return Ok(product);
        }
        product
            .adjust(delta)
            .map_err(|shortage| StockError::InsufficientStock {
                product_id,
                requested: shortage.requested,
                available: shortage.available,
            })?;
        tx.upsert_product(&product).await?;
        Ok(product)
    }

    async fn load(tx: &mut dyn StoreTx, product_id: ProductId) -> Result<Product, StockError> {
        tx.product(product_id)
            .await?
            .ok_or(StockError::ProductNotFound { product_id })
    }
}
