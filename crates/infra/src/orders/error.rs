use thiserror::Error;

use shopdesk_core::{DomainError, OrderId, ProductId, UserId};

use crate::stock::StockError;
use crate::store::StoreError;

/// Order operation failure.
///
/// Business failures carry enough context (product/order/user id) for the
/// caller to act on; `Storage` wraps unexpected persistence failures, which
/// always follow a full rollback and are not retried here.
#[derive(Debug, Error)]
pub enum OrderError {
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

    #[error("user {user_id} does not exist")]
    UserNotFound { user_id: UserId },

    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },

    #[error("order must contain at least one line")]
    EmptyOrder,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl From<StockError> for OrderError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::ProductNotFound { product_id } => OrderError::ProductNotFound { product_id },
            StockError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            StockError::Storage(e) => OrderError::Storage(e),
        }
    }
}
