//! Persistent store abstraction.
//!
//! The write side is an explicit unit of work: [`Store::begin`] hands out a
//! [`StoreTx`]; every read and write of one business operation goes through
//! that transaction, and [`StoreTx::commit`] / [`StoreTx::rollback`] consume
//! it. Nothing a transaction did is visible to other callers until commit.
//!
//! The read side ([`Store`]'s non-transactional accessors) serves the query
//! projections and never mutates state.
//!
//! Two backends are provided:
//!
//! - [`memory::MemoryStore`]: serializes whole transactions behind one async
//!   mutex. Intended for tests/dev.
//! - [`postgres::PgStore`]: sqlx/Postgres; rows read for mutation inside a
//!   transaction are locked with `SELECT ... FOR UPDATE`, so concurrent
//!   stock checks never observe a stale quantity.

pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use thiserror::Error;

use shopdesk_core::{CustomerId, MerchantId, OrderId, ProductId, PurchaseId, UserId};
use shopdesk_orders::Order;
use shopdesk_parties::{Customer, Merchant, User};
use shopdesk_products::Product;
use shopdesk_purchasing::Purchase;

/// Persistence boundary failure.
///
/// Business rules never live here; a `StoreError` means the storage layer
/// itself could not complete an operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection loss, constraint violation, lock
    /// poisoning, ...). Not business-actionable beyond retrying.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// The write conflicts with existing state (duplicate insert, update of
    /// a missing row, concurrent commit).
    #[error("storage conflict: {0}")]
    Conflict(String),
}

/// Handle to the persistent store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a unit of work. Writes inside it become visible only on commit.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    // Read-side accessors (no transaction, never mutate).
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn merchant(&self, id: MerchantId) -> Result<Option<Merchant>, StoreError>;
    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// All orders, in a stable (order date, id) order.
    async fn orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, StoreError>;
    /// All purchases, in a stable (order date, id) order.
    async fn purchases(&self) -> Result<Vec<Purchase>, StoreError>;
}

/// One open unit of work.
///
/// Reads performed through the transaction observe the transaction's own
/// writes. Implementations must guarantee that a value read here (product
/// quantity in particular) cannot be changed by a concurrent transaction
/// before this one commits or rolls back.
#[async_trait]
pub trait StoreTx: Send {
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn upsert_product(&mut self, product: &Product) -> Result<(), StoreError>;

    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn upsert_customer(&mut self, customer: &Customer) -> Result<(), StoreError>;

    async fn merchant(&mut self, id: MerchantId) -> Result<Option<Merchant>, StoreError>;
    async fn upsert_merchant(&mut self, merchant: &Merchant) -> Result<(), StoreError>;

    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError>;

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError>;
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError>;
    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError>;
    /// Remove an order and its lines. Returns whether it existed.
    async fn delete_order(&mut self, id: OrderId) -> Result<bool, StoreError>;

    async fn purchase(&mut self, id: PurchaseId) -> Result<Option<Purchase>, StoreError>;
    async fn insert_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError>;
    async fn update_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError>;
    /// Remove a purchase and its items. Returns whether it existed.
    async fn delete_purchase(&mut self, id: PurchaseId) -> Result<bool, StoreError>;

    /// Make every write of this transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
