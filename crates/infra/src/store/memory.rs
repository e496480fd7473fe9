//! In-memory store.
//!
//! Intended for tests/dev. Transactions clone the committed state, mutate the
//! clone, and swap it back on commit; the state mutex is held for the whole
//! transaction, so transactions are fully serialized. That is the strongest
//! form of the isolation the order core requires from its backing store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use shopdesk_core::{CustomerId, MerchantId, OrderId, ProductId, PurchaseId, UserId};
use shopdesk_orders::Order;
use shopdesk_parties::{Customer, Merchant, User};
use shopdesk_products::Product;
use shopdesk_purchasing::Purchase;

use super::{Store, StoreError, StoreTx};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    customers: HashMap<CustomerId, Customer>,
    merchants: HashMap<MerchantId, Merchant>,
    users: HashMap<UserId, User>,
    orders: HashMap<OrderId, Order>,
    purchases: HashMap<PurchaseId, Purchase>,
}

/// In-memory [`Store`] implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        let working = committed.clone();
        Ok(Box::new(MemoryTx { committed, working }))
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.state.lock().await.customers.get(&id).cloned())
    }

    async fn merchant(&self, id: MerchantId) -> Result<Option<Merchant>, StoreError> {
        Ok(self.state.lock().await.merchants.get(&id).cloned())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.state.lock().await.orders.values().cloned().collect();
        orders.sort_by_key(|o| (o.order_date, o.id));
        Ok(orders)
    }

    async fn purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, StoreError> {
        Ok(self.state.lock().await.purchases.get(&id).cloned())
    }

    async fn purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        let mut purchases: Vec<Purchase> =
            self.state.lock().await.purchases.values().cloned().collect();
        purchases.sort_by_key(|p| (p.order_date, p.id));
        Ok(purchases)
    }
}

struct MemoryTx {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn upsert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn upsert_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        self.working.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn merchant(&mut self, id: MerchantId) -> Result<Option<Merchant>, StoreError> {
        Ok(self.working.merchants.get(&id).cloned())
    }

    async fn upsert_merchant(&mut self, merchant: &Merchant) -> Result<(), StoreError> {
        self.working.merchants.insert(merchant.id, merchant.clone());
        Ok(())
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        if self.working.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        self.working.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError> {
        if !self.working.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} does not exist",
                order.id
            )));
        }
        self.working.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<bool, StoreError> {
        Ok(self.working.orders.remove(&id).is_some())
    }

    async fn purchase(&mut self, id: PurchaseId) -> Result<Option<Purchase>, StoreError> {
        Ok(self.working.purchases.get(&id).cloned())
    }

    async fn insert_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError> {
        if self.working.purchases.contains_key(&purchase.id) {
            return Err(StoreError::Conflict(format!(
                "purchase {} already exists",
                purchase.id
            )));
        }
        self.working.purchases.insert(purchase.id, purchase.clone());
        Ok(())
    }

    async fn update_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError> {
        if !self.working.purchases.contains_key(&purchase.id) {
            return Err(StoreError::Conflict(format!(
                "purchase {} does not exist",
                purchase.id
            )));
        }
        self.working.purchases.insert(purchase.id, purchase.clone());
        Ok(())
    }

    async fn delete_purchase(&mut self, id: PurchaseId) -> Result<bool, StoreError> {
        Ok(self.working.purchases.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            mut committed,
            working,
        } = *self;
        *committed = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Dropping the guard discards the working copy.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(quantity: i64) -> Product {
        Product::new(
            ProductId::new(),
            "Lamp",
            "SKU-100",
            Decimal::from(3),
            Decimal::from(5),
            quantity,
            None,
        )
    }

    #[tokio::test]
    async fn commit_makes_writes_visible() {
        let store = MemoryStore::new();
        let p = product(5);

        let mut tx = store.begin().await.unwrap();
        tx.upsert_product(&p).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.product(p.id).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = MemoryStore::new();
        let p = product(5);

        let mut tx = store.begin().await.unwrap();
        tx.upsert_product(&p).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.product(p.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn tx_reads_observe_own_writes() {
        let store = MemoryStore::new();
        let mut p = product(5);

        let mut tx = store.begin().await.unwrap();
        tx.upsert_product(&p).await.unwrap();
        p.quantity = 1;
        tx.upsert_product(&p).await.unwrap();
        let seen = tx.product(p.id).await.unwrap().unwrap();
        assert_eq!(seen.quantity, 1);
        tx.rollback().await.unwrap();
    }
}
