#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use shopdesk_core::{CustomerId, ProductId, UserId};
use shopdesk_infra::store::memory::MemoryStore;
use shopdesk_infra::store::Store;
use shopdesk_parties::{Customer, User};
use shopdesk_products::Product;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub user_id: UserId,
    pub customer_id: CustomerId,
}

/// Store seeded with one acting user and one customer.
pub async fn fixture() -> Fixture {
    shopdesk_observability::init();

    let store = Arc::new(MemoryStore::new());
    let user_id = UserId::new();
    let customer_id = CustomerId::new();

    let mut tx = store.begin().await.unwrap();
    tx.upsert_user(&User {
        id: user_id,
        first_name: "Nour".to_string(),
        last_name: "Adel".to_string(),
        email: "nour@example.com".to_string(),
        phone: "0100000001".to_string(),
    })
    .await
    .unwrap();
    tx.upsert_customer(&Customer {
        id: customer_id,
        name: "Salma Fathy".to_string(),
        phone: "0100000002".to_string(),
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    Fixture {
        store,
        user_id,
        customer_id,
    }
}

pub async fn seed_product(
    store: &MemoryStore,
    name: &str,
    selling_price: &str,
    quantity: i64,
) -> ProductId {
    let id = ProductId::new();
    let product = Product::new(
        id,
        name,
        format!("SKU-{id}"),
        dec("1"),
        dec(selling_price),
        quantity,
        None,
    );
    let mut tx = store.begin().await.unwrap();
    tx.upsert_product(&product).await.unwrap();
    tx.commit().await.unwrap();
    id
}

pub async fn stock_of(store: &MemoryStore, id: ProductId) -> i64 {
    store.product(id).await.unwrap().unwrap().quantity
}
