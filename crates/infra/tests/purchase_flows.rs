//! Purchase recording tests: totals, wholesale item replacement, lenient
//! batch deletion, and listings.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use common::{dec, fixture};
use shopdesk_core::{MerchantId, PurchaseId};
use shopdesk_infra::purchasing::{
    PurchaseError, PurchaseFilter, PurchaseService, PurchaseSort, PurchaseSortField,
};
use shopdesk_infra::store::memory::MemoryStore;
use shopdesk_infra::store::query::{Pagination, SortDirection};
use shopdesk_infra::store::Store;
use shopdesk_parties::Merchant;
use shopdesk_purchasing::{PurchaseItemRequest, PurchaseRequest};

async fn seed_merchant(store: &MemoryStore, name: &str) -> MerchantId {
    let id = MerchantId::new();
    let mut tx = store.begin().await.unwrap();
    tx.upsert_merchant(&Merchant {
        id,
        name: name.to_string(),
        phone: "0111111111".to_string(),
        address: "12 Market St".to_string(),
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();
    id
}

fn item(name: &str, quantity: i64, price: &str) -> PurchaseItemRequest {
    PurchaseItemRequest {
        product_name: name.to_string(),
        quantity,
        price_per_unit: dec(price),
    }
}

fn request(
    merchant_id: MerchantId,
    days_ago: i64,
    notes: Option<&str>,
    items: Vec<PurchaseItemRequest>,
) -> PurchaseRequest {
    PurchaseRequest {
        merchant_id,
        order_date: Some(Utc::now() - Duration::days(days_ago)),
        notes: notes.map(str::to_string),
        items,
    }
}

#[tokio::test]
async fn create_computes_item_and_header_totals() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    let purchase = service
        .create_purchase(request(
            merchant,
            0,
            Some("weekly restock"),
            vec![item("Beans", 4, "2.50"), item("Rice", 2, "3.00")],
        ))
        .await
        .unwrap();

    assert_eq!(purchase.items[0].total_price, dec("10"));
    assert_eq!(purchase.items[1].total_price, dec("6"));
    assert_eq!(purchase.total_amount, dec("16"));

    let stored = f.store.purchase(purchase.id).await.unwrap().unwrap();
    assert_eq!(stored, purchase);
}

#[tokio::test]
async fn empty_item_list_is_rejected() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    let err = service
        .create_purchase(request(merchant, 0, None, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, PurchaseError::EmptyPurchase));
}

#[tokio::test]
async fn update_replaces_items_wholesale() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    let purchase = service
        .create_purchase(request(merchant, 0, None, vec![item("Beans", 4, "2.50")]))
        .await
        .unwrap();

    let updated = service
        .update_purchase(
            purchase.id,
            request(merchant, 0, Some("corrected"), vec![item("Rice", 3, "3.00")]),
        )
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].product_name, "Rice");
    assert_eq!(updated.total_amount, dec("9"));
    assert_eq!(updated.notes.as_deref(), Some("corrected"));

    let stored = f.store.purchase(purchase.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_of_missing_purchase_fails() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));
    let ghost = PurchaseId::new();

    let err = service
        .update_purchase(ghost, request(merchant, 0, None, vec![item("Rice", 1, "1")]))
        .await
        .unwrap_err();
    match err {
        PurchaseError::PurchaseNotFound { purchase_id } => assert_eq!(purchase_id, ghost),
        other => panic!("Expected PurchaseNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_skips_missing_purchases() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    let first = service
        .create_purchase(request(merchant, 1, None, vec![item("Beans", 1, "2")]))
        .await
        .unwrap();
    let second = service
        .create_purchase(request(merchant, 0, None, vec![item("Rice", 1, "3")]))
        .await
        .unwrap();

    let deleted = service
        .delete_purchases(&[first.id, PurchaseId::new(), second.id])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert!(f.store.purchase(first.id).await.unwrap().is_none());
    assert!(f.store.purchase(second.id).await.unwrap().is_none());
}

#[tokio::test]
async fn purchase_total_recomputes_from_items() {
    let f = fixture().await;
    let merchant = seed_merchant(&f.store, "Wholesale House").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    let purchase = service
        .create_purchase(request(
            merchant,
            0,
            None,
            vec![item("Beans", 4, "2.50"), item("Rice", 1, "0.99")],
        ))
        .await
        .unwrap();

    assert_eq!(
        service.purchase_total(purchase.id).await.unwrap(),
        dec("10.99")
    );
}

#[tokio::test]
async fn listing_filters_and_sorts() {
    let f = fixture().await;
    let wholesale = seed_merchant(&f.store, "Wholesale House").await;
    let farm = seed_merchant(&f.store, "Green Farm").await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    service
        .create_purchase(request(
            wholesale,
            3,
            Some("weekly restock"),
            vec![item("Beans", 10, "2")],
        ))
        .await
        .unwrap(); // 20
    service
        .create_purchase(request(farm, 1, None, vec![item("Eggs", 30, "0.50")]))
        .await
        .unwrap(); // 15

    // Search hits notes and merchant name.
    let by_notes = service
        .list_purchases(
            Pagination::default(),
            &PurchaseFilter {
                search: Some("restock".to_string()),
                ..PurchaseFilter::default()
            },
            PurchaseSort::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_notes.total_count, 1);
    assert_eq!(by_notes.items[0].merchant.name, "Wholesale House");

    let by_merchant = service
        .list_purchases(
            Pagination::default(),
            &PurchaseFilter {
                search: Some("green".to_string()),
                ..PurchaseFilter::default()
            },
            PurchaseSort::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_merchant.total_count, 1);

    // Sort by amount descending.
    let by_amount = service
        .list_purchases(
            Pagination::default(),
            &PurchaseFilter::default(),
            PurchaseSort {
                field: PurchaseSortField::TotalAmount,
                direction: SortDirection::Descending,
            },
        )
        .await
        .unwrap();
    assert_eq!(by_amount.items[0].total_amount, dec("20"));

    // Unknown sort field falls back to order date ascending.
    let fallback = service
        .list_purchases(
            Pagination::default(),
            &PurchaseFilter::default(),
            PurchaseSort::parse("Supplier", false),
        )
        .await
        .unwrap();
    assert_eq!(fallback.items[0].total_amount, dec("20"));
}

#[tokio::test]
async fn detail_falls_back_on_missing_merchant() {
    let f = fixture().await;
    let service = PurchaseService::new(Arc::clone(&f.store));

    // Merchant never stored.
    let purchase = service
        .create_purchase(request(MerchantId::new(), 0, None, vec![item("Beans", 1, "2")]))
        .await
        .unwrap();

    let detail = service.purchase_detail(purchase.id).await.unwrap();
    assert_eq!(detail.merchant.name, "Unknown Merchant");
    assert_eq!(detail.total_amount, dec("2"));
}
