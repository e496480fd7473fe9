//! Purchase recording and queries.
//!
//! Purchases are restocking spend records against a merchant; their items are
//! name-based and never move product stock. Writes still run inside a unit of
//! work so a purchase and its items land together or not at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, instrument, warn};

use shopdesk_core::{DomainError, MerchantId, PurchaseId};
use shopdesk_purchasing::{Purchase, PurchaseItem, PurchaseRequest};

use crate::store::query::{PagedResult, Pagination, SortDirection};
use crate::store::{Store, StoreError, StoreTx};

const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// Purchase operation failure.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("purchase {purchase_id} not found")]
    PurchaseNotFound { purchase_id: PurchaseId },

    #[error("purchase must contain at least one item")]
    EmptyPurchase,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Merchant slice of a purchase view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub id: MerchantId,
    pub name: String,
}

/// Purchase view with its joined merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDetail {
    pub id: PurchaseId,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub merchant: MerchantSummary,
    pub items: Vec<PurchaseItem>,
}

/// Listing filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    /// Case-insensitive match against the notes or the merchant name.
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
}

/// Closed enumeration of sortable purchase listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseSortField {
    #[default]
    OrderDate,
    TotalAmount,
    MerchantName,
}

impl PurchaseSortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "orderdate" | "order_date" | "date" => Some(PurchaseSortField::OrderDate),
            "totalamount" | "total_amount" | "amount" => Some(PurchaseSortField::TotalAmount),
            "merchant" | "merchantname" | "merchant_name" => Some(PurchaseSortField::MerchantName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseSort {
    pub field: PurchaseSortField,
    pub direction: SortDirection,
}

impl PurchaseSort {
    /// Resolve a caller-supplied sort. An unrecognized field name falls back
    /// to order date ascending.
    pub fn parse(field: &str, descending: bool) -> Self {
        match PurchaseSortField::parse(field) {
            Some(parsed) => Self {
                field: parsed,
                direction: if descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            },
            None => {
                warn!(field, "unrecognized purchase sort field; using order date ascending");
                Self::default()
            }
        }
    }
}

pub struct PurchaseService<S> {
    store: Arc<S>,
}

impl<S> PurchaseService<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a purchase. The item list must not be empty.
    #[instrument(skip(self, request), err)]
    pub async fn create_purchase(
        &self,
        request: PurchaseRequest,
    ) -> Result<Purchase, PurchaseError> {
        if request.items.is_empty() {
            return Err(PurchaseError::EmptyPurchase);
        }
        request.validate()?;

        let mut purchase = Purchase {
            id: PurchaseId::new(),
            merchant_id: request.merchant_id,
            order_date: request.order_date.unwrap_or_else(Utc::now),
            notes: request.notes,
            total_amount: Decimal::ZERO,
            items: request
                .items
                .into_iter()
                .map(|item| item.into_item())
                .collect(),
        };
        purchase.recompute_totals();

        let mut tx = self.store.begin().await?;
        match tx.insert_purchase(&purchase).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(purchase)
            }
            Err(err) => {
                roll_back(tx).await;
                Err(err.into())
            }
        }
    }

    /// Replace a purchase's merchant, notes, and items wholesale; totals are
    /// recomputed from the new items.
    #[instrument(skip(self, request), fields(purchase_id = %purchase_id), err)]
    pub async fn update_purchase(
        &self,
        purchase_id: PurchaseId,
        request: PurchaseRequest,
    ) -> Result<Purchase, PurchaseError> {
        if request.items.is_empty() {
            return Err(PurchaseError::EmptyPurchase);
        }
        request.validate()?;

        let mut tx = self.store.begin().await?;
        match update_in_tx(&mut *tx, purchase_id, request).await {
            Ok(purchase) => {
                tx.commit().await?;
                Ok(purchase)
            }
            Err(err) => {
                roll_back(tx).await;
                Err(err)
            }
        }
    }

    /// Delete a batch of purchases. Missing ids are skipped with a warning;
    /// returns the number actually deleted.
    #[instrument(skip(self), err)]
    pub async fn delete_purchases(
        &self,
        purchase_ids: &[PurchaseId],
    ) -> Result<u64, PurchaseError> {
        let mut tx = self.store.begin().await?;
        let mut deleted = 0u64;
        for &purchase_id in purchase_ids {
            match tx.delete_purchase(purchase_id).await {
                Ok(true) => deleted += 1,
                Ok(false) => {
                    warn!(purchase_id = %purchase_id, "purchase not found for deletion; skipping")
                }
                Err(err) => {
                    roll_back(tx).await;
                    return Err(err.into());
                }
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }

    /// Detail view of one purchase.
    pub async fn purchase_detail(
        &self,
        purchase_id: PurchaseId,
    ) -> Result<PurchaseDetail, PurchaseError> {
        let purchase = self
            .store
            .purchase(purchase_id)
            .await?
            .ok_or(PurchaseError::PurchaseNotFound { purchase_id })?;
        Ok(self.project(&purchase).await?)
    }

    /// Paged listing with optional filters and sort.
    pub async fn list_purchases(
        &self,
        pagination: Pagination,
        filter: &PurchaseFilter,
        sort: PurchaseSort,
    ) -> Result<PagedResult<PurchaseDetail>, PurchaseError> {
        let purchases = self.store.purchases().await?;
        let mut details = Vec::with_capacity(purchases.len());
        for purchase in &purchases {
            details.push(self.project(purchase).await?);
        }

        details.retain(|d| matches_filter(d, filter));
        sort_details(&mut details, sort);
        Ok(PagedResult::paginate(details, pagination))
    }

    /// Recompute a purchase's value from its items.
    pub async fn purchase_total(&self, purchase_id: PurchaseId) -> Result<Decimal, PurchaseError> {
        let purchase = self
            .store
            .purchase(purchase_id)
            .await?
            .ok_or(PurchaseError::PurchaseNotFound { purchase_id })?;
        Ok(purchase
            .items
            .iter()
            .map(|i| Decimal::from(i.quantity) * i.price_per_unit)
            .sum())
    }

    async fn project(&self, purchase: &Purchase) -> Result<PurchaseDetail, PurchaseError> {
        let merchant = match self.store.merchant(purchase.merchant_id).await? {
            Some(merchant) => MerchantSummary {
                id: merchant.id,
                name: merchant.name,
            },
            None => MerchantSummary {
                id: purchase.merchant_id,
                name: UNKNOWN_MERCHANT.to_string(),
            },
        };
        Ok(PurchaseDetail {
            id: purchase.id,
            order_date: purchase.order_date,
            notes: purchase.notes.clone(),
            total_amount: purchase.total_amount,
            merchant,
            items: purchase.items.clone(),
        })
    }
}

async fn update_in_tx(
    tx: &mut dyn StoreTx,
    purchase_id: PurchaseId,
    request: PurchaseRequest,
) -> Result<Purchase, PurchaseError> {
    let mut purchase = tx
        .purchase(purchase_id)
        .await?
        .ok_or(PurchaseError::PurchaseNotFound { purchase_id })?;

    purchase.merchant_id = request.merchant_id;
    purchase.notes = request.notes;
    if let Some(order_date) = request.order_date {
        purchase.order_date = order_date;
    }
    purchase.items = request
        .items
        .into_iter()
        .map(|item| item.into_item())
        .collect();
    purchase.recompute_totals();

    tx.update_purchase(&purchase).await?;
    Ok(purchase)
}

async fn roll_back(tx: Box<dyn StoreTx>) {
    if let Err(rollback_err) = tx.rollback().await {
        error!(error = %rollback_err, "rollback failed after aborted purchase operation");
    }
}

fn matches_filter(detail: &PurchaseDetail, filter: &PurchaseFilter) -> bool {
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let notes_hit = detail
            .notes
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&needle));
        let merchant_hit = detail.merchant.name.to_lowercase().contains(&needle);
        if !notes_hit && !merchant_hit {
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

fn sort_details(details: &mut [PurchaseDetail], sort: PurchaseSort) {
    match sort.field {
        PurchaseSortField::OrderDate => details.sort_by_key(|d| d.order_date),
        PurchaseSortField::TotalAmount => {
            details.sort_by(|a, b| a.total_amount.cmp(&b.total_amount))
        }
        PurchaseSortField::MerchantName => {
            details.sort_by(|a, b| a.merchant.name.cmp(&b.merchant.name))
        }
    }
    if sort.direction == SortDirection::Descending {
        details.reverse();
    }
}
