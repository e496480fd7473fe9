//! `shopdesk-purchasing` — pure purchase (restocking spend) domain.

pub mod purchase;

pub use purchase::{Purchase, PurchaseItem, PurchaseItemRequest, PurchaseRequest};
