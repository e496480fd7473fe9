//! `shopdesk-orders` — pure sales-order domain.
//!
//! Entities, request types, and the side-effect-free money arithmetic.
//! Everything that touches storage (stock reconciliation, persistence,
//! projections) lives in `shopdesk-infra`.

pub mod order;
pub mod pricing;

pub use order::{Order, OrderLine, OrderLineRequest, OrderRequest};
pub use pricing::{LineAmounts, OrderTotals};
