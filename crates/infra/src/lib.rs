//! `shopdesk-infra` — storage boundary and transactional services.
//!
//! Everything that crosses the persistence boundary lives here: the
//! [`store`] unit-of-work abstraction with its in-memory and Postgres
//! backends, the [`stock`] ledger (the single choke point for product
//! quantity mutation), the order [`orders::OrderService`] /
//! [`orders::OrderQueries`] pair, and the [`purchasing::PurchaseService`].
//!
//! Domain crates stay pure; this crate composes them with IO.

pub mod orders;
pub mod purchasing;
pub mod stock;
pub mod store;
