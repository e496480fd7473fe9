//! `shopdesk-products` — product catalog entity and stock arithmetic.

pub mod product;

pub use product::{Product, ProductStatus, StockShortage};
