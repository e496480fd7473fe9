//! Order processing: aggregate building, transactional coordination, and
//! read-side projections.

pub mod builder;
pub mod error;
pub mod invoice;
pub mod query;
pub mod service;

pub use error::OrderError;
pub use invoice::{Invoice, InvoiceItem};
pub use query::{
    CustomerSummary, OrderDetail, OrderFilter, OrderLineDetail, OrderQueries, OrderSort,
    OrderSortField, UserSummary,
};
pub use service::OrderService;
