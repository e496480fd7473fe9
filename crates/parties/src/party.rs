use serde::{Deserialize, Serialize};

use shopdesk_core::{CustomerId, MerchantId, UserId};

/// A customer sales orders are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
}

/// A merchant (supplier) purchases are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Back-office user who records a sale.
///
/// Read-only from the order core's perspective; account management lives
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl User {
    /// "First Last" form used on invoices and listings.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
