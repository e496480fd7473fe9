//! `shopdesk-parties` — the people and companies orders are recorded against.

pub mod party;

pub use party::{Customer, Merchant, User};
