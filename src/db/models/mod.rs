//! Database record structures matching table schemas.

pub mod assets;
pub mod catalog;
pub mod transactions;
pub mod users;
