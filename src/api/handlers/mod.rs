//! Axum route handlers for all API endpoints.

pub mod auth;
pub mod catalog;
pub mod generator;
pub mod transactions;
pub mod users;
