//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): registration, login, current user
//! - **Catalog** (`/api/models/*`): offered generation models
//! - **Generator** (`/api/generator/*`): credit-debited generations and assets
//! - **Transactions** (`/api/transactions/*`): ledger history and summaries
//! - **Users** (`/api/users/*`): admin user management and credit grants
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
