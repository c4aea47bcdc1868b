//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection and provides strongly-typed
//! operations over one table, returning domain models from
//! [`crate::db::models`]. The catalog repository implements the common
//! [`Repository`] trait; the others expose purpose-built methods.
//!
//! - [`Users`]: user accounts and authentication lookups
//! - [`Catalog`]: the set of offered generation models
//! - [`Transactions`]: read access to the append-only ledger
//! - [`Assets`]: read access to generated-asset records
//! - [`Ledger`]: the composite atomic mutations (generation commit, credit grant)
//!
//! # Common Pattern
//!
//! ```ignore
//! use nexus_studio::db::handlers::Users;
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Users::new(&mut conn);
//!     let user = repo.get_by_email("user@example.com").await?;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod catalog;
pub mod ledger;
pub mod repository;
pub mod transactions;
pub mod users;

pub use assets::Assets;
pub use catalog::Catalog;
pub use ledger::Ledger;
pub use repository::Repository;
pub use transactions::Transactions;
pub use users::Users;
