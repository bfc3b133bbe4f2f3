//! Database integration for Connectify
//!
//! This crate stores Stripe Connect accounts, their product associations and the
//! commissions owed through them. It is database agnostic, using SQLx's `Any`
//! driver, with SQLite compiled in by default and PostgreSQL/MySQL behind
//! feature flags.
//!
//! # Example
//!
//! ```rust,no_run
//! use connectify_db::{ConnectRepository, DbClient, SqlConnectRepository};
//!
//! async fn setup() -> Result<SqlConnectRepository, connectify_db::error::DbError> {
//!     let db_client = DbClient::from_url("sqlite:data/connectify.db").await?;
//!     let connects = SqlConnectRepository::new(db_client);
//!     connects.init_schema().await?;
//!     Ok(connects)
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use factory::DbClientFactory;
pub use repository::RepositoryFactory;

pub use repositories::{
    Commission, CommissionRepository, CommissionRepositoryFactory, Connect, ConnectQuery,
    ConnectRepository, ConnectRepositoryFactory, ProductType, SqlCommissionRepository,
    SqlConnectRepository,
};
