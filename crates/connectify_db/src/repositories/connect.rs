//! Repository for Stripe Connect accounts
//!
//! This module defines the storage interface for Connects and their product
//! associations. Product membership is kept in its own table so that a lookup
//! by product id is an exact match.

use crate::client::DbTransaction;
use crate::error::DbError;

// Re-export the models from connectify_common for convenience
pub use connectify_common::models::{Connect, ProductType};

/// Filters for listing Connects. `None` means "do not filter on this field".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectQuery {
    /// Connect must be associated with this product id.
    pub product_id: Option<String>,
    pub product_type: Option<ProductType>,
    pub vendor_id: Option<i64>,
    pub all_products: Option<bool>,
}

impl ConnectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = Some(product_type);
        self
    }

    pub fn vendor_id(mut self, vendor_id: Option<i64>) -> Self {
        self.vendor_id = vendor_id;
        self
    }

    pub fn all_products(mut self, all_products: Option<bool>) -> Self {
        self.all_products = all_products;
        self
    }
}

/// Repository for Connects
pub trait ConnectRepository {
    /// Create the `connects` and `connect_products` tables if they don't exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Find a Connect by id, with its products.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Connect>, DbError>> + Send;

    /// All Connects matching the query, ordered by id.
    fn find_all(
        &self,
        query: &ConnectQuery,
    ) -> impl std::future::Future<Output = Result<Vec<Connect>, DbError>> + Send;

    /// The first Connect (lowest id) matching the query.
    fn find_one(
        &self,
        query: &ConnectQuery,
    ) -> impl std::future::Future<Output = Result<Option<Connect>, DbError>> + Send;

    /// Insert (no id) or update (with id) a Connect and replace its product list.
    ///
    /// Runs in its own transaction. Returns the stored Connect with its id set.
    fn save(
        &self,
        connect: Connect,
    ) -> impl std::future::Future<Output = Result<Connect, DbError>> + Send;

    /// Hard-delete a Connect and its product associations inside `tx`.
    ///
    /// Returns `false` when the store deleted no Connect row.
    fn delete_in(
        &self,
        tx: &mut DbTransaction<'_>,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
