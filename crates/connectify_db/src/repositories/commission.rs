//! Repository for commissions owed through a Connect

use crate::client::DbTransaction;
use crate::error::DbError;

pub use connectify_common::models::Commission;

/// Repository for commissions
pub trait CommissionRepository {
    /// Create the `commissions` table if it doesn't exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Store a new commission and return it with its id.
    fn create(
        &self,
        commission: Commission,
    ) -> impl std::future::Future<Output = Result<Commission, DbError>> + Send;

    /// All commissions of a Connect.
    fn find_by_connect_id(
        &self,
        connect_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Commission>, DbError>> + Send;

    /// Ids of the commissions of a Connect, read inside `tx`.
    fn ids_for_connect_in(
        &self,
        tx: &mut DbTransaction<'_>,
        connect_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<i64>, DbError>> + Send;

    /// Hard-delete one commission inside `tx`. `false` if nothing was deleted.
    fn delete_in(
        &self,
        tx: &mut DbTransaction<'_>,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
