//! Factory for creating commission repositories

use crate::repositories::commission_sql::SqlCommissionRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating commission repositories
///
/// Commissions share the pool of the Connect repository so that both can take
/// part in the same transaction.
#[derive(Debug, Clone, Default)]
pub struct CommissionRepositoryFactory;

impl CommissionRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlCommissionRepository, DbClient> for CommissionRepositoryFactory {
    /// Create a new commission repository
    ///
    /// # Arguments
    ///
    /// * `db_client` - The database client to use
    fn create_repository(&self, db_client: DbClient) -> SqlCommissionRepository {
        SqlCommissionRepository::new(db_client)
    }
}
