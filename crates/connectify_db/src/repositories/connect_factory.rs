//! Factory for creating Connect repositories

use crate::repositories::connect_sql::SqlConnectRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating Connect repositories
#[derive(Debug, Clone)]
pub struct ConnectRepositoryFactory;

impl ConnectRepositoryFactory {
    /// Create a new Connect repository factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConnectRepositoryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryFactory<SqlConnectRepository, DbClient> for ConnectRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlConnectRepository {
        SqlConnectRepository::new(db_client)
    }
}
