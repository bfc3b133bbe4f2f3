//! Factory for creating database clients

use crate::client::DbClient;
use crate::error::DbError;
use connectify_config::{AppConfig, DatabaseConfig};
use std::sync::Arc;
use tracing::debug;

/// Default store when the configuration has no `[database]` section.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/connectify.db";

/// Factory for creating database clients
///
/// Builds a `DbClient` from whichever configuration source the caller has.
#[derive(Debug, Clone, Default)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a database client from the application configuration.
    ///
    /// Falls back to [`DEFAULT_DATABASE_URL`] when no database is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or invalid, or the connection fails.
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<DbClient, DbError> {
        match config.database.as_ref() {
            Some(db_config) => self.from_db_config(db_config).await,
            None => {
                debug!(
                    "No database configured, using default {}",
                    DEFAULT_DATABASE_URL
                );
                self.from_url(DEFAULT_DATABASE_URL).await
            }
        }
    }

    /// Create a database client from a database configuration
    pub async fn from_db_config(&self, db_config: &DatabaseConfig) -> Result<DbClient, DbError> {
        debug!("Creating database client from database configuration");
        DbClient::from_config(db_config).await
    }

    /// Create a database client from a database URL
    pub async fn from_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        debug!("Creating database client from URL");
        DbClient::from_url(db_url).await
    }
}
