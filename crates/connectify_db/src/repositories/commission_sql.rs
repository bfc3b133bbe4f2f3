//! SQL implementation of the commission repository

use crate::client::DbTransaction;
use crate::error::DbError;
use crate::repositories::commission::{Commission, CommissionRepository};
use crate::repositories::sql::try_get_nullable;
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the commission repository
#[derive(Debug, Clone)]
pub struct SqlCommissionRepository {
    db_client: DbClient,
}

impl SqlCommissionRepository {
    /// Create a new SQL commission repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn commission_from_row(row: &AnyRow) -> Result<Commission, DbError> {
        // Timestamps are stored as RFC 3339 text.
        let date_created = try_get_nullable::<String>(row, "date_created")?
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| DbError::DecodeError(format!("date_created '{}': {}", s, e)))
            })
            .transpose()?;

        Ok(Commission {
            id: Some(row.try_get::<i64, _>("id")?),
            connect_id: row.try_get::<i64, _>("connect_id")?,
            order_number: row.try_get("order_number")?,
            total_price: row.try_get::<f64, _>("total_price")?,
            currency: row.try_get("currency")?,
            date_created,
        })
    }
}

impl CommissionRepository for SqlCommissionRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing commission schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS commissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                connect_id INTEGER NOT NULL,
                order_number TEXT NOT NULL,
                total_price REAL NOT NULL DEFAULT 0,
                currency TEXT NOT NULL,
                date_created TEXT
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_commissions_connect_id ON commissions (connect_id)",
            )
            .await?;

        info!("Commission schema initialized successfully");
        Ok(())
    }

    async fn create(&self, commission: Commission) -> Result<Commission, DbError> {
        debug!(
            "Creating commission for connect {} (order {})",
            commission.connect_id, commission.order_number
        );

        let date_created = commission.date_created.unwrap_or_else(Utc::now);
        let row = sqlx::query(
            r#"
            INSERT INTO commissions (connect_id, order_number, total_price, currency, date_created)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#,
        )
        .bind(commission.connect_id)
        .bind(commission.order_number.as_str())
        .bind(commission.total_price)
        .bind(commission.currency.as_str())
        .bind(date_created.to_rfc3339())
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to create commission: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(Commission {
            id: Some(row.try_get::<i64, _>("id")?),
            date_created: Some(date_created),
            ..commission
        })
    }

    async fn find_by_connect_id(&self, connect_id: i64) -> Result<Vec<Commission>, DbError> {
        debug!("Finding commissions for connect {}", connect_id);

        let rows = sqlx::query(
            r#"
            SELECT id, connect_id, order_number, total_price, currency, date_created
            FROM commissions
            WHERE connect_id = $1
            ORDER BY id
        "#,
        )
        .bind(connect_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(Self::commission_from_row).collect()
    }

    async fn ids_for_connect_in(
        &self,
        tx: &mut DbTransaction<'_>,
        connect_id: i64,
    ) -> Result<Vec<i64>, DbError> {
        let rows = sqlx::query("SELECT id FROM commissions WHERE connect_id = $1 ORDER BY id")
            .bind(connect_id)
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("id").map_err(DbError::from))
            .collect()
    }

    async fn delete_in(&self, tx: &mut DbTransaction<'_>, id: i64) -> Result<bool, DbError> {
        debug!("Deleting commission {}", id);

        let result = sqlx::query("DELETE FROM commissions WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
