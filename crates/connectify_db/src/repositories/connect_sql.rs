//! SQL implementation of the Connect repository

use crate::client::DbTransaction;
use crate::error::DbError;
use crate::repositories::connect::{Connect, ConnectQuery, ConnectRepository, ProductType};
use crate::repositories::sql::{try_get_nullable, SqlBuilder};
use crate::DbClient;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

const SELECT_CONNECTS: &str = r#"
    SELECT c.id, c.product_type, c.vendor_id, c.enabled, c.rate, c.all_products
    FROM connects c
    WHERE 1 = 1"#;

/// SQL implementation of the Connect repository
#[derive(Debug, Clone)]
pub struct SqlConnectRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlConnectRepository {
    /// Create a new SQL Connect repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn connect_from_row(row: &AnyRow) -> Result<Connect, DbError> {
        let product_type: String = row.try_get("product_type")?;
        let product_type = product_type
            .parse::<ProductType>()
            .map_err(|e| DbError::DecodeError(e.to_string()))?;

        Ok(Connect {
            id: Some(row.try_get::<i64, _>("id")?),
            product_type,
            vendor_id: try_get_nullable::<i64>(row, "vendor_id")?,
            enabled: row.try_get::<i64, _>("enabled")? != 0,
            rate: row.try_get::<f64, _>("rate")?,
            all_products: row.try_get::<i64, _>("all_products")? != 0,
            products: Vec::new(),
        })
    }

    fn select(query: &ConnectQuery) -> SqlBuilder {
        let mut builder = SqlBuilder::new(SELECT_CONNECTS);

        if let Some(product_id) = &query.product_id {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM connect_products cp \
                     WHERE cp.connect_id = c.id AND cp.product_id = ",
                )
                .push_param(product_id.as_str())
                .push(")");
        }
        if let Some(product_type) = query.product_type {
            builder
                .push(" AND c.product_type = ")
                .push_param(product_type.as_str());
        }
        if let Some(vendor_id) = query.vendor_id {
            builder.push(" AND c.vendor_id = ").push_param(vendor_id);
        }
        if let Some(all_products) = query.all_products {
            builder.push(" AND c.all_products = ").push_param(all_products);
        }

        builder.push(" ORDER BY c.id");
        builder
    }

    async fn load_products(&self, connect_id: i64) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query(
            "SELECT product_id FROM connect_products WHERE connect_id = $1 ORDER BY position",
        )
        .bind(connect_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to load products for connect {}: {}", connect_id, e);
            DbError::QueryError(e.to_string())
        })?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("product_id").map_err(DbError::from))
            .collect()
    }

    async fn fetch(&self, builder: &SqlBuilder) -> Result<Vec<Connect>, DbError> {
        let rows = builder
            .query()
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to query connects: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let mut connects = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut connect = Self::connect_from_row(row)?;
            if let Some(id) = connect.id {
                connect.products = self.load_products(id).await?;
            }
            connects.push(connect);
        }
        Ok(connects)
    }

    /// Drops repeated product ids, keeping the first occurrence.
    fn unique_products(products: Vec<String>) -> Vec<String> {
        let mut unique: Vec<String> = Vec::with_capacity(products.len());
        for product in products {
            if !unique.contains(&product) {
                unique.push(product);
            }
        }
        unique
    }
}

impl ConnectRepository for SqlConnectRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing connect schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS connects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_type TEXT NOT NULL,
                vendor_id INTEGER,
                enabled INTEGER NOT NULL DEFAULT 0,
                rate REAL NOT NULL DEFAULT 0,
                all_products INTEGER NOT NULL DEFAULT 0
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS connect_products (
                connect_id INTEGER NOT NULL,
                product_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (connect_id, product_id)
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_connect_products_product_id \
                 ON connect_products (product_id)",
            )
            .await?;

        info!("Connect schema initialized successfully");
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Connect>, DbError> {
        debug!("Finding connect by id: {}", id);

        let mut builder = SqlBuilder::new(SELECT_CONNECTS);
        builder.push(" AND c.id = ").push_param(id);

        Ok(self.fetch(&builder).await?.into_iter().next())
    }

    async fn find_all(&self, query: &ConnectQuery) -> Result<Vec<Connect>, DbError> {
        debug!("Finding connects: {:?}", query);
        self.fetch(&Self::select(query)).await
    }

    async fn find_one(&self, query: &ConnectQuery) -> Result<Option<Connect>, DbError> {
        debug!("Finding first connect: {:?}", query);
        let mut builder = Self::select(query);
        builder.push(" LIMIT 1");
        Ok(self.fetch(&builder).await?.into_iter().next())
    }

    async fn save(&self, connect: Connect) -> Result<Connect, DbError> {
        let products = Self::unique_products(connect.products.clone());
        let mut tx = self.db_client.begin().await?;

        let id = match connect.id {
            None => {
                debug!("Inserting new connect ({})", connect.product_type);
                let mut builder = SqlBuilder::new(
                    "INSERT INTO connects (product_type, vendor_id, enabled, rate, all_products) VALUES (",
                );
                builder
                    .push_param(connect.product_type.as_str())
                    .push(", ")
                    .push_opt_param(connect.vendor_id)
                    .push(", ")
                    .push_param(connect.enabled)
                    .push(", ")
                    .push_param(connect.rate)
                    .push(", ")
                    .push_param(connect.all_products)
                    .push(") RETURNING id");

                let row = builder.query().fetch_one(&mut *tx).await.map_err(|e| {
                    error!("Failed to insert connect: {}", e);
                    DbError::QueryError(e.to_string())
                })?;
                row.try_get::<i64, _>("id")?
            }
            Some(id) => {
                debug!("Updating connect {}", id);
                let mut builder = SqlBuilder::new("UPDATE connects SET product_type = ");
                builder
                    .push_param(connect.product_type.as_str())
                    .push(", vendor_id = ")
                    .push_opt_param(connect.vendor_id)
                    .push(", enabled = ")
                    .push_param(connect.enabled)
                    .push(", rate = ")
                    .push_param(connect.rate)
                    .push(", all_products = ")
                    .push_param(connect.all_products)
                    .push(" WHERE id = ")
                    .push_param(id);

                let result = builder.query().execute(&mut *tx).await.map_err(|e| {
                    error!("Failed to update connect {}: {}", id, e);
                    DbError::QueryError(e.to_string())
                })?;
                if result.rows_affected() == 0 {
                    return Err(DbError::NotFound(format!("connect {}", id)));
                }
                id
            }
        };

        sqlx::query("DELETE FROM connect_products WHERE connect_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        for (position, product_id) in products.iter().enumerate() {
            sqlx::query(
                "INSERT INTO connect_products (connect_id, product_id, position) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(product_id.as_str())
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to store product {} for connect {}: {}", product_id, id, e);
                DbError::QueryError(e.to_string())
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Connect {} saved", id);
        Ok(Connect {
            id: Some(id),
            products,
            ..connect
        })
    }

    async fn delete_in(&self, tx: &mut DbTransaction<'_>, id: i64) -> Result<bool, DbError> {
        debug!("Deleting connect {}", id);

        sqlx::query("DELETE FROM connect_products WHERE connect_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM connects WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
