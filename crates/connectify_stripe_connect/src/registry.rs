//! Lifecycle and queries of Stripe Connect accounts.
//!
//! A Connect ties a vendor's Stripe account to the products it earns commission
//! on. The registry owns creating, updating, looking up and deleting them; the
//! SQL repositories in `connectify_db` do the storage.

use crate::coerce;
use crate::error::StripeError;
use crate::oauth::ConnectOAuthClient;
use crate::settings::{SettingsProvider, COMMERCE_PLUGIN_HANDLE};
use connectify_db::{
    CommissionRepository, CommissionRepositoryFactory, Connect, ConnectQuery, ConnectRepository,
    ConnectRepositoryFactory, DbClient, DbError, DbTransaction, ProductType, RepositoryFactory,
    SqlCommissionRepository, SqlConnectRepository,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A product type the registry currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SupportedProductType {
    pub product_type: ProductType,
    /// `false` for types contributed by an add-on.
    pub is_built_in: bool,
}

/// A product type as a select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProductTypeOption {
    pub label: String,
    pub value: ProductType,
}

pub struct ConnectRegistry {
    db: DbClient,
    connects: SqlConnectRepository,
    commissions: SqlCommissionRepository,
    settings: Arc<dyn SettingsProvider>,
    oauth: Arc<ConnectOAuthClient>,
}

impl ConnectRegistry {
    pub fn new(
        db: DbClient,
        settings: Arc<dyn SettingsProvider>,
        oauth: Arc<ConnectOAuthClient>,
    ) -> Self {
        let connects = ConnectRepositoryFactory::new().create_repository(db.clone());
        let commissions = CommissionRepositoryFactory::new().create_repository(db.clone());
        Self {
            db,
            connects,
            commissions,
            settings,
            oauth,
        }
    }

    /// Creates the tables the registry needs.
    pub async fn init_schema(&self) -> Result<(), StripeError> {
        self.connects.init_schema().await?;
        self.commissions.init_schema().await?;
        Ok(())
    }

    pub async fn resolve_by_id(&self, id: i64) -> Result<Option<Connect>, StripeError> {
        Ok(self.connects.find_by_id(id).await?)
    }

    /// The built-in payment-form type, then the commerce product type if that add-on is enabled.
    pub fn list_supported_product_types(&self) -> Vec<SupportedProductType> {
        let mut types = vec![SupportedProductType {
            product_type: ProductType::PaymentForm,
            is_built_in: true,
        }];

        if self.settings.is_plugin_enabled(COMMERCE_PLUGIN_HANDLE) {
            types.push(SupportedProductType {
                product_type: ProductType::CommerceProduct,
                is_built_in: false,
            });
        }

        types
    }

    pub fn list_supported_product_types_as_options(&self) -> Vec<ProductTypeOption> {
        self.list_supported_product_types()
            .into_iter()
            .map(|supported| {
                let name = supported.product_type.display_name();
                let label = if supported.is_built_in {
                    name.to_string()
                } else {
                    format!("{} (Commerce)", name)
                };
                ProductTypeOption {
                    label,
                    value: supported.product_type,
                }
            })
            .collect()
    }

    /// Creates and stores a disabled Connect at the current global rate.
    pub async fn create(&self, product_type: &str) -> Result<Connect, StripeError> {
        let product_type = self.supported_product_type(product_type)?;
        let rate = self.settings.settings().global_rate;

        let connect = self
            .connects
            .save(Connect::new(product_type, rate))
            .await?;
        info!(
            "Created connect {:?} ({}) at rate {}",
            connect.id, product_type, rate
        );
        Ok(connect)
    }

    fn supported_product_type(&self, raw: &str) -> Result<ProductType, StripeError> {
        let product_type = raw
            .parse::<ProductType>()
            .map_err(|e| StripeError::InvalidProductType(e.0))?;

        if self
            .list_supported_product_types()
            .iter()
            .any(|s| s.product_type == product_type)
        {
            Ok(product_type)
        } else {
            Err(StripeError::InvalidProductType(product_type.to_string()))
        }
    }

    /// Applies input fields to `connect`. Unknown keys are ignored; nothing is stored.
    ///
    /// `productType` must be one of the currently supported types.
    pub fn populate_from_input(
        &self,
        mut connect: Connect,
        raw_fields: &Map<String, Value>,
    ) -> Result<Connect, StripeError> {
        for (key, value) in raw_fields {
            match key.as_str() {
                "productType" => {
                    let raw = value.as_str().ok_or_else(|| {
                        StripeError::InvalidProductType(value.to_string())
                    })?;
                    connect.product_type = self.supported_product_type(raw)?;
                }
                "vendorId" => {
                    // A multi-select posts a list; only the first vendor counts.
                    let vendor = match value {
                        Value::Array(items) => items.first().unwrap_or(&Value::Null),
                        other => other,
                    };
                    connect.vendor_id = coerce::optional_id(key, vendor)?;
                }
                "enabled" => connect.enabled = coerce::truthy_value(key, value)?,
                "allProducts" => connect.all_products = coerce::truthy_value(key, value)?,
                "rate" => connect.rate = coerce::number(key, value)?,
                "products" => connect.products = coerce::string_list(key, value)?,
                other => debug!("Ignoring unknown connect field '{}'", other),
            }
        }
        Ok(connect)
    }

    /// Stores the Connect and its product list.
    pub async fn save(&self, connect: Connect) -> Result<Connect, StripeError> {
        self.connects.save(connect).await.map_err(|e| match e {
            DbError::NotFound(what) => StripeError::NotFound(what),
            other => StripeError::Database(other),
        })
    }

    /// Deletes the Connect and its commissions in one transaction.
    ///
    /// `Ok(false)` when the store did not delete the Connect; nothing is changed then.
    pub async fn delete(&self, connect: &Connect) -> Result<bool, StripeError> {
        let Some(id) = connect.id else {
            error!("Cannot delete a connect that was never saved");
            return Ok(false);
        };

        let mut tx = self.db.begin().await?;
        match self.delete_in(&mut tx, id).await {
            Ok(true) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionError(e.to_string()))?;
                info!("Deleted connect {}", id);
                Ok(true)
            }
            Ok(false) => {
                rollback(tx, id).await;
                error!("Unable to delete connect {}, changes rolled back", id);
                Ok(false)
            }
            Err(e) => {
                rollback(tx, id).await;
                error!("Error deleting connect {}: {}", id, e);
                Err(e.into())
            }
        }
    }

    async fn delete_in(&self, tx: &mut DbTransaction<'_>, id: i64) -> Result<bool, DbError> {
        let commission_ids = self.commissions.ids_for_connect_in(tx, id).await?;
        debug!(
            "Deleting {} commissions of connect {}",
            commission_ids.len(),
            id
        );
        for commission_id in commission_ids {
            if !self.commissions.delete_in(tx, commission_id).await? {
                warn!("Commission {} was already gone", commission_id);
            }
        }
        self.connects.delete_in(tx, id).await
    }

    /// Exchanges an OAuth code for the connected account id. Every failure is logged and yields `None`.
    pub async fn exchange_authorization_code(&self, code: &str) -> Option<String> {
        match self.oauth.token(code).await {
            Ok(token) => Some(token.stripe_user_id),
            Err(StripeError::InvalidGrant(msg)) => {
                error!("Invalid authorization code: {}", msg);
                None
            }
            Err(e) => {
                error!("Stripe OAuth token exchange failed: {}", e);
                None
            }
        }
    }

    /// The first payment-form Connect assigned to `product_id`.
    pub async fn find_by_product_id(
        &self,
        product_id: &str,
        vendor_id: Option<i64>,
    ) -> Result<Option<Connect>, StripeError> {
        let query = ConnectQuery::new()
            .product_id(product_id)
            .product_type(ProductType::PaymentForm)
            .vendor_id(vendor_id);
        Ok(self.connects.find_one(&query).await?)
    }

    /// Connects explicitly listing `product_id` (not the all-products ones).
    pub async fn list_by_product_id(
        &self,
        product_id: &str,
        vendor_id: Option<i64>,
        product_type: ProductType,
    ) -> Result<Vec<Connect>, StripeError> {
        let query = ConnectQuery::new()
            .product_id(product_id)
            .product_type(product_type)
            .vendor_id(vendor_id)
            .all_products(Some(false));
        Ok(self.connects.find_all(&query).await?)
    }

    pub async fn list_with_all_products(
        &self,
        product_type: ProductType,
    ) -> Result<Vec<Connect>, StripeError> {
        let query = ConnectQuery::new()
            .product_type(product_type)
            .all_products(Some(true));
        Ok(self.connects.find_all(&query).await?)
    }

    /// A vendor's Connects. `None` filters are not applied.
    pub async fn list_by_vendor_id(
        &self,
        vendor_id: i64,
        all_products: Option<bool>,
        product_type: Option<ProductType>,
    ) -> Result<Vec<Connect>, StripeError> {
        let query = ConnectQuery {
            product_type,
            ..ConnectQuery::new()
                .vendor_id(Some(vendor_id))
                .all_products(all_products)
        };
        Ok(self.connects.find_all(&query).await?)
    }
}

async fn rollback(tx: DbTransaction<'static>, id: i64) {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback after deleting connect {} failed: {}", id, e);
    }
}
