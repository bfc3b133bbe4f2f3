// --- File: crates/connectify_common/src/models.rs ---

// Marketplace data structures shared by the store (connectify_db) and the
// Stripe Connect service. They carry no persistence details.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Product catalog a Connect is scoped to.
///
/// `PaymentForm` is built in; `CommerceProduct` is only offered while the
/// commerce add-on is installed and enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ProductType {
    #[default]
    #[serde(rename = "payment-form")]
    PaymentForm,
    #[serde(rename = "commerce-product")]
    CommerceProduct,
}

impl ProductType {
    /// The value stored in the database and exchanged over the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::PaymentForm => "payment-form",
            ProductType::CommerceProduct => "commerce-product",
        }
    }

    /// Human readable name of the product catalog.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductType::PaymentForm => "Payment Form",
            ProductType::CommerceProduct => "Product",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known product type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProductType(pub String);

impl fmt::Display for UnknownProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown product type '{}'", self.0)
    }
}

impl std::error::Error for UnknownProductType {}

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "payment-form" => Ok(ProductType::PaymentForm),
            "commerce-product" => Ok(ProductType::CommerceProduct),
            other => Err(UnknownProductType(other.to_string())),
        }
    }
}

/// A marketplace vendor sub-account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Connect {
    /// Assigned by the store on first save, never changed afterwards.
    pub id: Option<i64>,
    pub product_type: ProductType,
    pub vendor_id: Option<i64>,
    pub enabled: bool,
    /// Commission rate in percent.
    pub rate: f64,
    /// When set, the Connect applies to every product of `product_type`.
    pub all_products: bool,
    /// Product identifiers, in the order they were assigned.
    pub products: Vec<String>,
}

impl Connect {
    /// A new, unsaved and disabled Connect.
    pub fn new(product_type: ProductType, rate: f64) -> Self {
        Self {
            id: None,
            product_type,
            vendor_id: None,
            enabled: false,
            rate,
            all_products: false,
            products: Vec::new(),
        }
    }
}

/// A commission transaction owed through a Connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Option<i64>,
    pub connect_id: i64,
    pub order_number: String,
    pub total_price: f64,
    pub currency: String,
    pub date_created: Option<chrono::DateTime<chrono::Utc>>,
}

impl Commission {
    pub fn new(connect_id: i64, order_number: String, total_price: f64, currency: String) -> Self {
        Self {
            id: None,
            connect_id,
            order_number,
            total_price,
            currency,
            date_created: Some(chrono::Utc::now()),
        }
    }
}
