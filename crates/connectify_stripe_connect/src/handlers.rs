use crate::coerce::parse_truthy;
use crate::error::StripeError;
use crate::oauth::StripeOAuthClient;
use crate::orders::{submit_order, DynOrderService, OrderSubmission, StripeOrderService};
use crate::registry::{ConnectRegistry, ProductTypeOption};
use crate::settings::AppConfigSettings;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use connectify_common::ConnectifyError;
use connectify_config::AppConfig;
use connectify_db::{Connect, DbClient, ProductType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

// --- State for Stripe Connect Handlers ---
#[derive(Clone)]
pub struct ConnectState {
    pub registry: Arc<ConnectRegistry>,
    pub orders: Arc<DynOrderService>,
}

impl ConnectState {
    /// Wires the registry and order service from the application configuration.
    pub fn from_config(config: Arc<AppConfig>, db: DbClient) -> Result<Self, StripeError> {
        let stripe_config = config.stripe.as_ref().ok_or(StripeError::ConfigError)?;
        let oauth = Arc::new(StripeOAuthClient::new(stripe_config));
        let orders = Arc::new(StripeOrderService::new(stripe_config));
        let settings = Arc::new(AppConfigSettings::new(config.clone()));

        Ok(Self {
            registry: Arc::new(ConnectRegistry::new(db, settings, oauth)),
            orders,
        })
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectRequest {
    #[cfg_attr(feature = "openapi", schema(example = "payment-form"))]
    pub product_type: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateConnectRequest {
    /// Raw field values; unknown keys are ignored.
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct VendorConnectsQuery {
    pub all_products: Option<String>,
    pub product_type: Option<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct OAuthCallbackQuery {
    pub code: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct OAuthCallbackResponse {
    pub stripe_user_id: String,
}

async fn existing(registry: &ConnectRegistry, id: i64) -> Result<Connect, ConnectifyError> {
    registry
        .resolve_by_id(id)
        .await?
        .ok_or_else(|| StripeError::NotFound(format!("Connect {} not found", id)).into())
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/connects/product-types",
    responses((status = 200, description = "Supported product types", body = [ProductTypeOption])),
    tag = "Stripe Connect"
))]
pub async fn product_types_handler(
    State(state): State<Arc<ConnectState>>,
) -> Json<Vec<ProductTypeOption>> {
    Json(state.registry.list_supported_product_types_as_options())
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/connects",
    request_body(content = CreateConnectRequest, example = json!({ "productType": "payment-form" })),
    responses(
        (status = 201, description = "Connect created", body = Connect),
        (status = 400, description = "Unsupported product type")
    ),
    tag = "Stripe Connect"
))]
pub async fn create_connect_handler(
    State(state): State<Arc<ConnectState>>,
    Json(payload): Json<CreateConnectRequest>,
) -> Result<(StatusCode, Json<Connect>), ConnectifyError> {
    let connect = state.registry.create(&payload.product_type).await?;
    Ok((StatusCode::CREATED, Json(connect)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/connects/{id}",
    params(("id" = i64, Path, description = "Connect id")),
    responses(
        (status = 200, description = "The Connect", body = Connect),
        (status = 404, description = "Connect not found")
    ),
    tag = "Stripe Connect"
))]
pub async fn get_connect_handler(
    State(state): State<Arc<ConnectState>>,
    Path(id): Path<i64>,
) -> Result<Json<Connect>, ConnectifyError> {
    Ok(Json(existing(&state.registry, id).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/connects/{id}",
    params(("id" = i64, Path, description = "Connect id")),
    request_body(content = UpdateConnectRequest, example = json!({
        "fields": { "enabled": "1", "vendorId": [7], "rate": 12.5, "products": ["42"] }
    })),
    responses(
        (status = 200, description = "Updated Connect", body = Connect),
        (status = 400, description = "Malformed field or unsupported product type"),
        (status = 404, description = "Connect not found")
    ),
    tag = "Stripe Connect"
))]
pub async fn update_connect_handler(
    State(state): State<Arc<ConnectState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateConnectRequest>,
) -> Result<Json<Connect>, ConnectifyError> {
    let connect = existing(&state.registry, id).await?;
    let connect = state
        .registry
        .populate_from_input(connect, &payload.fields)?;
    Ok(Json(state.registry.save(connect).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/stripe/connects/{id}",
    params(("id" = i64, Path, description = "Connect id")),
    responses(
        (status = 204, description = "Connect and its commissions deleted"),
        (status = 404, description = "Connect not found"),
        (status = 409, description = "The store did not delete the Connect")
    ),
    tag = "Stripe Connect"
))]
pub async fn delete_connect_handler(
    State(state): State<Arc<ConnectState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ConnectifyError> {
    let connect = existing(&state.registry, id).await?;
    if state.registry.delete(&connect).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StripeError::PersistenceFailure(format!("Connect {} could not be deleted", id)).into())
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/connects/vendor/{vendor_id}",
    params(("vendor_id" = i64, Path, description = "Vendor id"), VendorConnectsQuery),
    responses((status = 200, description = "The vendor's Connects", body = [Connect])),
    tag = "Stripe Connect"
))]
pub async fn vendor_connects_handler(
    State(state): State<Arc<ConnectState>>,
    Path(vendor_id): Path<i64>,
    Query(query): Query<VendorConnectsQuery>,
) -> Result<Json<Vec<Connect>>, ConnectifyError> {
    let all_products = match query.all_products.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_truthy(raw).ok_or_else(|| {
            StripeError::invalid_input("allProducts", format!("'{}' is not a boolean", raw))
        })?),
    };
    let product_type = match query.product_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<ProductType>()
                .map_err(|e| StripeError::InvalidProductType(e.0))?,
        ),
    };

    let connects = state
        .registry
        .list_by_vendor_id(vendor_id, all_products, product_type)
        .await?;
    Ok(Json(connects))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/connect/oauth/callback",
    params(OAuthCallbackQuery),
    responses(
        (status = 200, description = "Connected account id", body = OAuthCallbackResponse),
        (status = 404, description = "Authorization code rejected")
    ),
    tag = "Stripe Connect"
))]
pub async fn oauth_callback_handler(
    State(state): State<Arc<ConnectState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Json<OAuthCallbackResponse>, ConnectifyError> {
    match state.registry.exchange_authorization_code(&query.code).await {
        Some(stripe_user_id) => {
            info!("Connected Stripe account {}", stripe_user_id);
            Ok(Json(OAuthCallbackResponse { stripe_user_id }))
        }
        None => Err(StripeError::NotFound("Unable to connect the Stripe account".into()).into()),
    }
}

/// Submits a payment form and redirects (303) to the checkout, bank or posted page.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/save-order",
    request_body(content_type = "application/x-www-form-urlencoded", description = "Payment form fields (enableCheckout, paymentType, amount, redirect, address[...], ...)"),
    responses(
        (status = 303, description = "Redirect to the checkout page, the bank or the posted redirect URL"),
        (status = 400, description = "Malformed form field"),
        (status = 404, description = "Unable to process the Payment")
    ),
    tag = "Stripe Connect"
))]
pub async fn save_order_handler(
    State(state): State<Arc<ConnectState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let result = match OrderSubmission::from_fields(&fields) {
        Ok(submission) => submit_order(state.orders.as_ref(), submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(location) => Redirect::to(&location).into_response(),
        Err(e) => {
            warn!("Save order failed: {}", e);
            ConnectifyError::from(e).into_response()
        }
    }
}
