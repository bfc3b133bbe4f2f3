#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{CreateConnectRequest, OAuthCallbackResponse, UpdateConnectRequest};
use crate::registry::ProductTypeOption;
use connectify_db::{Connect, ProductType};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::save_order_handler,
        crate::handlers::product_types_handler,
        crate::handlers::create_connect_handler,
        crate::handlers::get_connect_handler,
        crate::handlers::update_connect_handler,
        crate::handlers::delete_connect_handler,
        crate::handlers::vendor_connects_handler,
        crate::handlers::oauth_callback_handler
    ),
    components(schemas(
        Connect,
        ProductType,
        ProductTypeOption,
        CreateConnectRequest,
        UpdateConnectRequest,
        OAuthCallbackResponse
    )),
    tags((name = "Stripe Connect", description = "Marketplace accounts and payment-form orders"))
)]
pub struct StripeConnectApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_are_documented() {
        let doc = StripeConnectApiDoc::openapi();
        for path in [
            "/stripe/save-order",
            "/stripe/connects",
            "/stripe/connects/{id}",
            "/stripe/connects/vendor/{vendor_id}",
            "/stripe/connect/oauth/callback",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }
}
