use crate::handlers::{
    create_connect_handler, delete_connect_handler, get_connect_handler, oauth_callback_handler,
    product_types_handler, save_order_handler, update_connect_handler, vendor_connects_handler,
    ConnectState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the Stripe Connect feature.
pub fn routes(state: Arc<ConnectState>) -> Router {
    Router::new()
        .route("/stripe/save-order", post(save_order_handler))
        .route("/stripe/connects", post(create_connect_handler))
        .route("/stripe/connects/product-types", get(product_types_handler))
        .route(
            "/stripe/connects/{id}",
            get(get_connect_handler)
                .post(update_connect_handler)
                .delete(delete_connect_handler),
        )
        .route(
            "/stripe/connects/vendor/{vendor_id}",
            get(vendor_connects_handler),
        )
        .route("/stripe/connect/oauth/callback", get(oauth_callback_handler))
        .with_state(state)
}
