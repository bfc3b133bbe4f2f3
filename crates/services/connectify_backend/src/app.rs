//! Assembles the API router from the enabled features.

use axum::{routing::get, Router};
use connectify_common::ConnectifyError;
use connectify_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)]
use tracing::info;

#[cfg(feature = "stripe")]
use {
    connectify_common::is_stripe_enabled,
    connectify_db::DbClientFactory,
    connectify_stripe_connect::{routes as stripe_connect_routes, ConnectState},
};

/// Builds the application router, everything nested under `/api`.
pub async fn build_app(config: Arc<AppConfig>) -> Result<Router, ConnectifyError> {
    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut api_router = Router::new()
        .route("/", get(|| async { "Welcome to Connectify-Rs API!" }))
        .merge(connectify_common::routes());

    #[cfg(feature = "stripe")]
    {
        if is_stripe_enabled(&config) {
            info!("Initializing Stripe Connect service...");
            let db = DbClientFactory::new().from_app_config(&config).await?;
            let state = ConnectState::from_config(config.clone(), db)?;
            state.registry.init_schema().await?;
            api_router = api_router.merge(stripe_connect_routes::routes(Arc::new(state)));
        } else {
            info!("Stripe Connect service disabled");
        }
    }

    #[allow(unused_mut)]
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "stripe")]
        use connectify_stripe_connect::doc::StripeConnectApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Connectify API",
                version = "0.1.0",
                description = "Connectify Service API Docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Connectify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)]
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "stripe")]
        openapi_doc.merge(StripeConnectApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use connectify_config::{ConnectConfig, DatabaseConfig, ServerConfig, StripeConfig};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn config(use_stripe: bool) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            use_stripe,
            database: Some(DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: None,
            }),
            stripe: Some(StripeConfig {
                success_url: "https://shop.test/thanks".to_string(),
                cancel_url: "https://shop.test/cancel".to_string(),
                currency: Some("eur".to_string()),
                unit_amount: None,
                product_name: None,
                secret_key: Some("sk_test_backend".to_string()),
                client_id: None,
                api_base_url: "https://api.stripe.com".to_string(),
                connect_base_url: "https://connect.stripe.com".to_string(),
            }),
            connect: ConnectConfig { global_rate: 5.0 },
            plugins: HashMap::new(),
        })
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_is_served_under_api() {
        let app = build_app(config(false)).await.unwrap();
        assert_eq!(status_of(app, "/api/health").await, StatusCode::OK);
    }

    #[cfg(feature = "stripe")]
    #[tokio::test]
    async fn test_stripe_connect_routes_follow_runtime_flag() {
        let app = build_app(config(true)).await.unwrap();
        assert_eq!(
            status_of(app, "/api/stripe/connects/product-types").await,
            StatusCode::OK
        );

        let app = build_app(config(false)).await.unwrap();
        assert_eq!(
            status_of(app, "/api/stripe/connects/product-types").await,
            StatusCode::NOT_FOUND
        );
    }
}
