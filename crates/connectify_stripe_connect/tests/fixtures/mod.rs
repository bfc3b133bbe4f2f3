#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use connectify_common::services::{
    AsyncPaymentSource, BoxFuture, OAuthService, OAuthToken, Order, OrderRequest, OrderService,
};
use connectify_config::{AppConfig, ConnectConfig, PluginConfig, ServerConfig};
use connectify_db::DbClient;
use connectify_stripe_connect::{
    routes, AppConfigSettings, ConnectRegistry, ConnectState, StripeError,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub fn app_config(commerce_enabled: bool) -> Arc<AppConfig> {
    let mut plugins = HashMap::new();
    plugins.insert(
        "commerce".to_string(),
        PluginConfig {
            enabled: commerce_enabled,
        },
    );
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8086,
        },
        use_stripe: true,
        database: None,
        stripe: None,
        connect: ConnectConfig { global_rate: 10.0 },
        plugins,
    })
}

/// Accepts only "good-code".
pub struct FakeOAuth;

impl OAuthService for FakeOAuth {
    type Error = StripeError;

    fn token(&self, code: &str) -> BoxFuture<'_, OAuthToken, Self::Error> {
        let accepted = code == "good-code";
        Box::pin(async move {
            if accepted {
                Ok(OAuthToken {
                    stripe_user_id: "acct_fixture".to_string(),
                    scope: None,
                    livemode: Some(false),
                    token_type: None,
                })
            } else {
                Err(StripeError::InvalidGrant("unknown code".to_string()))
            }
        })
    }
}

/// Hosted checkout succeeds unless the posted amount is 0.99; iDEAL always redirects.
pub struct FakeOrders;

impl OrderService for FakeOrders {
    type Error = StripeError;

    fn process_payment(&self, request: OrderRequest) -> BoxFuture<'_, Option<Order>, Self::Error> {
        Box::pin(async move {
            if request.amount == Some(99) {
                return Ok(None);
            }
            Ok(Some(Order {
                number: "n0001".to_string(),
                reference: "cs_fixture".to_string(),
                redirect_url: request
                    .payment_method
                    .is_none()
                    .then(|| "https://checkout.stripe.test/cs_fixture".to_string()),
            }))
        })
    }

    fn process_asynchronous_payment(
        &self,
        _request: OrderRequest,
    ) -> BoxFuture<'_, Option<AsyncPaymentSource>, Self::Error> {
        Box::pin(async move {
            Ok(Some(AsyncPaymentSource {
                id: "src_fixture".to_string(),
                redirect_url: "https://bank.test/authorize".to_string(),
            }))
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DbClient,
    pub registry: Arc<ConnectRegistry>,
}

pub async fn test_app(commerce_enabled: bool) -> TestApp {
    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    let settings = Arc::new(AppConfigSettings::new(app_config(commerce_enabled)));
    let registry = Arc::new(ConnectRegistry::new(db.clone(), settings, Arc::new(FakeOAuth)));
    registry.init_schema().await.unwrap();

    let state = Arc::new(ConnectState {
        registry: registry.clone(),
        orders: Arc::new(FakeOrders),
    });

    TestApp {
        router: routes(state),
        db,
        registry,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
