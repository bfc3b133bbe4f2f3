//! Stripe Connect OAuth token exchange.

use crate::error::StripeError;
use crate::settings::initialize_stripe;
use connectify_common::services::{BoxFuture, OAuthService, OAuthToken};
use connectify_common::HTTP_CLIENT;
use connectify_config::StripeConfig;
use serde_json::Value;
use tracing::{debug, info, warn};

/// The OAuth client the registry depends on.
pub type ConnectOAuthClient = dyn OAuthService<Error = StripeError>;

/// Talks to `{connect_base_url}/oauth/token`.
#[derive(Debug, Clone)]
pub struct StripeOAuthClient {
    connect_base_url: String,
    configured_key: Option<String>,
}

impl StripeOAuthClient {
    pub fn new(stripe_config: &StripeConfig) -> Self {
        Self {
            connect_base_url: stripe_config.connect_base_url.trim_end_matches('/').to_string(),
            configured_key: stripe_config.secret_key.clone(),
        }
    }

    async fn exchange(&self, code: String) -> Result<OAuthToken, StripeError> {
        let secret_key = initialize_stripe(self.configured_key.as_deref())?;
        let url = format!("{}/oauth/token", self.connect_base_url);
        let form_body = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code),
        ];

        debug!("[Stripe OAuth] Exchanging authorization code at {}", url);
        let response = HTTP_CLIENT
            .post(&url)
            .basic_auth(secret_key, None::<&str>)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if status.is_success() {
            let token: OAuthToken = serde_json::from_str(&body_text)?;
            info!(
                "[Stripe OAuth] Connected account {} authorized",
                token.stripe_user_id
            );
            return Ok(token);
        }

        warn!(
            "[Stripe OAuth] Token request failed with HTTP status {}: {}",
            status, body_text
        );
        Err(oauth_error(status.as_u16(), &body_text))
    }
}

/// Maps an OAuth error body to a [`StripeError`].
///
/// OAuth errors carry `error`/`error_description` at the top level, while API
/// errors nest an object with a `message`.
fn oauth_error(status_code: u16, body_text: &str) -> StripeError {
    let json_body = serde_json::from_str::<Value>(body_text).ok();
    let error = json_body.as_ref().and_then(|b| b.get("error"));
    let description = json_body
        .as_ref()
        .and_then(|b| b.get("error_description"))
        .and_then(|d| d.as_str());

    match error {
        Some(Value::String(code)) if code == "invalid_grant" => {
            StripeError::InvalidGrant(description.unwrap_or(code).to_string())
        }
        Some(Value::String(code)) => StripeError::ApiError {
            status_code,
            message: description.unwrap_or(code).to_string(),
        },
        Some(obj) => StripeError::ApiError {
            status_code,
            message: obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(body_text)
                .to_string(),
        },
        None => StripeError::ApiError {
            status_code,
            message: body_text.to_string(),
        },
    }
}

impl OAuthService for StripeOAuthClient {
    type Error = StripeError;

    fn token(&self, code: &str) -> BoxFuture<'_, OAuthToken, Self::Error> {
        let code = code.to_string();
        Box::pin(self.exchange(code))
    }
}
