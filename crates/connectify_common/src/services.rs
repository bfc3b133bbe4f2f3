// --- File: crates/connectify_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! This module provides trait definitions for the payment processor operations used by
//! the application. These traits allow for dependency injection and easier testing by
//! decoupling the application logic from the concrete Stripe client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A trait for the payment processor's OAuth (Connect onboarding) operations.
pub trait OAuthService: Send + Sync {
    /// Error type returned by OAuth operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Exchange an authorization code for the connected account's token.
    fn token(&self, code: &str) -> BoxFuture<'_, OAuthToken, Self::Error>;
}

/// A trait for turning a submitted payment form into an order.
pub trait OrderService: Send + Sync {
    /// Error type returned by order operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process a card payment, either through hosted checkout or embedded elements.
    ///
    /// `Ok(None)` means the processor declined to create an order.
    fn process_payment(&self, request: OrderRequest) -> BoxFuture<'_, Option<Order>, Self::Error>;

    /// Start a redirect-based payment (iDEAL, SOFORT).
    ///
    /// `Ok(None)` means no redirect source was returned.
    fn process_asynchronous_payment(
        &self,
        request: OrderRequest,
    ) -> BoxFuture<'_, Option<AsyncPaymentSource>, Self::Error>;
}

/// Token returned by the OAuth exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The connected account id (acct_...).
    pub stripe_user_id: String,
    pub scope: Option<String>,
    pub livemode: Option<bool>,
    pub token_type: Option<String>,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Ideal,
    Sofort,
}

impl PaymentMethod {
    /// Value of Stripe's `payment_method_types[]` parameter.
    pub fn as_stripe_type(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Ideal => "ideal",
            PaymentMethod::Sofort => "sofort",
        }
    }
}

/// A submitted payment form, normalised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Payment form (product) the order is placed for.
    pub form_id: Option<String>,
    pub email: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub quantity: Option<i64>,
    /// `None` for hosted checkout.
    pub payment_method: Option<PaymentMethod>,
    pub address: HashMap<String, String>,
    /// Where the customer lands after paying; `{number}` is replaced by the order number.
    pub return_url: Option<String>,
    /// Remaining posted fields, passed to the processor as metadata.
    pub metadata: HashMap<String, String>,
}

/// Result of a processed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    /// Processor-side reference (checkout session id).
    pub reference: String,
    /// Where the customer continues (hosted checkout page), if anywhere.
    pub redirect_url: Option<String>,
}

/// Redirect source returned by an asynchronous payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncPaymentSource {
    pub id: String,
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_stripe_types() {
        assert_eq!(PaymentMethod::Card.as_stripe_type(), "card");
        assert_eq!(PaymentMethod::Ideal.as_stripe_type(), "ideal");
        assert_eq!(PaymentMethod::Sofort.as_stripe_type(), "sofort");
    }
}
