//! Stripe Connect marketplace support for Connectify.
//!
//! Vendors get a Connect (a Stripe sub-account scoped to products) and earn
//! commission on the orders placed through payment forms.

pub mod coerce;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod orders;
pub mod registry;
#[cfg(test)]
mod registry_test;
pub mod routes;
pub mod settings;

// Re-export for main backend
pub use error::StripeError;
pub use handlers::ConnectState;
pub use oauth::{ConnectOAuthClient, StripeOAuthClient};
pub use orders::{OrderSubmission, PaymentType, StripeOrderService};
pub use registry::{ConnectRegistry, ProductTypeOption, SupportedProductType};
pub use routes::routes;
pub use settings::{initialize_stripe, AppConfigSettings, ConnectSettings, SettingsProvider};
