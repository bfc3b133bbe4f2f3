// --- File: crates/connectify_common/src/lib.rs ---

pub mod models;    // Shared marketplace data structures
pub mod routes;    // Route definitions
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities
pub mod features;  // Feature flag handling

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

// Re-export error types and utilities for easier access
pub use error::{
    ConnectifyError,
    HttpStatusCode,
    Context,
    config_error,
    validation_error,
    not_found,
    conflict,
    external_service_error,
    internal_error,
};

// Re-export HTTP utilities for easier access
pub use http::{
    IntoHttpResponse,
    client::HTTP_CLIENT,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

#[cfg(feature = "stripe")]
pub use features::is_stripe_enabled;
