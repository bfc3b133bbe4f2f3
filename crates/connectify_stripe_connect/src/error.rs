use connectify_common::{
    config_error, conflict, external_service_error, internal_error, not_found, validation_error,
    ConnectifyError, HttpStatusCode,
};
use connectify_db::DbError;
use thiserror::Error;

/// Stripe Connect error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// A Connect (or other record) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An input field could not be coerced to its declared type
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// The product type is unknown or not currently supported
    #[error("Unsupported product type: {0}")]
    InvalidProductType(String),

    /// The store reported that a change was not applied
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The authorization code was rejected by Stripe's OAuth endpoint
    #[error("Stripe OAuth rejected the authorization code: {0}")]
    InvalidGrant(String),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration missing or incomplete")]
    ConfigError,

    /// Unexpected store error
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl StripeError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        StripeError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Convert StripeError to ConnectifyError
impl From<StripeError> for ConnectifyError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::NotFound(msg) => not_found(msg),
            e @ StripeError::InvalidInput { .. } => validation_error(e),
            e @ StripeError::InvalidProductType(_) => validation_error(e),
            StripeError::PersistenceFailure(msg) => conflict(msg),
            StripeError::InvalidGrant(msg) => external_service_error("Stripe OAuth", msg),
            StripeError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Stripe API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            StripeError::RequestError(e) => {
                ConnectifyError::HttpError(format!("Stripe request error: {}", e))
            }
            StripeError::ParseError(e) => {
                ConnectifyError::ParseError(format!("Stripe response parse error: {}", e))
            }
            StripeError::ConfigError => config_error("Stripe configuration missing or incomplete"),
            StripeError::Database(e) => e.into(),
            StripeError::InternalError(msg) => internal_error(format!("Stripe internal error: {}", msg)),
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::NotFound(_) => 404,
            StripeError::InvalidInput { .. } => 400,
            StripeError::InvalidProductType(_) => 400,
            StripeError::PersistenceFailure(_) => 409,
            StripeError::InvalidGrant(_) => 502,
            StripeError::ApiError { .. } => 502,
            StripeError::RequestError(_) => 500,
            StripeError::ParseError(_) => 500,
            StripeError::ConfigError => 500,
            StripeError::Database(DbError::NotFound(_)) => 404,
            StripeError::Database(_) => 500,
            StripeError::InternalError(_) => 500,
        }
    }
}
