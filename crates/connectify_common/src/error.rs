use std::fmt;
use thiserror::Error;

/// The base error type for all Connectify errors.
///
/// Each crate converts its own error enum into this one at the HTTP boundary
/// by implementing `From<SpecificError> for ConnectifyError`.
#[derive(Error, Debug)]
pub enum ConnectifyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// The store refused a change (e.g. a delete that affected nothing)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ConnectifyError {
    fn status_code(&self) -> u16 {
        match self {
            ConnectifyError::HttpError(_) => 500,
            ConnectifyError::ParseError(_) => 400,
            ConnectifyError::ConfigError(_) => 500,
            ConnectifyError::ValidationError(_) => 400,
            ConnectifyError::DatabaseError(_) => 500,
            ConnectifyError::ExternalServiceError { .. } => 502,
            ConnectifyError::ConflictError(_) => 409,
            ConnectifyError::NotFoundError(_) => 404,
            ConnectifyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| ConnectifyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| ConnectifyError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for ConnectifyError {
    fn from(err: reqwest::Error) -> Self {
        ConnectifyError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectifyError {
    fn from(err: serde_json::Error) -> Self {
        ConnectifyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ConnectifyError {
    fn from(err: std::io::Error) -> Self {
        ConnectifyError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ConnectifyError {
    ConnectifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(not_found("connect 7").status_code(), 404);
        assert_eq!(validation_error("bad").status_code(), 400);
        assert_eq!(conflict("still referenced").status_code(), 409);
        assert_eq!(external_service_error("Stripe", "down").status_code(), 502);
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let err = result.context("binding listener").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: binding listener: disk");
    }
}
