//! Plugin settings and Stripe credentials.

use crate::error::StripeError;
use connectify_config::{AppConfig, SECRET_FROM_ENV};
use once_cell::sync::OnceCell;
use std::env;
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable holding the platform's Stripe secret key.
pub const STRIPE_SECRET_KEY_ENV: &str = "STRIPE_SECRET_KEY";

/// Handle of the optional commerce add-on.
pub const COMMERCE_PLUGIN_HANDLE: &str = "commerce";

static STRIPE_SECRET_KEY: OnceCell<String> = OnceCell::new();

/// Connect settings read at call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectSettings {
    /// Commission rate (percent) given to new Connects.
    pub global_rate: f64,
}

/// Source of plugin settings and the process-wide plugin lookup.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> ConnectSettings;

    /// Whether the add-on with this handle is installed and enabled.
    fn is_plugin_enabled(&self, handle: &str) -> bool;
}

/// [`SettingsProvider`] backed by the loaded application configuration.
#[derive(Debug, Clone)]
pub struct AppConfigSettings {
    config: Arc<AppConfig>,
}

impl AppConfigSettings {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl SettingsProvider for AppConfigSettings {
    fn settings(&self) -> ConnectSettings {
        ConnectSettings {
            global_rate: self.config.connect.global_rate,
        }
    }

    fn is_plugin_enabled(&self, handle: &str) -> bool {
        self.config.is_plugin_enabled(handle)
    }
}

/// Initialises the Stripe credentials once per process and returns the secret key.
///
/// A configured key wins over `STRIPE_SECRET_KEY`. Later calls return the first key
/// regardless of their argument.
pub fn initialize_stripe(configured_key: Option<&str>) -> Result<&'static str, StripeError> {
    STRIPE_SECRET_KEY
        .get_or_try_init(|| {
            let key = configured_key
                .filter(|k| !k.is_empty() && *k != SECRET_FROM_ENV)
                .map(str::to_string)
                .or_else(|| {
                    debug!("No Stripe key configured, reading {}", STRIPE_SECRET_KEY_ENV);
                    env::var(STRIPE_SECRET_KEY_ENV).ok().filter(|k| !k.is_empty())
                })
                .ok_or(StripeError::ConfigError)?;
            info!("Stripe credentials initialized");
            Ok(key)
        })
        .map(String::as_str)
}
