// --- File: crates/connectify_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite:data/connectify.db", overridable via APP_DATABASE__URL
    #[serde(default)]
    pub max_connections: Option<u32>,
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_connect_base_url() -> String {
    "https://connect.stripe.com".to_string()
}

// --- Stripe Config ---
// Holds non-secret Stripe config. The secret key is either "secret_from_env"
// (resolved to STRIPE_SECRET_KEY) or left out and read from the environment on first use.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub success_url: String, // Mandatory
    pub cancel_url: String,  // Mandatory
    pub currency: Option<String>,
    pub unit_amount: Option<i64>,
    pub product_name: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// OAuth client id (ca_...) used to build Connect onboarding links.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_connect_base_url")]
    pub connect_base_url: String,
}

fn default_global_rate() -> f64 {
    0.0
}

// --- Stripe Connect (marketplace) Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConnectConfig {
    /// Commission rate (percent) applied to newly created Connects.
    #[serde(default = "default_global_rate")]
    pub global_rate: f64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            global_rate: default_global_rate(),
        }
    }
}

// --- Installed add-on plugins, keyed by handle (e.g. "commerce") ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PluginConfig {
    #[serde(default)]
    pub enabled: bool,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub plugins: HashMap<String, PluginConfig>,
}

impl AppConfig {
    /// Whether an add-on plugin is installed and enabled.
    pub fn is_plugin_enabled(&self, handle: &str) -> bool {
        self.plugins.get(handle).map(|p| p.enabled).unwrap_or(false)
    }
}
