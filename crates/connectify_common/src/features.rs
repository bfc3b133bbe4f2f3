//! Feature flag handling for the Connectify application.
//!
//! Feature flags are used in two ways:
//!
//! 1. Compile-time feature flags using `#[cfg(feature = "...")]`
//!    (`openapi`, `stripe`)
//! 2. Runtime feature flags using configuration values (`use_stripe`)
//!
//! This module provides the runtime checks.

use connectify_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime: the flag is on and its section is configured.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Stripe feature is enabled at runtime.
#[cfg(feature = "stripe")]
pub fn is_stripe_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_stripe, config.stripe.as_ref())
}
