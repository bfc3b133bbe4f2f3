use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub mod models;
pub use models::*;

/// Marker value that is replaced by the matching environment variable.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the layered application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default.*`
/// 2. `config/{RUN_ENV}.*` (RUN_ENV defaults to `debug`)
/// 3. environment variables prefixed with `APP_`, nested keys separated by `__`
///    (e.g. `APP_DATABASE__URL`, `APP_CONNECT__GLOBAL_RATE`)
///
/// The config directory can be moved with `CONFIG_DIR`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => {
                        warn!("env var {} not found for {}", env_key, SECRET_FROM_ENV);
                        *obj = Value::Null;
                    }
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
///
/// `stripe.secret_key = "secret_from_env"` resolves to `STRIPE_SECRET_KEY`.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `DOTENV_OVERRIDE` if set, else the first command line argument when it
/// starts with `.env`, else `.env`. Loading happens at most once per process.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_secret_marker_is_resolved_from_env() {
        env::set_var("CFGTEST_SECRET_KEY", "sk_test_123");
        let mut value = json!({ "cfgtest": { "secret_key": "secret_from_env", "plain": "x" } });
        inject_env_secrets(&mut value);
        assert_eq!(value["cfgtest"]["secret_key"], "sk_test_123");
        assert_eq!(value["cfgtest"]["plain"], "x");
    }

    #[test]
    fn test_missing_secret_becomes_null() {
        let mut value = json!({ "nosuchsection": { "nosuchkey": "secret_from_env" } });
        inject_env_secrets(&mut value);
        assert!(value["nosuchsection"]["nosuchkey"].is_null());
    }

    #[test]
    fn test_app_config_defaults() {
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "host": "127.0.0.1", "port": 8086 }
        }))
        .unwrap();
        assert!(!config.use_stripe);
        assert_eq!(config.connect.global_rate, 0.0);
        assert!(!config.is_plugin_enabled("commerce"));
    }

    #[test]
    fn test_plugin_lookup() {
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "host": "127.0.0.1", "port": 8086 },
            "plugins": { "commerce": { "enabled": true }, "other": {} }
        }))
        .unwrap();
        assert!(config.is_plugin_enabled("commerce"));
        assert!(!config.is_plugin_enabled("other"));
    }

    #[test]
    fn test_stripe_urls_default() {
        let config: StripeConfig = serde_json::from_value(json!({
            "success_url": "https://example.com/ok",
            "cancel_url": "https://example.com/cancel"
        }))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.connect_base_url, "https://connect.stripe.com");
        assert!(config.secret_key.is_none());
    }
}
