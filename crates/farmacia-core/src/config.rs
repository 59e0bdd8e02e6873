use crate::app_config::{AppConfig, ClientConfig, Environment};
use crate::dataset::{Region, DEFAULT_CITY, DEFAULT_STATE};
use crate::ConfigError;

/// Load server configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Load client configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_client_config() -> Result<ClientConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_client_config(|key| std::env::var(key))
}

/// Pure parsing/validation over an env-var lookup function, so tests can use
/// a `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let bind_raw = or_default("FARMACIA_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "FARMACIA_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let env = parse_environment(&or_default("FARMACIA_ENV", "development"))?;
    let log_level = or_default("FARMACIA_LOG_LEVEL", "info");
    let dataset_path = PathBuf::from(or_default("FARMACIA_DATASET_PATH", "./data/pharmacies.csv"));

    let region = Region {
        state: non_blank(&lookup, "FARMACIA_DATASET_STATE", DEFAULT_STATE)?.to_uppercase(),
        city: non_blank(&lookup, "FARMACIA_DATASET_CITY", DEFAULT_CITY)?.to_uppercase(),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        dataset_path,
        region,
        data_update_date: lookup("FARMACIA_DATA_UPDATE_DATE").ok(),
    })
}

fn build_client_config<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let api_base_url = non_blank(&lookup, "FARMACIA_API_URL", "http://127.0.0.1:3000")?;
    let timeout_raw = or_default("FARMACIA_REQUEST_TIMEOUT_SECS", "30");
    let request_timeout_secs =
        timeout_raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "FARMACIA_REQUEST_TIMEOUT_SECS".to_string(),
                reason: e.to_string(),
            })?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FARMACIA_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(ClientConfig {
        api_base_url,
        favorites_dir: PathBuf::from(or_default("FARMACIA_FAVORITES_DIR", "./.farmacia")),
        request_timeout_secs,
        log_level: or_default("FARMACIA_LOG_LEVEL", "warn"),
        data_update_date: lookup("FARMACIA_DATA_UPDATE_DATE").ok(),
    })
}

fn non_blank<F>(lookup: &F, var: &str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must not be empty".to_string(),
        }),
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => Ok(default.to_string()),
    }
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FARMACIA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
