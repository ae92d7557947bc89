use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_GEOCODER_BASE_URL: &str = "https://geocode-maps.yandex.ru/1.x";
const DEFAULT_GEOCODER_USER_AGENT: &str = "foodcart/0.1 (order-matching)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("FOODCART_ENV", "development"))?;
    let log_level = or_default("FOODCART_LOG_LEVEL", "info");

    let geocoder_api_key = optional("YANDEX_GEOCODER_API_KEY");
    let geocoder_base_url = or_default("FOODCART_GEOCODER_BASE_URL", DEFAULT_GEOCODER_BASE_URL);
    let geocoder_timeout_secs: u64 = parse_var(
        "FOODCART_GEOCODER_TIMEOUT_SECS",
        &or_default("FOODCART_GEOCODER_TIMEOUT_SECS", "10"),
    )?;
    let geocoder_user_agent =
        or_default("FOODCART_GEOCODER_USER_AGENT", DEFAULT_GEOCODER_USER_AGENT);
    let geocoder_flush_batch_size: usize = parse_var(
        "FOODCART_GEOCODER_FLUSH_BATCH_SIZE",
        &or_default("FOODCART_GEOCODER_FLUSH_BATCH_SIZE", "20"),
    )?;
    if geocoder_flush_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODCART_GEOCODER_FLUSH_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if geocoder_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODCART_GEOCODER_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let match_deadline_secs = optional("FOODCART_MATCH_DEADLINE_SECS")
        .map(|raw| parse_var::<u64>("FOODCART_MATCH_DEADLINE_SECS", &raw))
        .transpose()?;

    let db_max_connections: u32 = parse_var(
        "FOODCART_DB_MAX_CONNECTIONS",
        &or_default("FOODCART_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_var(
        "FOODCART_DB_MIN_CONNECTIONS",
        &or_default("FOODCART_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_var(
        "FOODCART_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("FOODCART_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODCART_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        geocoder_api_key,
        geocoder_base_url,
        geocoder_timeout_secs,
        geocoder_user_agent,
        geocoder_flush_batch_size,
        match_deadline_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FOODCART_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
