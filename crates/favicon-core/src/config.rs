use crate::app_config::{AppConfig, Environment, DEFAULT_PROXY_TEMPLATE, DEFAULT_USER_AGENT};
use crate::ConfigError;

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
/// Every variable has a default, so an empty environment yields a working
/// configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        or_default(var, default)
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("FAVICON_ENV", "development"));
    let bind_addr = parse_addr("FAVICON_BIND_ADDR", "0.0.0.0:8787")?;
    let log_level = or_default("FAVICON_LOG_LEVEL", "info");
    let overrides_path = optional("FAVICON_OVERRIDES_PATH").map(PathBuf::from);
    let static_host = optional("FAVICON_STATIC_HOST");
    let user_agent = optional("FAVICON_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let page_timeout_ms = parse_u64("FAVICON_PAGE_TIMEOUT_MS", "5000")?;
    let manifest_timeout_ms = parse_u64("FAVICON_MANIFEST_TIMEOUT_MS", "2000")?;
    let icon_timeout_ms = parse_u64("FAVICON_ICON_TIMEOUT_MS", "2500")?;
    for (var, value) in [
        ("FAVICON_PAGE_TIMEOUT_MS", page_timeout_ms),
        ("FAVICON_MANIFEST_TIMEOUT_MS", manifest_timeout_ms),
        ("FAVICON_ICON_TIMEOUT_MS", icon_timeout_ms),
    ] {
        if value == 0 {
            return Err(invalid(var, "timeout must be greater than zero".to_string()));
        }
    }

    let target_size = parse_u16("FAVICON_TARGET_SIZE", "144")?;

    // Present-but-empty disables the proxy tier; absent keeps the default.
    let proxy_template = match lookup("FAVICON_PROXY_TEMPLATE") {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => {
            let raw = raw.trim().to_string();
            if !raw.contains("{host}") {
                return Err(invalid(
                    "FAVICON_PROXY_TEMPLATE",
                    "template must contain a {host} placeholder".to_string(),
                ));
            }
            Some(raw)
        }
        Err(_) => Some(DEFAULT_PROXY_TEMPLATE.to_string()),
    };

    let cache_max_age_secs = parse_u64("FAVICON_CACHE_MAX_AGE_SECS", "604800")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        overrides_path,
        static_host,
        user_agent,
        page_timeout_ms,
        manifest_timeout_ms,
        icon_timeout_ms,
        target_size,
        proxy_template,
        cache_max_age_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
