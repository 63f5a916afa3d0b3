//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports TOML and JSON formats
//!
//! Whichever source wins, the result passes `Config::validate` before it is
//! returned.
//!
//! ## Environment Variables
//! Required:
//! - `RDA_EVE_CLIENT_ID`, `RDA_EVE_CLIENT_SECRET`: SSO application credentials
//! - `RDA_CALLBACK_URL`: redirect URI registered with the SSO application
//! - `RDA_SESSION_STORE_URL`, `RDA_SESSION_STORE_SERVICE_KEY`: session store
//! - `RDA_ATTEMPT_SIGNING_KEY`: key material for sealed login attempts
//!
//! Optional:
//! - `RDA_EVE_SSO_BASE_URL` (default `https://login.eveonline.com`)
//! - `RDA_ESI_BASE_URL` (default `https://esi.evetech.net/latest`)
//! - `RDA_BIND_ADDR` (default `127.0.0.1:3000`)
//! - `RDA_PUBLIC_ORIGIN`
//! - `RDA_SECURE_COOKIES` (default `true`)
//! - `RDA_NAME_CACHE_TTL_SECONDS` (default 86400)
//! - `RDA_NAME_CACHE_MAX_CAPACITY` (default 100000)
//!
//! ## File Locations
//! The loader probes `rda.toml`, `config.toml`, `rda.json` and `config.json`
//! in the current working directory, its parent and grandparent, then next
//! to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rda_domain::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_ESI_BASE_URL, DEFAULT_NAME_CACHE_MAX_CAPACITY,
    DEFAULT_NAME_CACHE_TTL_SECONDS, DEFAULT_SSO_BASE_URL,
};
use rda_domain::{
    default_scopes, Config, EsiConfig, NameCacheConfig, ProviderConfig, RdaError, Result,
    SecretString, ServerConfig, SessionStoreConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["rda.toml", "config.toml", "rda.json", "config.json"];

const REQUIRED_ENV_VARS: [&str; 6] = [
    "RDA_EVE_CLIENT_ID",
    "RDA_EVE_CLIENT_SECRET",
    "RDA_CALLBACK_URL",
    "RDA_SESSION_STORE_URL",
    "RDA_SESSION_STORE_SERVICE_KEY",
    "RDA_ATTEMPT_SIGNING_KEY",
];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. When all
/// of them are set, an invalid environment is reported as is.
///
/// # Errors
/// Returns `RdaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) if required_env_present() => {
            tracing::warn!(error = %e, "Environment configuration is invalid");
            Err(e)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `RdaError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let config = Config {
        provider: ProviderConfig {
            client_id: env_var("RDA_EVE_CLIENT_ID")?,
            client_secret: SecretString::new(env_var("RDA_EVE_CLIENT_SECRET")?),
            callback_url: env_var("RDA_CALLBACK_URL")?,
            sso_base_url: env_or("RDA_EVE_SSO_BASE_URL", DEFAULT_SSO_BASE_URL),
            scopes: default_scopes(),
        },
        esi: EsiConfig { base_url: env_or("RDA_ESI_BASE_URL", DEFAULT_ESI_BASE_URL) },
        session_store: SessionStoreConfig {
            url: env_var("RDA_SESSION_STORE_URL")?,
            service_key: SecretString::new(env_var("RDA_SESSION_STORE_SERVICE_KEY")?),
        },
        server: ServerConfig {
            bind_addr: env_or("RDA_BIND_ADDR", DEFAULT_BIND_ADDR),
            public_origin: std::env::var("RDA_PUBLIC_ORIGIN").ok().filter(|s| !s.is_empty()),
            secure_cookies: env_bool("RDA_SECURE_COOKIES", true),
            attempt_signing_key: SecretString::new(env_var("RDA_ATTEMPT_SIGNING_KEY")?),
        },
        names: NameCacheConfig {
            ttl_seconds: env_parse("RDA_NAME_CACHE_TTL_SECONDS", DEFAULT_NAME_CACHE_TTL_SECONDS)?,
            max_capacity: env_parse(
                "RDA_NAME_CACHE_MAX_CAPACITY",
                DEFAULT_NAME_CACHE_MAX_CAPACITY,
            )?,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `RdaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RdaError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RdaError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RdaError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.toml` or `.json`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RdaError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RdaError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RdaError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `RdaError::Config` if the variable is not set or empty.
fn required_env_present() -> bool {
    REQUIRED_ENV_VARS.iter().all(|key| std::env::var(key).is_ok_and(|v| !v.is_empty()))
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty()).ok_or_else(|| {
        RdaError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .map_err(|e| RdaError::Config(format!("Invalid value for {}: {}", key, e))),
        _ => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use parking_lot::Mutex;
    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const REQUIRED: [(&str, &str); 6] = [
        ("RDA_EVE_CLIENT_ID", "client123"),
        ("RDA_EVE_CLIENT_SECRET", "s3cret"),
        ("RDA_CALLBACK_URL", "http://127.0.0.1:3000/auth/callback"),
        ("RDA_SESSION_STORE_URL", "memory://"),
        ("RDA_SESSION_STORE_SERVICE_KEY", "svc-key"),
        ("RDA_ATTEMPT_SIGNING_KEY", "0123456789abcdef0123456789abcdef"),
    ];

    const OPTIONAL: [&str; 7] = [
        "RDA_EVE_SSO_BASE_URL",
        "RDA_ESI_BASE_URL",
        "RDA_BIND_ADDR",
        "RDA_PUBLIC_ORIGIN",
        "RDA_SECURE_COOKIES",
        "RDA_NAME_CACHE_TTL_SECONDS",
        "RDA_NAME_CACHE_MAX_CAPACITY",
    ];

    fn clear_env() {
        for (key, _) in REQUIRED {
            std::env::remove_var(key);
        }
        for key in OPTIONAL {
            std::env::remove_var(key);
        }
    }

    fn set_required() {
        for (key, value) in REQUIRED {
            std::env::set_var(key, value);
        }
    }

    const TOML_CONFIG: &str = r#"
[provider]
client_id = "file-client"
client_secret = "file-secret"
callback_url = "https://rda.example.com/auth/callback"

[session_store]
url = "https://store.example.com"
service_key = "svc"

[server]
attempt_signing_key = "fedcba9876543210fedcba9876543210"
secure_cookies = false

[names]
ttl_seconds = 3600
"#;

    fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock();

        for value in ["1", "true", "YES", "on"] {
            std::env::set_var("RDA_TEST_BOOL", value);
            assert!(env_bool("RDA_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("RDA_TEST_BOOL", value);
            assert!(!env_bool("RDA_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("RDA_TEST_BOOL");
        assert!(env_bool("RDA_TEST_BOOL", true));
    }

    #[test]
    fn test_load_from_env_applies_defaults() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();

        let config = load_from_env().expect("config from env");
        assert_eq!(config.provider.client_id, "client123");
        assert_eq!(config.provider.client_secret.expose(), "s3cret");
        assert_eq!(config.provider.sso_base_url, DEFAULT_SSO_BASE_URL);
        assert_eq!(config.esi.base_url, DEFAULT_ESI_BASE_URL);
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.server.secure_cookies);
        assert!(config.server.public_origin.is_none());
        assert_eq!(config.names.ttl_seconds, DEFAULT_NAME_CACHE_TTL_SECONDS);

        clear_env();
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();
        std::env::set_var("RDA_ESI_BASE_URL", "http://127.0.0.1:9999");
        std::env::set_var("RDA_SECURE_COOKIES", "false");
        std::env::set_var("RDA_NAME_CACHE_TTL_SECONDS", "60");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.esi.base_url, "http://127.0.0.1:9999");
        assert!(!config.server.secure_cookies);
        assert_eq!(config.names.ttl_seconds, 60);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();
        std::env::remove_var("RDA_EVE_CLIENT_SECRET");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, RdaError::Config(ref m) if m.contains("RDA_EVE_CLIENT_SECRET")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();
        std::env::set_var("RDA_NAME_CACHE_MAX_CAPACITY", "lots");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, RdaError::Config(_)));

        clear_env();
    }

    #[test]
    fn test_load_from_env_rejects_weak_signing_key() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();
        std::env::set_var("RDA_ATTEMPT_SIGNING_KEY", "short");

        assert!(matches!(load_from_env(), Err(RdaError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_reports_invalid_complete_env() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        set_required();
        std::env::set_var("RDA_ATTEMPT_SIGNING_KEY", "short");

        let err = load().unwrap_err();
        assert!(
            matches!(err, RdaError::Config(ref m) if m.contains("attempt_signing_key")),
            "unexpected error: {err}"
        );

        std::env::set_var("RDA_ATTEMPT_SIGNING_KEY", "0123456789abcdef0123456789abcdef");
        std::env::set_var("RDA_NAME_CACHE_TTL_SECONDS", "forever");
        let err = load().unwrap_err();
        assert!(
            matches!(err, RdaError::Config(ref m) if m.contains("RDA_NAME_CACHE_TTL_SECONDS")),
            "unexpected error: {err}"
        );

        clear_env();
    }

    #[test]
    fn test_required_env_present_needs_every_var() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        assert!(!required_env_present());

        set_required();
        assert!(required_env_present());

        std::env::set_var("RDA_CALLBACK_URL", "");
        assert!(!required_env_present());

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = write_temp(TOML_CONFIG, ".toml");

        let config = load_from_file(Some(file.path().to_path_buf())).expect("toml config");
        assert_eq!(config.provider.client_id, "file-client");
        assert_eq!(config.session_store.url, "https://store.example.com");
        assert!(!config.server.secure_cookies);
        assert_eq!(config.names.ttl_seconds, 3600);
        assert_eq!(config.names.max_capacity, DEFAULT_NAME_CACHE_MAX_CAPACITY);
    }

    #[test]
    fn test_load_from_file_json() {
        let json = serde_json::json!({
            "provider": {
                "client_id": "json-client",
                "client_secret": "secret",
                "callback_url": "http://127.0.0.1:3000/auth/callback"
            },
            "session_store": { "url": "memory://", "service_key": "svc" },
            "server": { "attempt_signing_key": "0123456789abcdef0123456789abcdef" }
        });
        let file = write_temp(&json.to_string(), ".json");

        let config = load_from_file(Some(file.path().to_path_buf())).expect("json config");
        assert_eq!(config.provider.client_id, "json-client");
        assert!(config.session_store.is_in_memory());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/rda.toml")));
        assert!(matches!(result, Err(RdaError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let file = write_temp("[provider\nclient_id = ", ".toml");
        assert!(matches!(
            load_from_file(Some(file.path().to_path_buf())),
            Err(RdaError::Config(ref m)) if m.contains("TOML")
        ));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("rda.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
