//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PREPPULSE_DB_PATH`: Database file path (required)
//! - `PREPPULSE_DB_POOL_SIZE`: Connection pool size (required)
//! - `PREPPULSE_DB_ENCRYPTION_KEY`: Optional SQLCipher key
//! - `PREPPULSE_SCAN_CRON`: Cron expression for the periodic scan
//! - `PREPPULSE_SCAN_LOOKAHEAD_DAYS`: Calendar lookahead window in days
//! - `PREPPULSE_BIND_ADDR`: HTTP listen address
//! - `PREPPULSE_SLACK_BOT_TOKEN`: Slack bot token
//! - `PREPPULSE_TWILIO_ACCOUNT_SID` / `PREPPULSE_TWILIO_AUTH_TOKEN` /
//!   `PREPPULSE_TWILIO_FROM_NUMBER`: Twilio SMS credentials
//! - `PREPPULSE_EMAIL_API_URL` / `PREPPULSE_EMAIL_API_KEY` /
//!   `PREPPULSE_EMAIL_FROM_ADDRESS`: Email provider settings
//! - `PREPPULSE_EVENT_BUS_URL`: Trigger event sink endpoint
//! - `PREPPULSE_CALENDAR_API_URL`: Calendar API base override
//!
//! Channel variables are all optional; a channel without credentials is
//! simply excluded from delivery.

use std::path::{Path, PathBuf};

use preppulse_domain::{
    ChannelsConfig, Config, DatabaseConfig, PrepPulseError, Result, ScanConfig, ServerConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PrepPulseError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database variables are required; everything else falls back to its
/// default when unset.
///
/// # Errors
/// Returns `PrepPulseError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("PREPPULSE_DB_PATH")?;
    let db_pool_size = env_var("PREPPULSE_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| PrepPulseError::Config(format!("Invalid pool size: {e}")))
    })?;
    let db_encryption_key = std::env::var("PREPPULSE_DB_ENCRYPTION_KEY").ok();

    let scan_defaults = ScanConfig::default();
    let cron_expression =
        std::env::var("PREPPULSE_SCAN_CRON").unwrap_or(scan_defaults.cron_expression);
    let lookahead_days = match std::env::var("PREPPULSE_SCAN_LOOKAHEAD_DAYS") {
        Ok(s) => s
            .parse::<i64>()
            .map_err(|e| PrepPulseError::Config(format!("Invalid lookahead days: {e}")))?,
        Err(_) => scan_defaults.lookahead_days,
    };

    let bind_addr =
        std::env::var("PREPPULSE_BIND_ADDR").unwrap_or(ServerConfig::default().bind_addr);

    let channels = ChannelsConfig {
        slack_bot_token: std::env::var("PREPPULSE_SLACK_BOT_TOKEN").ok(),
        twilio_account_sid: std::env::var("PREPPULSE_TWILIO_ACCOUNT_SID").ok(),
        twilio_auth_token: std::env::var("PREPPULSE_TWILIO_AUTH_TOKEN").ok(),
        twilio_from_number: std::env::var("PREPPULSE_TWILIO_FROM_NUMBER").ok(),
        email_api_url: std::env::var("PREPPULSE_EMAIL_API_URL").ok(),
        email_api_key: std::env::var("PREPPULSE_EMAIL_API_KEY").ok(),
        email_from_address: std::env::var("PREPPULSE_EMAIL_FROM_ADDRESS").ok(),
        event_bus_url: std::env::var("PREPPULSE_EVENT_BUS_URL").ok(),
        calendar_api_url: std::env::var("PREPPULSE_CALENDAR_API_URL").ok(),
    };

    Ok(Config {
        database: DatabaseConfig {
            path: db_path,
            pool_size: db_pool_size,
            encryption_key: db_encryption_key,
        },
        scan: ScanConfig { cron_expression, lookahead_days },
        server: ServerConfig { bind_addr },
        channels,
        classification: Default::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PrepPulseError::Config` if no file is found or the contents are
/// invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PrepPulseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PrepPulseError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PrepPulseError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PrepPulseError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PrepPulseError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PrepPulseError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard locations for a config file.
///
/// Searches the current working directory, up to two parent directories,
/// and the executable's directory, for `config.{json,toml}` and
/// `preppulse.{json,toml}`. Returns the first file that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("preppulse.json"),
            cwd.join("preppulse.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("preppulse.json"),
                exe_dir.join("preppulse.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PrepPulseError::Config(format!("Missing required environment variable: {key}"))
    })
}
