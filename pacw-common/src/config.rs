//! Configuration loading and resolution
//!
//! Resolution priority for every setting:
//! 1. Explicit argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`~/.config/pacw/config.toml`)
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;

const API_BASE_URL_ENV: &str = "PACW_API_BASE_URL";
const TEMPLATES_DIR_ENV: &str = "PACW_TEMPLATES_DIR";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default upload size ceiling (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the case service
    pub api_base_url: String,
    /// Directory holding service-line template JSON files
    pub templates_dir: PathBuf,
    /// Upload size ceiling enforced before sending document bytes
    pub max_upload_bytes: u64,
}

impl EngineConfig {
    /// Resolve configuration from arguments, environment, and config file
    pub fn resolve(api_base_url: Option<&str>, templates_dir: Option<&str>) -> Result<Self> {
        let file = match load_config_file() {
            Ok(value) => Some(value),
            Err(Error::Config(reason)) => {
                tracing::debug!(reason = %reason, "No usable config file");
                None
            }
            Err(_) => None,
        };

        let api_base_url = resolve_value(
            api_base_url,
            API_BASE_URL_ENV,
            file.as_ref(),
            "api_base_url",
        )
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let templates_dir = resolve_value(
            templates_dir,
            TEMPLATES_DIR_ENV,
            file.as_ref(),
            "templates_dir",
        )
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::Config("No templates directory configured (set PACW_TEMPLATES_DIR)".to_string())
        })?;

        let max_upload_bytes = file
            .as_ref()
            .and_then(|config| config.get("max_upload_bytes"))
            .and_then(|value| value.as_integer())
            .map(|value| value.max(1) as u64)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            api_base_url,
            templates_dir,
            max_upload_bytes,
        })
    }
}

fn resolve_value(
    arg: Option<&str>,
    env_var_name: &str,
    file: Option<&toml::Value>,
    file_key: &str,
) -> Option<String> {
    // Priority 1: explicit argument
    if let Some(value) = arg {
        return Some(value.to_string());
    }

    // Priority 2: environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    // Priority 3: TOML config file
    file.and_then(|config| config.get(file_key))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

/// Load the platform config file, if present
fn load_config_file() -> Result<toml::Value> {
    let path = dirs::config_dir()
        .map(|d| d.join("pacw").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if !path.exists() {
        return Err(Error::Config(format!("Config file not found: {:?}", path)));
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(err.to_string())
    }
}
