use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{OuiError, Result};

pub const DEFAULT_REGISTRY_URL: &str = "http://standards-oui.ieee.org/oui/oui.csv";
pub const CACHE_FILE_NAME: &str = "oui_data.csv";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 50_000_000; // 50MB

const CACHE_PATH_VAR: &str = "OUI_CACHE_PATH";
const REGISTRY_URL_VAR: &str = "OUI_REGISTRY_URL";
const FETCH_TIMEOUT_VAR: &str = "OUI_FETCH_TIMEOUT_SECS";
const MAX_BODY_BYTES_VAR: &str = "OUI_MAX_BODY_BYTES";

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache_path: PathBuf,
    pub registry_url: String,
    /// No timeout when `None`; a stalled endpoint blocks the caller.
    pub fetch_timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_cache_path(None)
    }

    /// Like [`Config::from_env`], but an explicit cache path wins over
    /// `OUI_CACHE_PATH` and the default location. The path is used as given,
    /// without a round trip through UTF-8.
    pub fn from_env_with_cache_path(cache_path: Option<PathBuf>) -> Result<Self> {
        let cache_path = cache_path.or_else(|| {
            env::var_os(CACHE_PATH_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self::resolve(|key| env::var(key).ok(), cache_path)
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for every key the lookup does not provide. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, None)
    }

    fn resolve<F>(lookup: F, cache_path: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_path = cache_path
            .or_else(|| non_empty(&lookup, CACHE_PATH_VAR).map(PathBuf::from));
        let cache_path = match cache_path {
            Some(path) => path,
            None => default_cache_path()?,
        };

        let registry_url = non_empty(&lookup, REGISTRY_URL_VAR)
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        let fetch_timeout = match non_empty(&lookup, FETCH_TIMEOUT_VAR) {
            Some(raw) => Some(Duration::from_secs(parse_number(FETCH_TIMEOUT_VAR, &raw)?)),
            None => None,
        };

        let max_body_bytes = match non_empty(&lookup, MAX_BODY_BYTES_VAR) {
            Some(raw) => parse_number(MAX_BODY_BYTES_VAR, &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Config {
            cache_path,
            registry_url,
            fetch_timeout,
            max_body_bytes,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// `<per-user config root>/oui_data.csv`
pub fn default_cache_path() -> Result<PathBuf> {
    let config_root = dirs::config_dir()
        .ok_or_else(|| OuiError::configuration("Could not determine user config directory"))?;
    Ok(cache_path_in(config_root))
}

pub fn cache_path_in(config_root: impl Into<PathBuf>) -> PathBuf {
    config_root.into().join(CACHE_FILE_NAME)
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| {
            OuiError::configuration(format!("{} must be a whole number ({:?}): {}", key, raw, e))
        })
}
