use std::io::Read;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{Config, DEFAULT_MAX_BODY_BYTES};
use crate::error::{OuiError, Result};
use crate::registry::{Registry, RegistryStore};

/// Where the authoritative registry table comes from.
pub trait RegistrySource {
    /// Return the raw body of the remote registry table.
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable origin used in logs and errors.
    fn describe(&self) -> String;
}

/// Downloads the IEEE MA-L CSV over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Option<Duration>,
    max_body_bytes: u64,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        HttpSource {
            url: url.into(),
            timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registry_url.clone())
            .with_timeout(config.fetch_timeout)
            .with_max_body_bytes(config.max_body_bytes)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RegistrySource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        // reqwest's blocking client defaults to a 30s timeout; only apply one when configured
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| OuiError::network(&self.url, e.to_string()))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| OuiError::network(&self.url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(OuiError::network(
                &self.url,
                format!("HTTP {}", response.status()),
            ));
        }

        // Read one byte past the limit to tell "exactly at limit" from "truncated"
        let mut body = Vec::new();
        response
            .take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| OuiError::network(&self.url, e.to_string()))?;

        if body.len() as u64 > self.max_body_bytes {
            return Err(OuiError::network(
                &self.url,
                format!("response exceeds {} byte limit", self.max_body_bytes),
            ));
        }

        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Rebuilds the local cache from a [`RegistrySource`].
pub struct RegistryFetcher {
    source: Box<dyn RegistrySource>,
    store: RegistryStore,
}

impl RegistryFetcher {
    pub fn new(source: Box<dyn RegistrySource>, store: RegistryStore) -> Self {
        RegistryFetcher { source, store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(HttpSource::from_config(config)),
            RegistryStore::new(config.cache_path.clone()),
        )
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// Download and parse the remote table without touching the cache.
    pub fn fetch_registry(&self) -> Result<Registry> {
        let origin = self.source.describe();
        info!(source = %origin, "Fetching latest OUI database");

        let body = self.source.fetch()?;
        debug!(source = %origin, bytes = body.len(), "Downloaded OUI database");

        parse_ieee_csv(&origin, &body)
    }

    /// Replace the cache with a fresh snapshot of the remote registry.
    /// The cache file is only written once the full table has parsed.
    pub fn refresh(&self) -> Result<()> {
        let registry = self.fetch_registry()?;
        self.store.save(&registry)?;
        info!(
            path = %self.store.path().display(),
            entries = registry.len(),
            "OUI database updated"
        );
        Ok(())
    }
}

/// Parse the IEEE OUI CSV.
/// Columns: Registry, Assignment (6-char hex), Organization Name, Organization Address
pub fn parse_ieee_csv(origin: &str, content: &[u8]) -> Result<Registry> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let mut registry = Registry::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            OuiError::remote_parse(origin, line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 3 {
            return Err(OuiError::remote_parse(
                origin,
                line,
                format!("expected at least 3 columns, found {}", record.len()),
            ));
        }

        let assignment = record.get(1).unwrap_or("").trim();
        let org_name = record.get(2).unwrap_or("").trim();
        if assignment.is_empty() {
            return Err(OuiError::remote_parse(origin, line, "empty OUI assignment"));
        }

        registry.insert(assignment.to_uppercase(), org_name);
    }

    if registry.is_empty() {
        return Err(OuiError::remote_parse(origin, 0, "registry table has no entries"));
    }

    debug!(source = %origin, entries = registry.len(), "Parsed IEEE OUI entries");
    Ok(registry)
}
