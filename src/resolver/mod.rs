pub mod normalize;

use tracing::{debug, error, info, warn};

pub use normalize::normalize_oui;

use crate::config::Config;
use crate::error::{OuiError, Result};
use crate::registry::{Registry, RegistryFetcher, RegistryStore};

/// Resolves MAC text to a manufacturer using the cached registry.
///
/// The registry is loaded lazily on the first lookup and kept until the next
/// refresh. Lookups read the same store the fetcher writes, so a recovery
/// refresh heals the cache the next lookup reads. Callers sharing a resolver
/// across threads must serialize access themselves (e.g. `Mutex<Resolver>`).
pub struct Resolver {
    fetcher: RegistryFetcher,
    registry: Option<Registry>,
}

impl Resolver {
    pub fn new(fetcher: RegistryFetcher) -> Self {
        Resolver {
            fetcher,
            registry: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RegistryFetcher::from_config(config))
    }

    pub fn store(&self) -> &RegistryStore {
        self.fetcher.store()
    }

    /// Look up the manufacturer for the first MAC-like substring in `input`.
    ///
    /// When the cache cannot be loaded a refresh is attempted, but this call
    /// still returns the load error; the next call sees the refreshed cache.
    pub fn lookup(&mut self, input: &str) -> Result<String> {
        let key = normalize_oui(input)?;
        debug!(input, key = %key, "Normalized OUI");

        let registry = self.ensure_loaded()?;
        match registry.get(&key) {
            Some(manufacturer) => Ok(manufacturer.to_string()),
            None => Err(OuiError::Unresolved { key }),
        }
    }

    /// Refresh the cache from the remote registry. The in-memory registry is
    /// dropped so the next lookup reads the new snapshot.
    pub fn refresh(&mut self) -> Result<()> {
        self.fetcher.refresh()?;
        self.registry = None;
        Ok(())
    }

    /// Refresh and report progress through the log instead of a return value.
    pub fn update_database(&mut self) {
        info!("Updating OUI database");
        match self.refresh() {
            Ok(()) => info!(
                path = %self.store().path().display(),
                "OUI database updated successfully"
            ),
            Err(e) => error!("Failed to update OUI database: {}", e),
        }
    }

    fn ensure_loaded(&mut self) -> Result<&Registry> {
        let registry = match self.registry.take() {
            Some(registry) => registry,
            None => self.load_or_recover()?,
        };
        Ok(&*self.registry.insert(registry))
    }

    fn load_or_recover(&self) -> Result<Registry> {
        let store = self.store();
        store.load().inspect_err(|load_error| {
            warn!(
                path = %store.path().display(),
                "OUI cache unusable ({}), refreshing from remote registry",
                load_error
            );
            if let Err(refresh_error) = self.fetcher.refresh() {
                warn!("Recovery refresh failed: {}", refresh_error);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistrySource;
    use crate::test_utils::{FailingSource, SAMPLE_IEEE_CSV, StaticSource, temp_store};
    use std::fs;

    fn resolver_with(store: &RegistryStore, source: Box<dyn RegistrySource>) -> Resolver {
        Resolver::new(RegistryFetcher::new(source, store.clone()))
    }

    #[test]
    fn test_recovery_heals_the_store_lookups_read() {
        let (_dir, store) = temp_store();
        let fetcher = RegistryFetcher::new(Box::new(StaticSource::new(SAMPLE_IEEE_CSV)), store);
        let mut resolver = Resolver::new(fetcher);

        assert!(matches!(resolver.lookup("AA:BB:CC"), Err(OuiError::NotFound { .. })));
        assert!(resolver.store().exists());
        assert_eq!(resolver.lookup("AA:BB:CC").unwrap(), "Acme Corp");
    }

    #[test]
    fn test_from_config_reads_and_writes_one_path() {
        let (_dir, store) = temp_store();
        let config = Config {
            cache_path: store.path().to_path_buf(),
            registry_url: "http://127.0.0.1:1/oui/oui.csv".to_string(),
            fetch_timeout: None,
            max_body_bytes: 1024,
        };

        let resolver = Resolver::from_config(&config);
        assert_eq!(resolver.store().path(), config.cache_path);
    }

    #[test]
    fn test_lookup_found() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "AABBCC,Acme Corp\n286FB9,Juniper Networks\n").unwrap();
        let mut resolver = resolver_with(&store, Box::new(FailingSource));

        assert_eq!(resolver.lookup("AA:BB:CC:DD:EE:FF").unwrap(), "Acme Corp");
        assert_eq!(resolver.lookup("28-6f-b9-00-00-01").unwrap(), "Juniper Networks");
    }

    #[test]
    fn test_lookup_invalid_input() {
        let (_dir, store) = temp_store();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        assert!(matches!(
            resolver.lookup("not a mac at all"),
            Err(OuiError::InvalidInput { .. })
        ));
        // Invalid input never touches the cache
        assert!(!store.exists());
    }

    #[test]
    fn test_lookup_unresolved_leaves_cache_unchanged() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "AABBCC,Acme Corp\n").unwrap();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        match resolver.lookup("11:22:33:44:55:66") {
            Err(OuiError::Unresolved { key }) => assert_eq!(key, "112233"),
            other => panic!("expected unresolved, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "AABBCC,Acme Corp\n");
    }

    #[test]
    fn test_missing_cache_refreshes_but_reports_load_error() {
        let (_dir, store) = temp_store();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        assert!(matches!(
            resolver.lookup("AA:BB:CC:DD:EE:FF"),
            Err(OuiError::NotFound { .. })
        ));
        assert!(store.exists());

        // The next call sees the refreshed cache
        assert_eq!(resolver.lookup("AA:BB:CC:DD:EE:FF").unwrap(), "Acme Corp");
    }

    #[test]
    fn test_malformed_cache_refreshes_but_reports_parse_error() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "AABBCC\n").unwrap();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        assert!(matches!(resolver.lookup("aabbcc"), Err(OuiError::Parse { .. })));
        assert_eq!(store.load().unwrap().get("286FB9"), Some("Juniper Networks"));
        assert_eq!(resolver.lookup("aabbcc").unwrap(), "Acme Corp");
    }

    #[test]
    fn test_failed_recovery_still_reports_load_error() {
        let (_dir, store) = temp_store();
        let mut resolver = resolver_with(&store, Box::new(FailingSource));

        assert!(matches!(resolver.lookup("AABBCC"), Err(OuiError::NotFound { .. })));
        assert!(!store.exists());
        // Still broken, still the original failure class
        assert!(matches!(resolver.lookup("AABBCC"), Err(OuiError::NotFound { .. })));
    }

    #[test]
    fn test_refresh_replaces_loaded_registry() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "AABBCC,Old Name\n").unwrap();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        assert_eq!(resolver.lookup("AABBCC").unwrap(), "Old Name");
        resolver.refresh().unwrap();
        assert_eq!(resolver.lookup("AABBCC").unwrap(), "Acme Corp");
    }

    #[test]
    fn test_update_database_writes_cache() {
        let (_dir, store) = temp_store();
        let mut resolver = resolver_with(&store, Box::new(StaticSource::new(SAMPLE_IEEE_CSV)));

        resolver.update_database();
        assert!(store.exists());
        assert_eq!(resolver.lookup("00:00:5e:00:01:01").unwrap(), "ICANN, IANA Department");
    }

    #[test]
    fn test_update_database_failure_keeps_cache() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "AABBCC,Acme Corp\n").unwrap();
        let mut resolver = resolver_with(&store, Box::new(FailingSource));

        resolver.update_database();
        assert_eq!(resolver.lookup("AABBCC").unwrap(), "Acme Corp");
    }
}
