use tempfile::TempDir;

use crate::error::{OuiError, Result};
use crate::registry::{RegistrySource, RegistryStore};

/// Small slice of the IEEE MA-L CSV, header included
pub const SAMPLE_IEEE_CSV: &str = "Registry,Assignment,Organization Name,Organization Address\n\
    MA-L,286FB9,Juniper Networks,\"1133 Innovation Way Sunnyvale CA US 94089\"\n\
    MA-L,AABBCC,Acme Corp,\"1 Acme Way Springfield US 00000\"\n\
    MA-L,00005E,\"ICANN, IANA Department\",\"Los Angeles CA US 90094\"\n";

/// Serves a fixed body, standing in for the HTTP download
pub struct StaticSource {
    body: Vec<u8>,
}

impl StaticSource {
    pub fn new(body: &str) -> Self {
        StaticSource {
            body: body.as_bytes().to_vec(),
        }
    }
}

impl RegistrySource for StaticSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.body.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Always fails like an unreachable registry host
pub struct FailingSource;

impl RegistrySource for FailingSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        Err(OuiError::network(self.describe(), "connection refused"))
    }

    fn describe(&self) -> String {
        "http://unreachable.invalid/oui/oui.csv".to_string()
    }
}

/// Store pointing at a not-yet-created cache file inside a fresh temp dir.
/// Keep the `TempDir` alive for the duration of the test.
pub fn temp_store() -> (TempDir, RegistryStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = RegistryStore::new(dir.path().join("oui_data.csv"));
    (dir, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_store_starts_empty() {
        let (dir, store) = temp_store();
        assert!(store.path().starts_with(dir.path()));
        assert!(!store.exists());
    }

    #[test]
    fn test_failing_source() {
        assert!(matches!(FailingSource.fetch(), Err(OuiError::Network { .. })));
    }
}
