pub mod fetcher;
pub mod store;

use std::collections::HashMap;
use std::collections::hash_map;

use serde::{Deserialize, Serialize};

pub use fetcher::{HttpSource, RegistryFetcher, RegistrySource};
pub use store::RegistryStore;

/// One row of the registry: canonical OUI prefix and the organization it is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// 6 uppercase hex characters, no separators
    pub prefix: String,
    pub manufacturer: String,
}

/// Mapping of canonical OUI prefix to manufacturer name.
/// Always replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, manufacturer: impl Into<String>) {
        self.entries.insert(prefix.into(), manufacturer.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Registry {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
