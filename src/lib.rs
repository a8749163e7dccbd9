//! Resolve MAC addresses to manufacturers using a locally cached copy of the
//! IEEE OUI registry, refreshed from the IEEE on demand.

pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{DataOrigin, OuiError, Result};
pub use registry::{
    HttpSource, Registry, RegistryEntry, RegistryFetcher, RegistrySource, RegistryStore,
};
pub use resolver::{Resolver, normalize_oui};
