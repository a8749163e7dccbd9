use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config;
use crate::error::{OuiError, Result};
use crate::registry::{Registry, RegistryEntry};

/// On-disk cache of the registry: headerless two-column CSV rows of (prefix, manufacturer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RegistryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole cache file. Either every row parses or an error is
    /// returned; a partially filled registry never escapes.
    pub fn load(&self) -> Result<Registry> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(OuiError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(OuiError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut registry = Registry::new();
        for result in reader.records() {
            let record = result.map_err(|e| self.read_error(e))?;
            if record.len() != 2 {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(OuiError::cache_parse(
                    self.location(),
                    line,
                    format!("expected 2 columns, found {}", record.len()),
                ));
            }

            let entry: RegistryEntry = record.deserialize(None).map_err(|e| self.read_error(e))?;
            registry.insert(entry.prefix, entry.manufacturer);
        }

        debug!(path = %self.path.display(), entries = registry.len(), "Loaded OUI cache");
        Ok(registry)
    }

    /// Replace the cache file with a full snapshot of `registry`.
    ///
    /// Rows go to a sibling temp file which is synced and then renamed over the
    /// target, so the previous cache survives any failure.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OuiError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_snapshot(&temp_path, registry) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(OuiError::Write {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), entries = registry.len(), "Saved OUI cache");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| config::CACHE_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_error(&self, err: csv::Error) -> OuiError {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => OuiError::Read {
                path: self.path.clone(),
                source,
            },
            _ => OuiError::cache_parse(self.location(), line, message),
        }
    }
}

fn write_snapshot(path: &Path, registry: &Registry) -> Result<()> {
    let write_error = |source: io::Error| OuiError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_error)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    for (prefix, manufacturer) in registry {
        let entry = RegistryEntry {
            prefix: prefix.clone(),
            manufacturer: manufacturer.clone(),
        };
        writer.serialize(entry).map_err(|e| {
            let message = e.to_string();
            match e.into_kind() {
                csv::ErrorKind::Io(source) => write_error(source),
                _ => write_error(io::Error::other(message)),
            }
        })?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| write_error(e.into_error()))?;
    file.sync_all().map_err(write_error)?;
    Ok(())
}
