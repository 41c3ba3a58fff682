//! Versioned schema sources.
//!
//! Schemas are laid out on disk as `<root>/<version>/<module>.json`, each file
//! being either a bare ABI array or a build artifact carrying an `abi` key.

use modlogs_core::error::RegistryError;
use std::path::{Path, PathBuf};

use crate::abi::AbiRegistry;

/// Loads the registry for a named module at a given release version.
pub trait SchemaSource: Send + Sync {
    fn load(&self, version: &str, module: &str) -> Result<AbiRegistry, RegistryError>;

    /// Versions this source can serve, sorted ascending.
    fn versions(&self) -> Result<Vec<String>, RegistryError> {
        Ok(Vec::new())
    }
}

/// Directory-backed schema source.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    root: PathBuf,
}

impl FileSchemaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the schema file for `module` at `version`.
    pub fn schema_path(&self, version: &str, module: &str) -> PathBuf {
        self.root.join(version).join(format!("{module}.json"))
    }

    /// Module names available for `version`, sorted.
    pub fn modules(&self, version: &str) -> Result<Vec<String>, RegistryError> {
        let dir = self.root.join(version);
        let mut modules = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    modules.push(stem.to_string());
                }
            }
        }
        modules.sort();
        Ok(modules)
    }
}

impl SchemaSource for FileSchemaSource {
    fn load(&self, version: &str, module: &str) -> Result<AbiRegistry, RegistryError> {
        let path = self.schema_path(version, module);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::SchemaNotFound {
                    module: module.to_string(),
                    version: version.to_string(),
                });
            }
            Err(e) => return Err(RegistryError::Io(e)),
        };

        let registry = AbiRegistry::from_abi_json(&content)?.with_label(module, version);
        tracing::info!(
            module,
            version,
            path = %path.display(),
            entries = registry.len(),
            "loaded schema"
        );
        Ok(registry)
    }

    fn versions(&self) -> Result<Vec<String>, RegistryError> {
        let mut versions = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    versions.push(name.to_string());
                }
            }
        }
        versions.sort();
        Ok(versions)
    }
}
