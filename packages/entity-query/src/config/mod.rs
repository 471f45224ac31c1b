//! Named-query catalog
//!
//! Resolves logical query names to SQL text. Catalogs are usually loaded from
//! a versioned YAML document:
//!
//! ```yaml
//! version: 1
//! queries:
//!   User.findByStatus: "SELECT id, name FROM users WHERE status = :status"
//!   User.deactivate: "UPDATE users SET status = 'inactive' WHERE id = ?1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{RepositoryError, Result};

/// Supported catalog schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFileV1 {
    /// Schema version (always 1 for v1)
    version: Option<u32>,

    #[serde(default)]
    queries: BTreeMap<String, String>,
}

/// Registry of named queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCatalog {
    queries: BTreeMap<String, String>,
}

impl QueryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from YAML text
    ///
    /// # Errors
    ///
    /// Config error on malformed YAML, a missing or unsupported `version`,
    /// unknown top-level fields, or a blank query name or SQL text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFileV1 = serde_yaml::from_str(yaml)?;

        let version = file.version.ok_or_else(|| {
            RepositoryError::config(
                "Missing 'version' field in catalog. Add 'version: 1' to the top of the file.",
            )
        })?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(RepositoryError::config(format!(
                "Unsupported catalog version {}. Supported versions: {:?}",
                version, SUPPORTED_VERSIONS
            )));
        }

        let mut catalog = Self::new();
        for (name, sql) in file.queries {
            catalog.insert(name, sql)?;
        }

        tracing::debug!(queries = catalog.len(), "loaded query catalog");
        Ok(catalog)
    }

    /// Load a catalog from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::config(format!("Cannot read catalog {}: {}", path.display(), e))
                .with_source(e)
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize as a v1 YAML document
    pub fn to_yaml(&self) -> Result<String> {
        let file = CatalogFileV1 {
            version: Some(1),
            queries: self.queries.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    /// Register (or replace) a named query
    pub fn insert(&mut self, name: impl Into<String>, sql: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        let sql = sql.into();

        if name.trim().is_empty() {
            return Err(RepositoryError::config("query name must not be blank"));
        }
        if sql.trim().is_empty() {
            return Err(RepositoryError::config(format!(
                "query '{}' has blank SQL text",
                name
            )));
        }

        self.queries.insert(name, sql);
        Ok(self)
    }

    /// SQL text registered under `name`
    ///
    /// # Errors
    ///
    /// `ErrorKind::QueryNotFound` if the name is not registered.
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.queries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RepositoryError::query_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }
}
