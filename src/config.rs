use crate::filter::{CatalogError, FieldCatalog, FilterFieldDescriptor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

const BUILTIN_CATALOGS: [(&str, &str); 4] = [
    ("classes", include_str!("../config/catalogs/classes.toml")),
    ("subjects", include_str!("../config/catalogs/subjects.toml")),
    ("students", include_str!("../config/catalogs/students.toml")),
    ("teachers", include_str!("../config/catalogs/teachers.toml")),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid catalog '{catalog}': {source}")]
    Invalid {
        catalog: String,
        #[source]
        source: CatalogError,
    },
}

/// A named descriptor set for one record shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub name: String,
    /// Fields the free-text search looks at
    #[serde(default)]
    pub search_fields: Vec<String>,
    /// Columns shown in text output; falls back to the field keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FilterFieldDescriptor>,
}

impl CatalogConfig {
    pub fn field_catalog(&self) -> FieldCatalog {
        FieldCatalog::new(self.fields.clone())
    }

    pub fn display_columns(&self) -> Vec<String> {
        if self.columns.is_empty() {
            self.fields.iter().map(|f| f.key.clone()).collect()
        } else {
            self.columns.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field_catalog()
            .validate()
            .map_err(|source| ConfigError::Invalid {
                catalog: self.name.clone(),
                source,
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilterConfig {
    pub catalogs: Vec<CatalogConfig>,
}

impl RecordFilterConfig {
    /// Look up a catalog by name; file-defined catalogs shadow built-ins
    pub fn catalog(&self, name: &str) -> Result<Option<CatalogConfig>, ConfigError> {
        match self.catalogs.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(catalog) => Ok(Some(catalog.clone())),
            None => load_builtin_catalog(name),
        }
    }

    /// Names of every reachable catalog, file-defined first
    pub fn catalog_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.catalogs.iter().map(|c| c.name.clone()).collect();
        for builtin in builtin_catalog_names() {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(builtin)) {
                names.push(builtin.to_string());
            }
        }
        names
    }

    /// Every reachable catalog in `catalog_names` order
    pub fn all_catalogs(&self) -> Result<Vec<CatalogConfig>, ConfigError> {
        let mut catalogs = Vec::new();
        for name in self.catalog_names() {
            if let Some(catalog) = self.catalog(&name)? {
                catalogs.push(catalog);
            }
        }
        Ok(catalogs)
    }

    /// Validate every reachable catalog, built-ins included
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.all_catalogs()?
            .iter()
            .try_for_each(CatalogConfig::validate)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<RecordFilterConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<RecordFilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<RecordFilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static RecordFilterConfig {
    static DEFAULT_CONFIG: LazyLock<RecordFilterConfig> =
        LazyLock::new(RecordFilterConfig::default);
    &DEFAULT_CONFIG
}

pub fn builtin_catalog_names() -> Vec<&'static str> {
    BUILTIN_CATALOGS.iter().map(|(name, _)| *name).collect()
}

/// Load a built-in catalog by name, file name, or repo-relative path
pub fn load_builtin_catalog(name: &str) -> Result<Option<CatalogConfig>, ConfigError> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    BUILTIN_CATALOGS
        .iter()
        .find(|(builtin, _)| builtin.eq_ignore_ascii_case(stem))
        .map(|(builtin, raw)| parse_builtin(builtin, raw))
        .transpose()
}

fn parse_builtin(name: &str, raw: &str) -> Result<CatalogConfig, ConfigError> {
    toml::from_str::<CatalogConfig>(raw).map_err(|source| ConfigError::Parse {
        path: format!("builtin:{name}"),
        source,
    })
}
