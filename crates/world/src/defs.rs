use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum KindCategory {
    Mineral,
    Litter,
    Flora,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityKindDef {
    pub kind_id: KindId,
    pub def_name: String,
    pub category: KindCategory,
    pub save_compressible: bool,
    pub uses_durability: bool,
    pub max_durability: i32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read def file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse def file {path} at {json_path}: {message}")]
    ParseDefs {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("kind id 0 is reserved for the empty-cell sentinel; def '{def_name}' may not use it")]
    ReservedKindId { def_name: String },
    #[error("duplicate def name '{def_name}' in catalog")]
    DuplicateDefName { def_name: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KindDefFile {
    kind_defs: Vec<KindDefEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KindDefEntry {
    kind_id: u16,
    def_name: String,
    category: KindCategory,
    #[serde(default)]
    save_compressible: bool,
    #[serde(default)]
    uses_durability: bool,
    #[serde(default)]
    max_durability: i32,
}

/// Read-only enumeration of every known entity kind. Catalog order is the
/// order the defs were supplied in; kind ids are not required to be unique,
/// but def names are, and kind id 0 is rejected outright.
#[derive(Debug, Default, Clone)]
pub struct KindCatalog {
    kind_defs: Vec<EntityKindDef>,
    def_indices_by_name: HashMap<String, usize>,
}

impl KindCatalog {
    pub fn from_defs(kind_defs: Vec<EntityKindDef>) -> Result<Self, CatalogError> {
        let mut def_indices_by_name = HashMap::with_capacity(kind_defs.len());
        for (index, def) in kind_defs.iter().enumerate() {
            if def.kind_id.0 == 0 {
                return Err(CatalogError::ReservedKindId {
                    def_name: def.def_name.clone(),
                });
            }
            if def_indices_by_name
                .insert(def.def_name.clone(), index)
                .is_some()
            {
                return Err(CatalogError::DuplicateDefName {
                    def_name: def.def_name.clone(),
                });
            }
        }
        Ok(Self {
            kind_defs,
            def_indices_by_name,
        })
    }

    pub fn load_from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse_defs_json(&raw, path)?;
        info!(
            path = %path.display(),
            kind_defs = catalog.kind_defs.len(),
            "kind_catalog_loaded"
        );
        Ok(catalog)
    }

    pub fn parse_defs_json(raw: &str, path: &Path) -> Result<Self, CatalogError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: KindDefFile = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| CatalogError::ParseDefs {
                path: path.to_path_buf(),
                json_path: error.path().to_string(),
                message: error.into_inner().to_string(),
            })?;

        let kind_defs = file
            .kind_defs
            .into_iter()
            .map(|entry| EntityKindDef {
                kind_id: KindId(entry.kind_id),
                def_name: entry.def_name,
                category: entry.category,
                save_compressible: entry.save_compressible,
                uses_durability: entry.uses_durability,
                max_durability: entry.max_durability,
            })
            .collect();
        Self::from_defs(kind_defs)
    }

    pub fn kind_defs(&self) -> &[EntityKindDef] {
        &self.kind_defs
    }

    pub fn def(&self, def_index: usize) -> Option<&EntityKindDef> {
        self.kind_defs.get(def_index)
    }

    pub fn def_index_by_name(&self, name: &str) -> Option<usize> {
        self.def_indices_by_name.get(name).copied()
    }

    pub fn def_by_name(&self, name: &str) -> Option<&EntityKindDef> {
        self.def_index_by_name(name)
            .and_then(|index| self.kind_defs.get(index))
    }
}
