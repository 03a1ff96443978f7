use thiserror::Error;
use tracing::info;

use world::{BlobStore, BlobStoreError, KindCatalog, WorldEntity, WorldGrid};

use crate::codec::CompactCodecError;
use crate::predicates;
use crate::registry::KindRegistry;
use crate::scan::{decode_world, encode_world, EncodedStreams};

pub const MINERAL_BLOB_LABEL: &str = "compact_minerals";
pub const LITTER_BLOB_LABEL: &str = "compact_litter";
pub const FLORA_BLOB_LABEL: &str = "compact_flora";

/// Explicit configuration for the compact path; when disabled, every hook
/// reports "not handled" and the host keeps its generic serializer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum CompactSaveError {
    #[error(transparent)]
    Codec(#[from] CompactCodecError),
    #[error(transparent)]
    Store(#[from] BlobStoreError),
    #[error("missing blob '{label}'; save is corrupt or was written without compact encoding")]
    MissingBlob { label: &'static str },
}

/// Boundary the host save/load lifecycle calls into. One instance per world;
/// the host guarantees at most one active save or load at a time, so there
/// is no internal synchronization.
#[derive(Debug, Default)]
pub struct CompactSaver {
    config: CompressionConfig,
    loaded_entities: Vec<WorldEntity>,
}

impl CompactSaver {
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            config,
            loaded_entities: Vec::new(),
        }
    }

    pub fn config(&self) -> CompressionConfig {
        self.config
    }

    /// Host hook: "about to serialize this world's entities". Returns true
    /// when the compact path took over and the host must skip its generic
    /// writer for the covered archetypes.
    pub fn save_world(
        &self,
        catalog: &KindCatalog,
        grid: &WorldGrid,
        store: &mut dyn BlobStore,
    ) -> Result<bool, CompactSaveError> {
        if !self.config.enabled {
            return Ok(false);
        }

        let streams = encode_world(catalog, grid);
        let mineral_bytes = streams.minerals.len();
        let litter_bytes = streams.litter.len();
        let flora_bytes = streams.flora.len();
        store.put(MINERAL_BLOB_LABEL, streams.minerals)?;
        store.put(LITTER_BLOB_LABEL, streams.litter)?;
        store.put(FLORA_BLOB_LABEL, streams.flora)?;

        info!(
            cells = grid.num_cells(),
            mineral_bytes,
            litter_bytes,
            flora_bytes,
            "compact_save_written"
        );
        Ok(true)
    }

    /// Host hook: "about to deserialize this world's entities". Rebuilds the
    /// kind registry, decodes all three blobs in one cell scan, and parks
    /// the reconstructed entities for the post-load spawn step. Returns true
    /// when the compact path took over.
    pub fn load_world(
        &mut self,
        catalog: &KindCatalog,
        grid: &WorldGrid,
        store: &dyn BlobStore,
    ) -> Result<bool, CompactSaveError> {
        if !self.config.enabled {
            return Ok(false);
        }

        let registry = KindRegistry::build(catalog);
        let streams = EncodedStreams {
            minerals: require_blob(store, MINERAL_BLOB_LABEL)?,
            litter: require_blob(store, LITTER_BLOB_LABEL)?,
            flora: require_blob(store, FLORA_BLOB_LABEL)?,
        };
        self.loaded_entities = decode_world(&registry, catalog, grid, &streams)?;

        info!(
            cells = grid.num_cells(),
            entities = self.loaded_entities.len(),
            registered_kinds = registry.len(),
            "compact_load_complete"
        );
        Ok(true)
    }

    /// Post-load spawn handoff. One-shot: the list is cleared on take so a
    /// later load cycle can never double-spawn the same records.
    pub fn take_loaded_entities(&mut self) -> Vec<WorldEntity> {
        std::mem::take(&mut self.loaded_entities)
    }

    /// Override for the host-wide "is this entity eligible for compact
    /// serialization" query. `None` means the compact path is disabled and
    /// the host's own answer stands.
    pub fn is_save_compressible(
        &self,
        catalog: &KindCatalog,
        entity: &WorldEntity,
    ) -> Option<bool> {
        if !self.config.enabled {
            return None;
        }
        let eligible = entity
            .def(catalog)
            .is_some_and(|def| predicates::is_save_compressible(def, entity));
        Some(eligible)
    }
}

fn require_blob(store: &dyn BlobStore, label: &'static str) -> Result<Vec<u8>, CompactSaveError> {
    store
        .get(label)?
        .ok_or(CompactSaveError::MissingBlob { label })
}
