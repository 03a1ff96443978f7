mod blob;
mod defs;
mod entity;
mod grid;

pub use blob::{BlobStore, BlobStoreError, FileBlobStore, MemoryBlobStore};
pub use defs::{CatalogError, EntityKindDef, KindCatalog, KindCategory, KindId};
pub use entity::{
    EntityState, FloraState, LitterState, MineralState, WorldEntity, LEAFLESS_TICK_NONE,
};
pub use grid::{CellCoord, WorldGrid};
