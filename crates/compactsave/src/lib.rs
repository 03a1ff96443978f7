mod codec;
mod lifecycle;
mod predicates;
mod registry;
mod restore;
mod scan;

pub use codec::{Archetype, CompactCodecError, SENTINEL_KIND_ID};
pub use lifecycle::{
    CompactSaveError, CompactSaver, CompressionConfig, FLORA_BLOB_LABEL, LITTER_BLOB_LABEL,
    MINERAL_BLOB_LABEL,
};
pub use predicates::{
    is_compact_flora, is_compact_litter, is_compact_mineral, is_save_compressible,
    GROUND_LITTER_DEF_NAME,
};
pub use registry::KindRegistry;
pub use scan::{decode_world, encode_world, EncodedStreams};
