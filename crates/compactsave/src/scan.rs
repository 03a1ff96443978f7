use tracing::debug;

use world::{CellCoord, EntityKindDef, KindCatalog, WorldEntity, WorldGrid};

use crate::codec::{
    decode_flora, decode_litter, decode_mineral, encode_flora, encode_litter, encode_mineral,
    ensure_consumed, Archetype, CompactCodecError,
};
use crate::predicates::{is_compact_flora, is_compact_litter, is_compact_mineral};
use crate::registry::KindRegistry;
use crate::restore::{reconstruct_flora, reconstruct_litter, reconstruct_mineral};

/// The three per-archetype byte streams produced by one save scan. The
/// streams carry no cell addresses: position within a stream is the cell
/// index, so encode and decode must walk cells in the same order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EncodedStreams {
    pub minerals: Vec<u8>,
    pub litter: Vec<u8>,
    pub flora: Vec<u8>,
}

/// Save-side scan: visits every cell index in `0..num_cells` in strictly
/// increasing order and invokes each archetype encoder exactly once per
/// cell, absence included.
pub fn encode_world(catalog: &KindCatalog, grid: &WorldGrid) -> EncodedStreams {
    let num_cells = grid.num_cells();
    let mut streams = EncodedStreams {
        // Sentinel-only lower bound; qualifying records grow past this.
        minerals: Vec::with_capacity(num_cells * 2),
        litter: Vec::with_capacity(num_cells * 2),
        flora: Vec::with_capacity(num_cells * 2),
    };

    for cell_index in 0..num_cells {
        let cell = grid.index_to_cell(cell_index);
        encode_mineral(
            &mut streams.minerals,
            find_qualifying(grid, catalog, cell, is_compact_mineral),
        );
        encode_litter(
            &mut streams.litter,
            find_qualifying(grid, catalog, cell, is_compact_litter),
        );
        encode_flora(
            &mut streams.flora,
            find_qualifying(grid, catalog, cell, is_compact_flora),
        );
    }

    debug!(
        cells = num_cells,
        mineral_bytes = streams.minerals.len(),
        litter_bytes = streams.litter.len(),
        flora_bytes = streams.flora.len(),
        "compact_encode_scan_complete"
    );
    streams
}

/// Load-side scan: the mirror of `encode_world`. Each archetype decoder is
/// invoked exactly once per cell index; reconstructed entities come back in
/// scan order. Any decode failure aborts the whole pass.
pub fn decode_world(
    registry: &KindRegistry,
    catalog: &KindCatalog,
    grid: &WorldGrid,
    streams: &EncodedStreams,
) -> Result<Vec<WorldEntity>, CompactCodecError> {
    let num_cells = grid.num_cells();
    let mut mineral_cursor = 0usize;
    let mut litter_cursor = 0usize;
    let mut flora_cursor = 0usize;
    let mut loaded = Vec::new();

    for cell_index in 0..num_cells {
        let cell = grid.index_to_cell(cell_index);

        if let Some(decoded) = decode_mineral(&streams.minerals, &mut mineral_cursor, cell_index)? {
            let (def_index, def) =
                registry.lookup_def(catalog, decoded.kind_id, Archetype::Mineral, cell_index)?;
            loaded.push(reconstruct_mineral(def, def_index, decoded, cell, cell_index)?);
        }

        if let Some(decoded) = decode_litter(&streams.litter, &mut litter_cursor, cell_index)? {
            let (def_index, def) =
                registry.lookup_def(catalog, decoded.kind_id, Archetype::Litter, cell_index)?;
            loaded.push(reconstruct_litter(def, def_index, decoded, cell, cell_index)?);
        }

        if let Some(decoded) = decode_flora(&streams.flora, &mut flora_cursor, cell_index)? {
            let (def_index, def) =
                registry.lookup_def(catalog, decoded.kind_id, Archetype::Flora, cell_index)?;
            loaded.push(reconstruct_flora(def, def_index, decoded, cell, cell_index)?);
        }
    }

    ensure_consumed(&streams.minerals, mineral_cursor, Archetype::Mineral)?;
    ensure_consumed(&streams.litter, litter_cursor, Archetype::Litter)?;
    ensure_consumed(&streams.flora, flora_cursor, Archetype::Flora)?;

    debug!(
        cells = num_cells,
        entities = loaded.len(),
        "compact_decode_scan_complete"
    );
    Ok(loaded)
}

fn find_qualifying<'a>(
    grid: &'a WorldGrid,
    catalog: &'a KindCatalog,
    cell: CellCoord,
    predicate: fn(&EntityKindDef, &WorldEntity) -> bool,
) -> Option<(&'a EntityKindDef, &'a WorldEntity)> {
    let entity = grid.find_at(cell, |candidate| {
        candidate
            .def(catalog)
            .is_some_and(|def| predicate(def, candidate))
    })?;
    entity.def(catalog).map(|def| (def, entity))
}
