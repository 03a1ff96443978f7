use world::{CellCoord, EntityKindDef, EntityState, WorldEntity};

use crate::codec::{
    Archetype, CompactCodecError, DecodedFlora, DecodedLitter, DecodedMineral,
};

// Reconstruction builds the entity through the def's normal construction
// recipe and then overwrites the decoded fields, so anything the recipe
// initializes that the wire format does not carry keeps its spawn value.
// The returned records are positioned at their cell but not inserted into
// any grid; the post-load spawn step owns that.

pub(crate) fn reconstruct_mineral(
    def: &EntityKindDef,
    def_index: usize,
    decoded: DecodedMineral,
    cell: CellCoord,
    cell_index: usize,
) -> Result<WorldEntity, CompactCodecError> {
    let mut entity = WorldEntity::spawn_from_def(def, def_index, decoded.instance_id, cell);
    let EntityState::Mineral(mineral) = &mut entity.state else {
        return Err(category_mismatch(Archetype::Mineral, def, decoded.kind_id, cell_index));
    };
    // Only full-durability deposits are ever compacted, so the wire carries
    // no durability and restore pins it to the def maximum.
    mineral.durability = def.max_durability;
    Ok(entity)
}

pub(crate) fn reconstruct_litter(
    def: &EntityKindDef,
    def_index: usize,
    decoded: DecodedLitter,
    cell: CellCoord,
    cell_index: usize,
) -> Result<WorldEntity, CompactCodecError> {
    let mut entity = WorldEntity::spawn_from_def(def, def_index, decoded.instance_id, cell);
    let EntityState::Litter(litter) = &mut entity.state else {
        return Err(category_mismatch(Archetype::Litter, def, decoded.kind_id, cell_index));
    };
    litter.thickness = decoded.thickness;
    litter.grow_tick = decoded.grow_tick;
    Ok(entity)
}

pub(crate) fn reconstruct_flora(
    def: &EntityKindDef,
    def_index: usize,
    decoded: DecodedFlora,
    cell: CellCoord,
    cell_index: usize,
) -> Result<WorldEntity, CompactCodecError> {
    let mut entity = WorldEntity::spawn_from_def(def, def_index, decoded.instance_id, cell);
    let EntityState::Flora(flora) = &mut entity.state else {
        return Err(category_mismatch(Archetype::Flora, def, decoded.kind_id, cell_index));
    };
    flora.hit_points = decoded.hit_points;
    // Runtime state must be re-initialized before the saved fields land,
    // mirroring the order of a normal instantiation.
    flora.init_runtime_state();
    flora.growth = decoded.growth;
    flora.age = decoded.age;
    flora.unlit_ticks = decoded.unlit_ticks;
    flora.made_leafless_tick = decoded.made_leafless_tick;
    flora.sown = decoded.sown;
    Ok(entity)
}

fn category_mismatch(
    archetype: Archetype,
    def: &EntityKindDef,
    kind_id: u16,
    cell_index: usize,
) -> CompactCodecError {
    CompactCodecError::KindCategoryMismatch {
        archetype,
        kind_id,
        def_name: def.def_name.clone(),
        cell_index,
    }
}
