use world::{EntityKindDef, EntityState, WorldEntity};

/// The single ground-litter def the litter stream handles.
pub const GROUND_LITTER_DEF_NAME: &str = "litter.stone_rubble";

/// Closed allow-list of flora defs eligible for compact encoding. Membership
/// is by def name, not a computed property; adding a species here requires a
/// matching def in the catalog.
const COMPACT_FLORA_DEF_NAMES: &[&str] = &[
    "flora.grass",
    "flora.tall_grass",
    "flora.bush",
    "flora.brambles",
    "flora.dandelion",
    "flora.moss",
    "flora.low_shrub",
    "flora.chokevine",
    "flora.wild_healroot",
    "flora.raspberry",
    "flora.saguaro_cactus",
    "flora.oak_tree",
    "flora.poplar_tree",
    "flora.birch_tree",
    "flora.pine_tree",
    "flora.willow_tree",
    "flora.cypress_tree",
    "flora.maple_tree",
];

// These three predicates are the single source of truth for compact-form
// eligibility. The encoders assert them, and the host's compressibility
// query delegates to their union, so they must accept exactly the entities
// the matching encoder can represent losslessly.

pub fn is_compact_mineral(def: &EntityKindDef, entity: &WorldEntity) -> bool {
    let EntityState::Mineral(mineral) = entity.state else {
        return false;
    };
    // Partial-durability deposits fall back to full serialization; the
    // compact record has no durability field.
    def.save_compressible && (!def.uses_durability || mineral.durability == def.max_durability)
}

pub fn is_compact_litter(def: &EntityKindDef, entity: &WorldEntity) -> bool {
    matches!(entity.state, EntityState::Litter(_)) && def.def_name == GROUND_LITTER_DEF_NAME
}

pub fn is_compact_flora(def: &EntityKindDef, entity: &WorldEntity) -> bool {
    matches!(entity.state, EntityState::Flora(_))
        && COMPACT_FLORA_DEF_NAMES.contains(&def.def_name.as_str())
}

pub fn is_save_compressible(def: &EntityKindDef, entity: &WorldEntity) -> bool {
    is_compact_mineral(def, entity)
        || is_compact_litter(def, entity)
        || is_compact_flora(def, entity)
}

#[cfg(test)]
mod tests {
    use world::{CellCoord, FloraState, KindCategory, KindId, LitterState, MineralState};

    use super::*;

    fn def(
        kind_id: u16,
        def_name: &str,
        category: KindCategory,
        save_compressible: bool,
        uses_durability: bool,
        max_durability: i32,
    ) -> EntityKindDef {
        EntityKindDef {
            kind_id: KindId(kind_id),
            def_name: def_name.to_string(),
            category,
            save_compressible,
            uses_durability,
            max_durability,
        }
    }

    fn entity(state: EntityState) -> WorldEntity {
        WorldEntity {
            def_index: 0,
            instance_id: 1,
            cell: CellCoord { x: 0, y: 0 },
            state,
        }
    }

    #[test]
    fn mineral_requires_full_durability() {
        let granite = def(7, "mineral.granite", KindCategory::Mineral, true, true, 900);
        let full = entity(EntityState::Mineral(MineralState { durability: 900 }));
        let chipped = entity(EntityState::Mineral(MineralState { durability: 899 }));
        assert!(is_compact_mineral(&granite, &full));
        assert!(!is_compact_mineral(&granite, &chipped));
    }

    #[test]
    fn mineral_without_durability_tracking_always_qualifies() {
        let marker = def(8, "mineral.marker", KindCategory::Mineral, true, false, 0);
        let any = entity(EntityState::Mineral(MineralState { durability: -5 }));
        assert!(is_compact_mineral(&marker, &any));
    }

    #[test]
    fn mineral_not_flagged_compressible_is_rejected() {
        let ore = def(9, "mineral.gold_ore", KindCategory::Mineral, false, true, 300);
        let full = entity(EntityState::Mineral(MineralState { durability: 300 }));
        assert!(!is_compact_mineral(&ore, &full));
    }

    #[test]
    fn flora_allow_list_is_by_def_name() {
        let oak = def(42, "flora.oak_tree", KindCategory::Flora, false, true, 150);
        let fern = def(43, "flora.fern", KindCategory::Flora, false, true, 80);
        let plant = entity(EntityState::Flora(FloraState {
            hit_points: 1,
            growth: 0.0,
            age: 0,
            sown: false,
            unlit_ticks: 0,
            made_leafless_tick: world::LEAFLESS_TICK_NONE,
        }));
        assert!(is_compact_flora(&oak, &plant));
        assert!(!is_compact_flora(&fern, &plant));
    }

    #[test]
    fn litter_matches_only_the_designated_def() {
        let rubble = def(12, GROUND_LITTER_DEF_NAME, KindCategory::Litter, false, false, 0);
        let leaves = def(13, "litter.dead_leaves", KindCategory::Litter, false, false, 0);
        let pile = entity(EntityState::Litter(LitterState {
            thickness: 1,
            grow_tick: 0,
        }));
        assert!(is_compact_litter(&rubble, &pile));
        assert!(!is_compact_litter(&leaves, &pile));
    }

    #[test]
    fn predicates_reject_mismatched_state_variants() {
        let granite = def(7, "mineral.granite", KindCategory::Mineral, true, false, 0);
        let not_a_mineral = entity(EntityState::Other);
        assert!(!is_compact_mineral(&granite, &not_a_mineral));
        assert!(!is_save_compressible(&granite, &not_a_mineral));
    }

    #[test]
    fn union_matches_any_single_predicate() {
        let rubble = def(12, GROUND_LITTER_DEF_NAME, KindCategory::Litter, false, false, 0);
        let pile = entity(EntityState::Litter(LitterState {
            thickness: 2,
            grow_tick: 10,
        }));
        assert_eq!(
            is_save_compressible(&rubble, &pile),
            is_compact_litter(&rubble, &pile)
        );
    }
}
