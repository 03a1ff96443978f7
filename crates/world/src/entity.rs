use crate::defs::{EntityKindDef, KindCatalog, KindCategory};
use crate::grid::CellCoord;

/// Sentinel for "flora has never been made leafless"; also the decoded
/// default when the optional flora tail is absent from a compact record.
pub const LEAFLESS_TICK_NONE: i32 = -99999;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MineralState {
    pub durability: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitterState {
    pub thickness: u8,
    pub grow_tick: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloraState {
    pub hit_points: i32,
    pub growth: f32,
    pub age: i32,
    pub sown: bool,
    pub unlit_ticks: i32,
    pub made_leafless_tick: i32,
}

impl FloraState {
    /// Resets the per-instance runtime fields to their fresh-sprout values.
    /// Restoration of saved flora must run this before applying decoded
    /// fields, matching the order of a normal instantiation.
    pub fn init_runtime_state(&mut self) {
        self.sown = false;
        self.unlit_ticks = 0;
        self.made_leafless_tick = LEAFLESS_TICK_NONE;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityState {
    Mineral(MineralState),
    Litter(LitterState),
    Flora(FloraState),
    Other,
}

/// A live entity record. `def_index` points into the catalog the entity was
/// spawned from; `instance_id` is the host-assigned identity that must
/// survive a save/load round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldEntity {
    pub def_index: usize,
    pub instance_id: i32,
    pub cell: CellCoord,
    pub state: EntityState,
}

impl WorldEntity {
    /// Construction recipe: builds the concrete state variant the def's
    /// category calls for, with that category's fresh defaults. The record
    /// is positioned at `cell` directly, with no placement side effects;
    /// spatial-lookup maintenance is the grid's job once the entity is
    /// handed to it.
    pub fn spawn_from_def(
        def: &EntityKindDef,
        def_index: usize,
        instance_id: i32,
        cell: CellCoord,
    ) -> Self {
        let state = match def.category {
            KindCategory::Mineral => EntityState::Mineral(MineralState {
                durability: def.max_durability,
            }),
            KindCategory::Litter => EntityState::Litter(LitterState {
                thickness: 1,
                grow_tick: 0,
            }),
            KindCategory::Flora => EntityState::Flora(FloraState {
                hit_points: def.max_durability,
                growth: 0.0,
                age: 0,
                sown: false,
                unlit_ticks: 0,
                made_leafless_tick: LEAFLESS_TICK_NONE,
            }),
            KindCategory::Other => EntityState::Other,
        };
        Self {
            def_index,
            instance_id,
            cell,
            state,
        }
    }

    pub fn def<'a>(&self, catalog: &'a KindCatalog) -> Option<&'a EntityKindDef> {
        catalog.def(self.def_index)
    }
}
