use std::collections::HashMap;

use tracing::warn;

use world::{EntityKindDef, KindCatalog};

use crate::codec::{Archetype, CompactCodecError};

/// Per-load resolution table from the 16-bit wire id to a catalog def.
/// Built fresh at the start of every load and discarded after; it must not
/// outlive the catalog snapshot it was built from.
///
/// Wire ids are not guaranteed unique across the catalog. Registration
/// follows catalog enumeration order and the last def registered for an id
/// wins, which keeps the wire format stable at the cost of shadowing the
/// earlier def.
#[derive(Debug, Default)]
pub struct KindRegistry {
    def_indices_by_kind_id: HashMap<u16, usize>,
}

impl KindRegistry {
    pub fn build(catalog: &KindCatalog) -> Self {
        let mut def_indices_by_kind_id = HashMap::with_capacity(catalog.kind_defs().len());
        for (def_index, def) in catalog.kind_defs().iter().enumerate() {
            if let Some(previous_index) = def_indices_by_kind_id.insert(def.kind_id.0, def_index) {
                let shadowed = catalog
                    .def(previous_index)
                    .map(|previous| previous.def_name.as_str())
                    .unwrap_or("<unknown>");
                warn!(
                    kind_id = def.kind_id.0,
                    winner = %def.def_name,
                    shadowed = %shadowed,
                    "kind_id_collision_last_def_wins"
                );
            }
        }
        Self {
            def_indices_by_kind_id,
        }
    }

    /// Resolves a decoded wire id. An id absent from the registry means a
    /// version mismatch or a corrupt save; the load must abort.
    pub fn lookup_def<'a>(
        &self,
        catalog: &'a KindCatalog,
        kind_id: u16,
        archetype: Archetype,
        cell_index: usize,
    ) -> Result<(usize, &'a EntityKindDef), CompactCodecError> {
        let unknown = || CompactCodecError::UnknownKindId {
            archetype,
            kind_id,
            cell_index,
        };
        let def_index = *self
            .def_indices_by_kind_id
            .get(&kind_id)
            .ok_or_else(unknown)?;
        let def = catalog.def(def_index).ok_or_else(unknown)?;
        Ok((def_index, def))
    }

    pub fn len(&self) -> usize {
        self.def_indices_by_kind_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.def_indices_by_kind_id.is_empty()
    }
}
