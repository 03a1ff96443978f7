use crate::entity::WorldEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

/// Dense 2D cell grid addressed by a row-major index in `0..num_cells`.
/// The index↔coordinate mapping is bijective and shared by every consumer
/// that scans cells in index order.
#[derive(Debug, Default, Clone)]
pub struct WorldGrid {
    width: u32,
    height: u32,
    entities: Vec<WorldEntity>,
    entity_indices_by_cell: Vec<Vec<usize>>,
}

impl WorldGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let num_cells = (width as usize) * (height as usize);
        Self {
            width,
            height,
            entities: Vec::new(),
            entity_indices_by_cell: vec![Vec::new(); num_cells],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_cells(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn index_to_cell(&self, index: usize) -> CellCoord {
        let width = self.width.max(1) as usize;
        CellCoord {
            x: (index % width) as i32,
            y: (index / width) as i32,
        }
    }

    pub fn cell_to_index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Normal placement: stores the entity and updates the per-cell lookup.
    /// Returns false when the entity's cell is out of bounds.
    pub fn place(&mut self, entity: WorldEntity) -> bool {
        let Some(cell_index) = self.cell_to_index(entity.cell) else {
            return false;
        };
        let entity_index = self.entities.len();
        self.entities.push(entity);
        self.entity_indices_by_cell[cell_index].push(entity_index);
        true
    }

    /// Raw insert: stores the entity WITHOUT updating the per-cell lookup.
    /// Used when bulk-inserting reconstructed entities after a load; the
    /// caller must call `rebuild_cell_lookup` before spatial queries.
    pub fn insert_direct(&mut self, entity: WorldEntity) {
        self.entities.push(entity);
    }

    pub fn rebuild_cell_lookup(&mut self) {
        for cell_entities in &mut self.entity_indices_by_cell {
            cell_entities.clear();
        }
        let num_entities = self.entities.len();
        for entity_index in 0..num_entities {
            let cell = self.entities[entity_index].cell;
            if let Some(cell_index) = self.cell_to_index(cell) {
                self.entity_indices_by_cell[cell_index].push(entity_index);
            }
        }
    }

    pub fn entities(&self) -> &[WorldEntity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities_at(&self, cell: CellCoord) -> impl Iterator<Item = &WorldEntity> {
        let indices = self
            .cell_to_index(cell)
            .map(|cell_index| self.entity_indices_by_cell[cell_index].as_slice())
            .unwrap_or(&[]);
        indices.iter().map(move |&entity_index| &self.entities[entity_index])
    }

    pub fn find_at(
        &self,
        cell: CellCoord,
        mut predicate: impl FnMut(&WorldEntity) -> bool,
    ) -> Option<&WorldEntity> {
        self.entities_at(cell).find(|entity| predicate(entity))
    }
}
