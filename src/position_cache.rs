use std::collections::BTreeMap;

use crate::grid::Grid;
use crate::types::{ActorKey, CellIndex, Region};

#[derive(Clone, Debug, Default)]
pub struct PositionCache {
    entries: BTreeMap<ActorKey, Vec<CellIndex>>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells for `key`; `region` is only consulted on the first query of the tick.
    pub fn cells_for(&mut self, key: ActorKey, grid: &Grid, region: Region) -> Vec<CellIndex> {
        self.entries
            .entry(key)
            .or_insert_with(|| grid.find_cells(region))
            .clone()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn invalidate(&mut self, key: ActorKey) {
        self.entries.remove(&key);
    }

    pub fn is_cached(&self, key: ActorKey) -> bool {
        self.entries.contains_key(&key)
    }
}
