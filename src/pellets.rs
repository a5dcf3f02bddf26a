use std::collections::BTreeMap;

use crate::config::parse_tiles;
use crate::error::ConfigError;
use crate::types::{CellIndex, DotType};

#[derive(Clone, Debug, Default)]
pub struct Pellets {
    dots: BTreeMap<CellIndex, DotType>,
    total: usize,
    eaten: usize,
}

impl Pellets {
    pub fn new(dots: impl IntoIterator<Item = (CellIndex, DotType)>) -> Self {
        let dots: BTreeMap<_, _> = dots.into_iter().collect();
        Self {
            total: dots.len(),
            dots,
            eaten: 0,
        }
    }

    pub fn from_tiles<S: AsRef<str>>(tiles: &[S]) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_tiles(tiles)?.dots))
    }

    pub fn eat(&mut self, cell: CellIndex) -> Option<DotType> {
        let kind = self.dots.remove(&cell)?;
        self.eaten += 1;
        Some(kind)
    }

    pub fn has(&self, cell: CellIndex) -> bool {
        self.dots.contains_key(&cell)
    }

    pub fn eaten_count(&self) -> usize {
        self.eaten
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.dots.len()
    }

    pub fn is_cleared(&self) -> bool {
        self.dots.is_empty()
    }
}
