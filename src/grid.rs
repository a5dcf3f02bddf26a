use std::cmp::Ordering;

use crate::config::parse_tiles;
use crate::error::{ConfigError, GridError};
use crate::types::{CellIndex, MapCellType, MapNeighborsInfo, MoveDirection, Region, Vec2};

#[derive(Clone, Debug)]
pub struct Grid {
    rows: u16,
    columns: u16,
    cell_size: u16,
    cells: Vec<MapCellType>,
    left_tunnel_exit: CellIndex,
    right_tunnel_exit: CellIndex,
}

impl Grid {
    pub fn new(
        rows: u16,
        columns: u16,
        cell_size: u16,
        cells: Vec<MapCellType>,
        left_tunnel_exit: CellIndex,
        right_tunnel_exit: CellIndex,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || columns == 0 || cells.is_empty() {
            return Err(ConfigError::EmptyMaze);
        }
        if cells.len() != rows as usize * columns as usize {
            return Err(ConfigError::InvalidValue {
                field: "cells",
                reason: format!("expected {} cells, found {}", rows as usize * columns as usize, cells.len()),
            });
        }
        if cell_size < 2 {
            return Err(ConfigError::InvalidValue {
                field: "cellSize",
                reason: format!("{cell_size} is too small"),
            });
        }
        let grid = Self {
            rows,
            columns,
            cell_size,
            cells,
            left_tunnel_exit,
            right_tunnel_exit,
        };
        grid.require_empty("left tunnel exit", left_tunnel_exit)?;
        grid.require_empty("right tunnel exit", right_tunnel_exit)?;
        Ok(grid)
    }

    pub fn from_tiles<S: AsRef<str>>(
        tiles: &[S],
        cell_size: u16,
        left_tunnel_exit: CellIndex,
        right_tunnel_exit: CellIndex,
    ) -> Result<Self, ConfigError> {
        let parsed = parse_tiles(tiles)?;
        Self::new(
            parsed.rows,
            parsed.columns,
            cell_size,
            parsed.cells,
            left_tunnel_exit,
            right_tunnel_exit,
        )
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn cell_size(&self) -> u16 {
        self.cell_size
    }

    pub fn left_tunnel_exit(&self) -> CellIndex {
        self.left_tunnel_exit
    }

    pub fn right_tunnel_exit(&self) -> CellIndex {
        self.right_tunnel_exit
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        index.row < self.rows && index.column < self.columns
    }

    pub fn get_cell(&self, index: CellIndex) -> Result<MapCellType, GridError> {
        if !self.contains(index) {
            return Err(GridError::OutOfRange {
                cell: index,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(self.cells[index.row as usize * self.columns as usize + index.column as usize])
    }

    pub fn neighbor(&self, index: CellIndex, direction: MoveDirection) -> Option<CellIndex> {
        let next = match direction {
            MoveDirection::Left => CellIndex::new(index.row, index.column.checked_sub(1)?),
            MoveDirection::Right => CellIndex::new(index.row, index.column.checked_add(1)?),
            MoveDirection::Up => CellIndex::new(index.row.checked_sub(1)?, index.column),
            MoveDirection::Down => CellIndex::new(index.row.checked_add(1)?, index.column),
            MoveDirection::None => return None,
        };
        self.contains(next).then_some(next)
    }

    fn neighbor_type(&self, index: CellIndex, direction: MoveDirection) -> MapCellType {
        self.neighbor(index, direction)
            .and_then(|next| self.get_cell(next).ok())
            .unwrap_or(MapCellType::Wall)
    }

    /// Off-grid neighbors are reported as walls.
    pub fn direct_neighbors(&self, index: CellIndex) -> MapNeighborsInfo {
        MapNeighborsInfo {
            left: self.neighbor_type(index, MoveDirection::Left),
            right: self.neighbor_type(index, MoveDirection::Right),
            up: self.neighbor_type(index, MoveDirection::Up),
            down: self.neighbor_type(index, MoveDirection::Down),
        }
    }

    pub fn is_passable(cell_type: MapCellType, direction: MoveDirection) -> bool {
        match cell_type {
            MapCellType::Empty => true,
            MapCellType::Door => direction == MoveDirection::Up,
            MapCellType::Wall => false,
        }
    }

    pub fn find_cells(&self, region: Region) -> Vec<CellIndex> {
        let size = self.cell_size as i32;
        let max_row = self.rows as i32 - 1;
        let max_column = self.columns as i32 - 1;
        let first_column = region.x.div_euclid(size).clamp(0, max_column);
        let last_column = (region.x + region.width.max(1) - 1)
            .div_euclid(size)
            .clamp(0, max_column);
        let first_row = region.y.div_euclid(size).clamp(0, max_row);
        let last_row = (region.y + region.height.max(1) - 1)
            .div_euclid(size)
            .clamp(0, max_row);

        let mut out = Vec::with_capacity(
            ((last_row - first_row + 1) * (last_column - first_column + 1)) as usize,
        );
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                out.push(CellIndex::new(row as u16, column as u16));
            }
        }
        out
    }

    /// Pure arithmetic, also valid for indices past the bottom/right edge.
    pub fn cell_center_pos(&self, index: CellIndex) -> Vec2 {
        let size = self.cell_size as i32;
        Vec2::new(
            index.column as i32 * size + size / 2,
            index.row as i32 * size + size / 2,
        )
    }

    pub fn find_max_available_cell(&self, index: CellIndex, direction: MoveDirection) -> CellIndex {
        let mut current = index;
        while let Some(next) = self.neighbor(current, direction) {
            if self.get_cell(next) != Ok(MapCellType::Empty) {
                break;
            }
            current = next;
        }
        current
    }

    pub fn step_toward_exit(&self, index: CellIndex, exit: CellIndex) -> Option<(MoveDirection, CellIndex)> {
        let sideways = match index.column.cmp(&exit.column) {
            Ordering::Less => Some(MoveDirection::Right),
            Ordering::Greater => Some(MoveDirection::Left),
            Ordering::Equal => None,
        };
        sideways.into_iter().chain([MoveDirection::Up]).find_map(|direction| {
            let next = self.neighbor(index, direction)?;
            let kind = self.get_cell(next).ok()?;
            Self::is_passable(kind, direction).then_some((direction, next))
        })
    }

    pub fn faces_out_of_tunnel(&self, index: CellIndex, direction: MoveDirection) -> bool {
        (index == self.left_tunnel_exit && direction == MoveDirection::Left)
            || (index == self.right_tunnel_exit && direction == MoveDirection::Right)
    }

    /// Opposite exit for an actor sitting fully inside one exit and heading out.
    pub fn tunnel_destination(&self, cells: &[CellIndex], direction: MoveDirection) -> Option<CellIndex> {
        let [cell] = cells else {
            return None;
        };
        if *cell == self.left_tunnel_exit && direction == MoveDirection::Left {
            return Some(self.right_tunnel_exit);
        }
        if *cell == self.right_tunnel_exit && direction == MoveDirection::Right {
            return Some(self.left_tunnel_exit);
        }
        None
    }

    pub(crate) fn require_empty(&self, what: &'static str, cell: CellIndex) -> Result<(), ConfigError> {
        match self.get_cell(cell) {
            Err(_) => Err(ConfigError::CellOutOfRange { what, cell }),
            Ok(MapCellType::Empty) => Ok(()),
            Ok(_) => Err(ConfigError::CellBlocked { what, cell }),
        }
    }
}
