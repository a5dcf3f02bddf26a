use crate::constants::FLOAT_EPSILON;
use crate::types::{CellIndex, MoveDirection};

pub fn select_nearest_cell(cells: &[CellIndex], direction: MoveDirection) -> Option<CellIndex> {
    let mut cells = cells.iter().copied();
    match direction {
        MoveDirection::Left => cells.min_by_key(|cell| (cell.column, cell.row)),
        MoveDirection::Right => cells.max_by_key(|cell| (cell.column, cell.row)),
        MoveDirection::Up => cells.min_by_key(|cell| (cell.row, cell.column)),
        MoveDirection::Down => cells.max_by_key(|cell| (cell.row, cell.column)),
        MoveDirection::None => cells.next(),
    }
}

/// `offset` cells ahead of `cell`, clamped at zero. The result may lie past
/// the bottom or right edge of the maze.
pub fn find_with_offset(cell: CellIndex, direction: MoveDirection, offset: u16) -> CellIndex {
    match direction {
        MoveDirection::Left => CellIndex::new(cell.row, cell.column.saturating_sub(offset)),
        MoveDirection::Right => CellIndex::new(cell.row, cell.column.saturating_add(offset)),
        MoveDirection::Up => CellIndex::new(cell.row.saturating_sub(offset), cell.column),
        MoveDirection::Down => CellIndex::new(cell.row.saturating_add(offset), cell.column),
        MoveDirection::None => cell,
    }
}

pub(super) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= FLOAT_EPSILON
}

pub(super) fn approx_less(a: f32, b: f32) -> bool {
    a < b && !approx_eq(a, b)
}

pub(super) fn approx_greater(a: f32, b: f32) -> bool {
    a > b && !approx_eq(a, b)
}
