use crate::constants::{CLYDE_CHASE_DISTANCE, INKY_TARGET_OFFSET, PINKY_TARGET_OFFSET};
use crate::grid::Grid;
use crate::types::{CellIndex, GhostId, MoveDirection};

use super::utils::{approx_greater, find_with_offset};

pub(super) struct TargetInput<'a> {
    pub grid: &'a Grid,
    pub pacman_cell: CellIndex,
    pub pacman_direction: MoveDirection,
    pub own_cell: CellIndex,
    pub blinky_cell: CellIndex,
    pub scatter_cell: CellIndex,
}

type TargetFn = fn(&TargetInput<'_>) -> CellIndex;

const CHASE_TARGETS: [TargetFn; 4] = [blinky_target, pinky_target, inky_target, clyde_target];

pub(super) fn chase_target(id: GhostId, input: &TargetInput<'_>) -> CellIndex {
    CHASE_TARGETS[id.index()](input)
}

fn blinky_target(input: &TargetInput<'_>) -> CellIndex {
    input.pacman_cell
}

fn pinky_target(input: &TargetInput<'_>) -> CellIndex {
    find_with_offset(input.pacman_cell, input.pacman_direction, PINKY_TARGET_OFFSET)
}

fn inky_target(input: &TargetInput<'_>) -> CellIndex {
    let pivot = find_with_offset(input.pacman_cell, input.pacman_direction, INKY_TARGET_OFFSET);
    let mirror = |pivot: u16, blinky: u16| {
        let value = 2 * (pivot as i32 - blinky as i32) + blinky as i32;
        value.clamp(0, u16::MAX as i32) as u16
    };
    CellIndex::new(
        mirror(pivot.row, input.blinky_cell.row),
        mirror(pivot.column, input.blinky_cell.column),
    )
}

fn clyde_target(input: &TargetInput<'_>) -> CellIndex {
    let grid = input.grid;
    let pixels = grid
        .cell_center_pos(input.own_cell)
        .distance(grid.cell_center_pos(input.pacman_cell));
    let cells = pixels / grid.cell_size() as f32;
    if approx_greater(cells, CLYDE_CHASE_DISTANCE) {
        input.pacman_cell
    } else {
        input.scatter_cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> Grid {
        let row = " ".repeat(20);
        let tiles = vec![row; 20];
        Grid::from_tiles(&tiles, 16, CellIndex::new(0, 0), CellIndex::new(0, 19)).expect("valid grid")
    }

    fn make_input(grid: &Grid, pacman_cell: CellIndex, pacman_direction: MoveDirection) -> TargetInput<'_> {
        TargetInput {
            grid,
            pacman_cell,
            pacman_direction,
            own_cell: CellIndex::new(10, 10),
            blinky_cell: CellIndex::new(10, 10),
            scatter_cell: CellIndex::new(19, 0),
        }
    }

    #[test]
    fn blinky_targets_pacman_directly() {
        let grid = open_grid();
        let input = make_input(&grid, CellIndex::new(3, 4), MoveDirection::Right);
        assert_eq!(chase_target(GhostId::Blinky, &input), CellIndex::new(3, 4));
    }

    #[test]
    fn pinky_target_clamps_at_the_grid_edge() {
        let grid = open_grid();
        let input = make_input(&grid, CellIndex::new(5, 1), MoveDirection::Left);
        assert_eq!(chase_target(GhostId::Pinky, &input), CellIndex::new(5, 0));

        let input = make_input(&grid, CellIndex::new(5, 1), MoveDirection::Down);
        assert_eq!(chase_target(GhostId::Pinky, &input), CellIndex::new(9, 1));
    }

    #[test]
    fn inky_mirrors_through_blinky_and_clamps_low() {
        let grid = open_grid();
        let mut target_input = make_input(&grid, CellIndex::new(6, 6), MoveDirection::Right);
        target_input.blinky_cell = CellIndex::new(4, 5);
        // pivot (6, 8): row 2*(6-4)+4 = 8, column 2*(8-5)+5 = 11.
        assert_eq!(chase_target(GhostId::Inky, &target_input), CellIndex::new(8, 11));

        target_input.blinky_cell = CellIndex::new(15, 15);
        assert_eq!(chase_target(GhostId::Inky, &target_input), CellIndex::new(0, 1));
    }

    #[test]
    fn clyde_scatters_at_exactly_eight_cells() {
        let grid = open_grid();
        let mut target_input = make_input(&grid, CellIndex::new(10, 2), MoveDirection::Left);
        assert_eq!(chase_target(GhostId::Clyde, &target_input), CellIndex::new(19, 0));

        target_input.pacman_cell = CellIndex::new(10, 1);
        assert_eq!(chase_target(GhostId::Clyde, &target_input), CellIndex::new(10, 1));

        target_input.pacman_cell = CellIndex::new(12, 12);
        assert_eq!(chase_target(GhostId::Clyde, &target_input), CellIndex::new(19, 0));
    }
}
