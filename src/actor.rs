use crate::grid::Grid;
use crate::types::{CellIndex, MoveDirection, Region, Vec2};

#[derive(Clone, Debug)]
pub struct Actor {
    position: Vec2,
    direction: MoveDirection,
    speed: f32,
    cell_size: u16,
    target: Option<Vec2>,
    target_cell: Option<CellIndex>,
    move_buffer: f32,
}

impl Actor {
    pub fn new(start_cell: CellIndex, direction: MoveDirection, speed: f32, grid: &Grid) -> Self {
        Self {
            position: grid.cell_center_pos(start_cell),
            direction,
            speed,
            cell_size: grid.cell_size(),
            target: None,
            target_cell: None,
            move_buffer: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: MoveDirection) {
        self.direction = direction;
    }

    pub fn target_cell(&self) -> Option<CellIndex> {
        self.target_cell
    }

    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    pub fn cell(&self) -> CellIndex {
        let size = self.cell_size as i32;
        CellIndex::new(
            (self.position.y.max(0) / size) as u16,
            (self.position.x.max(0) / size) as u16,
        )
    }

    pub fn region(&self) -> Region {
        let size = self.cell_size as i32;
        Region {
            x: self.position.x - size / 2,
            y: self.position.y - size / 2,
            width: size,
            height: size,
        }
    }

    pub fn move_to(&mut self, direction: MoveDirection, target_cell: CellIndex, grid: &Grid) {
        self.direction = direction;
        self.target = Some(grid.cell_center_pos(target_cell));
        self.target_cell = Some(target_cell);
    }

    pub fn stop(&mut self) {
        self.target = None;
        self.target_cell = None;
    }

    pub fn translate(&mut self, cell: CellIndex, grid: &Grid) {
        self.position = grid.cell_center_pos(cell);
        self.stop();
        self.move_buffer = 0.0;
    }

    /// Advances toward the target. Returns `true` on the update the target is
    /// reached; pixels left over after arrival stay in the buffer.
    pub fn update(&mut self, dt_ms: u64) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        self.move_buffer += self.speed * self.cell_size as f32 * dt_ms as f32 / 1000.0;
        let step = self.move_buffer.floor() as i32;
        self.move_buffer -= step as f32;

        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let remaining = dx.abs() + dy.abs();
        if step >= remaining {
            self.position = target;
            self.move_buffer += (step - remaining) as f32;
            self.stop();
            return true;
        }

        let along_x = step.min(dx.abs());
        self.position.x += along_x * dx.signum();
        self.position.y += (step - along_x).min(dy.abs()) * dy.signum();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_tiles(&["    ", "    "], 10, CellIndex::new(0, 0), CellIndex::new(0, 3))
            .expect("valid grid")
    }

    #[test]
    fn reaches_target_and_reports_arrival_once() {
        let grid = grid();
        // 5 cells/s at 10 px per cell is 50 px/s, so 5 px per 100 ms.
        let mut actor = Actor::new(CellIndex::new(0, 0), MoveDirection::None, 5.0, &grid);
        actor.move_to(MoveDirection::Right, CellIndex::new(0, 1), &grid);
        assert!(actor.is_moving());

        assert!(!actor.update(100));
        assert_eq!(actor.position(), Vec2::new(10, 5));
        assert_eq!(actor.region().x, 5);

        assert!(actor.update(100));
        assert_eq!(actor.position(), Vec2::new(15, 5));
        assert_eq!(actor.cell(), CellIndex::new(0, 1));
        assert!(!actor.is_moving());
        assert!(!actor.update(100));
    }

    #[test]
    fn fractional_movement_accumulates() {
        let grid = grid();
        // 1 px per 100 ms at this speed: 16 ms ticks must not lose motion.
        let mut actor = Actor::new(CellIndex::new(0, 0), MoveDirection::None, 1.0, &grid);
        actor.move_to(MoveDirection::Down, CellIndex::new(1, 0), &grid);
        for _ in 0..4 {
            actor.update(20);
        }
        assert_eq!(actor.position(), Vec2::new(5, 5));
        actor.update(20);
        actor.update(20);
        assert_eq!(actor.position(), Vec2::new(5, 6));

        let arrived = (0..60).any(|_| actor.update(20));
        assert!(arrived);
        assert_eq!(actor.position(), Vec2::new(5, 15));
    }

    #[test]
    fn translate_clears_target_and_centers() {
        let grid = grid();
        let mut actor = Actor::new(CellIndex::new(0, 0), MoveDirection::Left, 5.0, &grid);
        actor.move_to(MoveDirection::Right, CellIndex::new(0, 1), &grid);
        actor.update(100);
        assert_eq!(actor.position(), Vec2::new(10, 5));

        actor.translate(CellIndex::new(0, 3), &grid);
        assert!(!actor.is_moving());
        assert_eq!(actor.position(), Vec2::new(35, 5));
        assert_eq!(actor.target_cell(), None);
        assert_eq!(actor.cell(), CellIndex::new(0, 3));
        assert_eq!(actor.direction(), MoveDirection::Right);
    }
}
