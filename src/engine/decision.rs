use super::targets::{chase_target, TargetInput};
use super::utils::approx_less;
use super::*;

fn viable_moves(grid: &Grid, cell: CellIndex, direction: MoveDirection) -> Vec<(MoveDirection, CellIndex)> {
    let neighbors = grid.direct_neighbors(cell);
    MoveDirection::TRAVEL
        .into_iter()
        .filter(|candidate| *candidate != direction.back())
        .filter(|candidate| Grid::is_passable(neighbors.get(*candidate), *candidate))
        .filter_map(|candidate| Some((candidate, grid.neighbor(cell, candidate)?)))
        .collect()
}

/// Distance-minimizing step toward `target`. Ties within float epsilon go to
/// the first candidate in Left, Right, Up, Down order.
pub fn select_best_direction(
    grid: &Grid,
    info: &AiInfo,
    cell: CellIndex,
    direction: MoveDirection,
    target: CellIndex,
) -> Option<(MoveDirection, CellIndex)> {
    let goal = grid.cell_center_pos(target);
    let mut best: Option<(MoveDirection, CellIndex, f32)> = None;
    for (candidate, next) in viable_moves(grid, cell, direction) {
        if info.is_discarded(cell, candidate) {
            continue;
        }
        let distance = grid.cell_center_pos(next).distance(goal);
        if best.map_or(true, |(_, _, closest)| approx_less(distance, closest)) {
            best = Some((candidate, next, distance));
        }
    }
    best.map(|(candidate, next, _)| (candidate, next))
}

impl AiController {
    pub(super) fn find_way(&mut self, id: GhostId, ctx: &mut AiContext<'_>) {
        let ghost = &self.ghosts[id.index()];
        let cell = ghost.actor.cell();
        let direction = ghost.actor.direction();
        let state = ghost.state;
        if !state.is_in_house() && ctx.grid.faces_out_of_tunnel(cell, direction) {
            // Held until the tunnel trigger relocates it.
            return;
        }
        match state {
            GhostState::Wait => self.find_way_on_wait(id, cell, direction, ctx),
            GhostState::LeaveHouse => self.find_way_on_leave_house(id, cell, direction, ctx),
            GhostState::Chase => self.find_way_on_chase(id, cell, direction, ctx),
            GhostState::Scatter => self.find_way_on_scatter(id, cell, direction, ctx),
            GhostState::Frightened => self.find_way_on_frightened(id, cell, direction, ctx),
        }
    }

    fn find_way_on_wait(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        ctx: &mut AiContext<'_>,
    ) {
        let mut direction = if direction.is_horizontal() || direction == MoveDirection::None {
            MoveDirection::Up
        } else {
            direction
        };
        let mut target = ctx.grid.find_max_available_cell(cell, direction);
        if target == cell {
            direction = direction.back();
            target = ctx.grid.find_max_available_cell(cell, direction);
        }
        if target == cell {
            panic!("{} has no room to wait at {cell:?}", id.name());
        }
        let ghost = &mut self.ghosts[id.index()];
        ghost.target_cell = target;
        ghost.actor.move_to(direction, target, ctx.grid);
    }

    fn find_way_on_leave_house(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        ctx: &mut AiContext<'_>,
    ) {
        let exit = self.info.house_exit;
        if cell == exit {
            self.set_state(id, GhostState::Chase, ctx.events);
            self.find_way_on_chase(id, cell, direction, ctx);
            return;
        }

        let Some((step_direction, next)) = ctx.grid.step_toward_exit(cell, exit) else {
            panic!("{} cannot leave the house from {cell:?}", id.name());
        };
        let ghost = &mut self.ghosts[id.index()];
        ghost.target_cell = exit;
        ghost.actor.move_to(step_direction, next, ctx.grid);
    }

    fn find_way_on_chase(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        ctx: &mut AiContext<'_>,
    ) {
        let pacman_cells = ctx.cache.cells_for(ActorKey::Pacman, ctx.grid, ctx.pacman.region());
        let pacman_cell = select_nearest_cell(&pacman_cells, ctx.pacman.direction())
            .unwrap_or_else(|| ctx.pacman.cell());
        let blinky = &self.ghosts[GhostId::Blinky.index()].actor;
        let blinky_cells = ctx
            .cache
            .cells_for(ActorKey::Ghost(GhostId::Blinky), ctx.grid, blinky.region());
        let blinky_cell =
            select_nearest_cell(&blinky_cells, blinky.direction()).unwrap_or_else(|| blinky.cell());

        let input = TargetInput {
            grid: ctx.grid,
            pacman_cell,
            pacman_direction: ctx.pacman.direction(),
            own_cell: cell,
            blinky_cell,
            scatter_cell: self.info.scatter_targets.get(id),
        };
        let target = chase_target(id, &input);
        self.head_toward(id, cell, direction, target, ctx.grid);
    }

    fn find_way_on_scatter(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        ctx: &mut AiContext<'_>,
    ) {
        let target = self.info.scatter_targets.get(id);
        self.head_toward(id, cell, direction, target, ctx.grid);
    }

    fn find_way_on_frightened(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        ctx: &mut AiContext<'_>,
    ) {
        let moves = viable_moves(ctx.grid, cell, direction);
        let Some((step_direction, next)) = self.rng.pick(&moves) else {
            panic!("{} has no viable direction at {cell:?} heading {direction:?}", id.name());
        };
        let ghost = &mut self.ghosts[id.index()];
        ghost.target_cell = next;
        ghost.actor.move_to(step_direction, next, ctx.grid);
    }

    fn head_toward(
        &mut self,
        id: GhostId,
        cell: CellIndex,
        direction: MoveDirection,
        target: CellIndex,
        grid: &Grid,
    ) {
        let Some((step_direction, next)) =
            select_best_direction(grid, &self.info, cell, direction, target)
        else {
            panic!("{} has no viable direction at {cell:?} heading {direction:?}", id.name());
        };
        let ghost = &mut self.ghosts[id.index()];
        ghost.target_cell = target;
        ghost.actor.move_to(step_direction, next, grid);
    }
}
