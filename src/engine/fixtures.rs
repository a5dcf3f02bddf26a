use crate::config::{DirectionDiscard, LevelConfig, PerGhost};

use super::*;

pub(super) struct TestHost {
    pub grid: Grid,
    pub cache: PositionCache,
    pub pacman: Actor,
    pub pellets: Pellets,
    pub events: Vec<GameEvent>,
    pub ai: AiController,
}

impl AiHost for TestHost {
    fn split(&mut self) -> (&mut AiController, AiContext<'_>) {
        (
            &mut self.ai,
            AiContext {
                grid: &self.grid,
                cache: &mut self.cache,
                pacman: &self.pacman,
                pellets: &self.pellets,
                events: &mut self.events,
            },
        )
    }

    fn pellets(&self) -> &Pellets {
        &self.pellets
    }
}

impl TestHost {
    pub fn classic(seed: u64) -> Self {
        let level = LevelConfig::classic().expect("classic level");
        let grid = level.build_grid().expect("classic grid");
        let info = AiInfo::classic().expect("classic ai");
        let pellets = Pellets::from_tiles(&level.tiles).expect("classic pellets");
        let pacman = Actor::new(
            level.pacman.start_cell,
            level.pacman.start_direction,
            level.pacman.speed,
            &grid,
        );
        let ai = AiController::new(info, &grid, seed);
        Self {
            grid,
            cache: PositionCache::new(),
            pacman,
            pellets,
            events: Vec::new(),
            ai,
        }
    }

    pub fn with_grid(grid: Grid, info: AiInfo, pacman_cell: CellIndex, seed: u64) -> Self {
        let pacman = Actor::new(pacman_cell, MoveDirection::None, 1.0, &grid);
        let ai = AiController::new(info, &grid, seed);
        Self {
            grid,
            cache: PositionCache::new(),
            pacman,
            pellets: Pellets::default(),
            events: Vec::new(),
            ai,
        }
    }

    pub fn update_ai(&mut self, dt_ms: u64) {
        self.cache.reset();
        let (ai, mut ctx) = self.split();
        ai.update(dt_ms, &mut ctx);
    }

    pub fn place_ghost(&mut self, id: GhostId, cell: CellIndex, direction: MoveDirection) {
        let actor = &mut self.ai.ghosts[id.index()].actor;
        actor.translate(cell, &self.grid);
        actor.set_direction(direction);
        self.cache.invalidate(ActorKey::Ghost(id));
    }

    pub fn set_ghost_state(&mut self, id: GhostId, state: GhostState) {
        self.ai.ghosts[id.index()].state = state;
    }

    pub fn eat_pellets(&mut self, count: usize) {
        for row in 0..self.grid.rows() {
            for column in 0..self.grid.columns() {
                if self.pellets.eaten_count() >= count {
                    return;
                }
                self.pellets.eat(CellIndex::new(row, column));
            }
        }
    }
}

pub(super) fn info_with_discards(direction_discard: Vec<DirectionDiscard>) -> AiInfo {
    let setup = GhostSetup {
        start_cell: CellIndex::new(1, 3),
        start_direction: MoveDirection::Left,
        speed: 5.0,
        start_state: GhostState::Chase,
    };
    AiInfo {
        scatter_targets: PerGhost {
            blinky: CellIndex::new(0, 6),
            pinky: CellIndex::new(0, 0),
            inky: CellIndex::new(4, 6),
            clyde: CellIndex::new(4, 0),
        },
        scatter_duration: 1_000,
        scatter_interval: 5_000,
        fright_duration: 2_000,
        direction_discard,
        house_exit: CellIndex::new(1, 3),
        inky_release_dots: 1,
        clyde_release_fraction: 0.5,
        ghosts: PerGhost {
            blinky: setup,
            pinky: setup,
            inky: setup,
            clyde: setup,
        },
    }
}
