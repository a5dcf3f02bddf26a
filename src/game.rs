use std::mem;

use crate::actor::Actor;
use crate::config::{AiInfo, LevelConfig};
use crate::engine::{AiContext, AiController, AiHost};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::pellets::Pellets;
use crate::position_cache::PositionCache;
use crate::scheduler::{ActionResult, Scheduler};
use crate::types::{ActorKey, CellIndex, DotType, GameEvent, MapCellType, MoveDirection, PacmanView, Snapshot};

#[derive(Clone, Debug)]
struct Pacman {
    actor: Actor,
    desired: MoveDirection,
}

impl Pacman {
    fn open_step(grid: &Grid, cell: CellIndex, direction: MoveDirection) -> Option<CellIndex> {
        let next = grid.neighbor(cell, direction)?;
        (grid.get_cell(next) == Ok(MapCellType::Empty)).then_some(next)
    }

    fn plan(&mut self, grid: &Grid) {
        let cell = self.actor.cell();
        for direction in [self.desired, self.actor.direction()] {
            if direction == MoveDirection::None {
                continue;
            }
            if let Some(next) = Self::open_step(grid, cell, direction) {
                self.actor.move_to(direction, next, grid);
                return;
            }
        }
    }

    fn update(&mut self, dt_ms: u64, grid: &Grid) {
        self.actor.update(dt_ms);
        if !self.actor.is_moving() {
            self.plan(grid);
        }
    }

    fn steer(&mut self, direction: MoveDirection, grid: &Grid) {
        self.desired = direction;
        if direction == MoveDirection::None {
            return;
        }
        if !self.actor.is_moving() {
            self.plan(grid);
            return;
        }
        if direction == self.actor.direction().back() {
            let origin = self
                .actor
                .target_cell()
                .and_then(|target| grid.neighbor(target, direction));
            if let Some(origin) = origin {
                self.actor.move_to(direction, origin, grid);
            }
        }
    }
}

struct GameWorld {
    grid: Grid,
    cache: PositionCache,
    pellets: Pellets,
    pacman: Pacman,
    ai: AiController,
    events: Vec<GameEvent>,
}

impl AiHost for GameWorld {
    fn split(&mut self) -> (&mut AiController, AiContext<'_>) {
        (
            &mut self.ai,
            AiContext {
                grid: &self.grid,
                cache: &mut self.cache,
                pacman: &self.pacman.actor,
                pellets: &self.pellets,
                events: &mut self.events,
            },
        )
    }

    fn pellets(&self) -> &Pellets {
        &self.pellets
    }
}

impl GameWorld {
    fn eat_pellet(&mut self, scheduler: &mut Scheduler<GameWorld>) -> ActionResult {
        let cell = self.pacman.actor.cell();
        let Some(kind) = self.pellets.eat(cell) else {
            return ActionResult::None;
        };
        self.events.push(GameEvent::DotEaten { cell, kind });
        if kind == DotType::Big {
            let (ai, mut ctx) = self.split();
            ai.enable_frightened_state(&mut ctx, scheduler);
        }
        if self.pellets.is_cleared() {
            self.events.push(GameEvent::LevelCleared);
            return ActionResult::Unregister;
        }
        ActionResult::None
    }

    fn wrap_pacman(&mut self) {
        let actor = &self.pacman.actor;
        let cells = self.cache.cells_for(ActorKey::Pacman, &self.grid, actor.region());
        let Some(destination) = self.grid.tunnel_destination(&cells, actor.direction()) else {
            return;
        };
        self.pacman.actor.translate(destination, &self.grid);
        self.cache.invalidate(ActorKey::Pacman);
        self.pacman.plan(&self.grid);
        self.events.push(GameEvent::TunnelWrap {
            actor: ActorKey::Pacman,
            to: destination,
        });
    }
}

pub struct GameSession {
    scheduler: Scheduler<GameWorld>,
    world: GameWorld,
    tick: u64,
    elapsed_ms: u64,
}

impl GameSession {
    pub fn new(level: &LevelConfig, info: AiInfo, seed: u64) -> Result<Self, ConfigError> {
        let grid = level.build_grid()?;
        info.validate(&grid)?;
        let pellets = Pellets::from_tiles(&level.tiles)?;
        let pacman = Pacman {
            actor: Actor::new(
                level.pacman.start_cell,
                level.pacman.start_direction,
                level.pacman.speed,
                &grid,
            ),
            desired: MoveDirection::None,
        };
        let ai = AiController::new(info, &grid, seed);

        let mut scheduler = Scheduler::new();
        ai.setup_scheduler(&mut scheduler);
        scheduler.register_event(
            |world: &mut GameWorld, scheduler: &mut Scheduler<GameWorld>| world.eat_pellet(scheduler),
            0,
            true,
        );
        scheduler.register_trigger(|world: &mut GameWorld, _: &mut Scheduler<GameWorld>| {
            world.wrap_pacman();
            ActionResult::None
        });

        Ok(Self {
            scheduler,
            world: GameWorld {
                grid,
                cache: PositionCache::new(),
                pellets,
                pacman,
                ai,
                events: Vec::new(),
            },
            tick: 0,
            elapsed_ms: 0,
        })
    }

    pub fn classic(seed: u64) -> Result<Self, ConfigError> {
        Self::new(&LevelConfig::classic()?, AiInfo::classic()?, seed)
    }

    pub fn step(&mut self, dt_ms: u64) {
        self.tick += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        let world = &mut self.world;
        world.cache.reset();
        world.pacman.update(dt_ms, &world.grid);
        self.scheduler.update(dt_ms, world);
        let (ai, mut ctx) = world.split();
        ai.update(dt_ms, &mut ctx);
    }

    pub fn steer_pacman(&mut self, direction: MoveDirection) {
        self.world.pacman.steer(direction, &self.world.grid);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let actor = &self.world.pacman.actor;
        let position = actor.position();
        Snapshot {
            tick: self.tick,
            elapsed_ms: self.elapsed_ms,
            pacman: PacmanView {
                cell: actor.cell(),
                dir: actor.direction(),
                x: position.x,
                y: position.y,
            },
            ghosts: self.world.ai.views(),
            dots_eaten: self.world.pellets.eaten_count(),
            dots_total: self.world.pellets.total_count(),
            frightened_active: self.world.ai.is_frightened_active(),
            scatter_active: self.world.ai.is_scatter_active(),
            events: if include_events {
                mem::take(&mut self.world.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.world.pellets.is_cleared()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn grid(&self) -> &Grid {
        &self.world.grid
    }

    pub fn pellets(&self) -> &Pellets {
        &self.world.pellets
    }

    pub fn ai(&self) -> &AiController {
        &self.world.ai
    }

    pub fn pacman(&self) -> &Actor {
        &self.world.pacman.actor
    }
}
