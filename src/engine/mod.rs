use crate::actor::Actor;
use crate::config::{AiInfo, GhostSetup};
use crate::grid::Grid;
use crate::pellets::Pellets;
use crate::position_cache::PositionCache;
use crate::rng::Rng;
use crate::scheduler::{ActionResult, EventId, Scheduler};
use crate::types::{ActorKey, CellIndex, GameEvent, GhostId, GhostState, GhostView, MoveDirection};

mod decision;
#[cfg(test)]
mod fixtures;
mod modes;
mod targets;
mod utils;

pub use self::decision::select_best_direction;
pub use self::utils::{find_with_offset, select_nearest_cell};

pub struct AiContext<'a> {
    pub grid: &'a Grid,
    pub cache: &'a mut PositionCache,
    pub pacman: &'a Actor,
    pub pellets: &'a Pellets,
    pub events: &'a mut Vec<GameEvent>,
}

pub trait AiHost {
    fn split(&mut self) -> (&mut AiController, AiContext<'_>);
    fn pellets(&self) -> &Pellets;
}

#[derive(Clone, Debug)]
pub struct Ghost {
    id: GhostId,
    state: GhostState,
    actor: Actor,
    target_cell: CellIndex,
}

impl Ghost {
    fn new(id: GhostId, setup: GhostSetup, grid: &Grid) -> Self {
        Self {
            id,
            state: setup.start_state,
            actor: Actor::new(setup.start_cell, setup.start_direction, setup.speed, grid),
            target_cell: setup.start_cell,
        }
    }

    pub fn id(&self) -> GhostId {
        self.id
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn target_cell(&self) -> CellIndex {
        self.target_cell
    }

    pub fn view(&self) -> GhostView {
        let position = self.actor.position();
        GhostView {
            id: self.id,
            state: self.state,
            cell: self.actor.cell(),
            dir: self.actor.direction(),
            target_cell: self.target_cell,
            x: position.x,
            y: position.y,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AiController {
    info: AiInfo,
    ghosts: [Ghost; 4],
    rng: Rng,
    frightened_event: Option<EventId>,
    scatter_active: bool,
}

impl AiController {
    pub fn new(info: AiInfo, grid: &Grid, seed: u64) -> Self {
        let ghosts = GhostId::ALL.map(|id| Ghost::new(id, info.ghosts.get(id), grid));
        Self {
            info,
            ghosts,
            rng: Rng::from_seed(seed),
            frightened_event: None,
            scatter_active: false,
        }
    }

    pub fn info(&self) -> &AiInfo {
        &self.info
    }

    pub fn ghost(&self, id: GhostId) -> &Ghost {
        &self.ghosts[id.index()]
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn is_frightened_active(&self) -> bool {
        self.frightened_event.is_some()
    }

    pub fn is_scatter_active(&self) -> bool {
        self.scatter_active
    }

    pub fn views(&self) -> Vec<GhostView> {
        self.ghosts.iter().map(Ghost::view).collect()
    }

    pub fn update(&mut self, dt_ms: u64, ctx: &mut AiContext<'_>) {
        for id in GhostId::ALL {
            let ghost = &mut self.ghosts[id.index()];
            ghost.actor.update(dt_ms);
            ctx.cache.invalidate(ActorKey::Ghost(id));
            if !ghost.actor.is_moving() {
                self.find_way(id, ctx);
            }
        }
    }

    fn set_state(&mut self, id: GhostId, state: GhostState, events: &mut Vec<GameEvent>) {
        let ghost = &mut self.ghosts[id.index()];
        if ghost.state == state {
            return;
        }
        events.push(GameEvent::GhostStateChanged {
            ghost: id,
            from: ghost.state,
            to: state,
        });
        ghost.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::TestHost;
    use super::*;
    use crate::constants::TICK_MS;

    #[test]
    fn ghosts_start_in_configured_states() {
        let host = TestHost::classic(7);
        let states: Vec<_> = host.ai.ghosts().iter().map(Ghost::state).collect();
        assert_eq!(
            states,
            vec![
                GhostState::Chase,
                GhostState::LeaveHouse,
                GhostState::Wait,
                GhostState::Wait,
            ]
        );
        assert_eq!(host.ai.ghost(GhostId::Inky).id(), GhostId::Inky);
    }

    #[test]
    fn every_ghost_gets_a_move_on_the_first_update() {
        let mut host = TestHost::classic(7);
        host.update_ai(TICK_MS);
        for ghost in host.ai.ghosts() {
            assert!(ghost.actor().is_moving(), "{} is idle", ghost.id().name());
        }
        let pinky = host.ai.ghost(GhostId::Pinky);
        assert_eq!(pinky.actor().direction(), MoveDirection::Up);
        assert_eq!(pinky.actor().target_cell(), Some(CellIndex::new(13, 13)));
    }

    #[test]
    fn pinky_leaves_the_house_and_starts_chasing() {
        let mut host = TestHost::classic(7);
        for _ in 0..120 {
            host.update_ai(TICK_MS);
        }
        assert_eq!(host.ai.ghost(GhostId::Pinky).state(), GhostState::Chase);
        assert!(host.events.contains(&GameEvent::GhostStateChanged {
            ghost: GhostId::Pinky,
            from: GhostState::LeaveHouse,
            to: GhostState::Chase,
        }));
    }

    #[test]
    fn waiting_ghosts_stay_inside_the_house() {
        let mut host = TestHost::classic(11);
        for _ in 0..600 {
            host.update_ai(TICK_MS);
            for id in [GhostId::Inky, GhostId::Clyde] {
                let cell = host.ai.ghost(id).actor().cell();
                assert!((13..=15).contains(&cell.row), "{} left the house: {cell:?}", id.name());
            }
        }
        assert_eq!(host.ai.ghost(GhostId::Inky).state(), GhostState::Wait);
    }

    #[test]
    fn set_state_records_transitions_once() {
        let mut host = TestHost::classic(1);
        let mut events = Vec::new();
        host.ai.set_state(GhostId::Blinky, GhostState::Scatter, &mut events);
        host.ai.set_state(GhostId::Blinky, GhostState::Scatter, &mut events);
        assert_eq!(
            events,
            vec![GameEvent::GhostStateChanged {
                ghost: GhostId::Blinky,
                from: GhostState::Chase,
                to: GhostState::Scatter,
            }]
        );
    }

    #[test]
    fn views_follow_ghost_order() {
        let host = TestHost::classic(3);
        let views = host.ai.views();
        let ids: Vec<_> = views.iter().map(|view| view.id).collect();
        assert_eq!(ids, GhostId::ALL.to_vec());
        assert_eq!(views[0].cell, CellIndex::new(11, 13));
        assert_eq!(views[0].x, 13 * 16 + 8);
    }
}
