use super::*;

#[derive(Clone, Copy, Debug)]
enum ReleaseRule {
    Immediate,
    DotsEaten(usize),
    FractionEaten(f32),
}

impl ReleaseRule {
    fn is_met(self, pellets: &Pellets) -> bool {
        match self {
            Self::Immediate => true,
            Self::DotsEaten(count) => pellets.eaten_count() >= count,
            Self::FractionEaten(fraction) => {
                pellets.eaten_count() as f32 >= pellets.total_count() as f32 * fraction
            }
        }
    }
}

impl AiController {
    fn release_rule(&self, id: GhostId) -> ReleaseRule {
        match id {
            GhostId::Blinky | GhostId::Pinky => ReleaseRule::Immediate,
            GhostId::Inky => ReleaseRule::DotsEaten(self.info.inky_release_dots),
            GhostId::Clyde => ReleaseRule::FractionEaten(self.info.clyde_release_fraction),
        }
    }

    pub fn setup_scheduler<H: AiHost + 'static>(&self, scheduler: &mut Scheduler<H>) {
        scheduler.register_event(
            |host: &mut H, scheduler: &mut Scheduler<H>| {
                let (ai, ctx) = host.split();
                ai.start_scatter(ctx.events);
                scheduler.register_event(
                    |host: &mut H, _: &mut Scheduler<H>| {
                        let (ai, ctx) = host.split();
                        ai.resume_chase(ctx.events);
                        ActionResult::None
                    },
                    ai.info.scatter_duration,
                    false,
                );
                ActionResult::None
            },
            self.info.scatter_interval,
            true,
        );

        for id in GhostId::ALL {
            if self.ghosts[id.index()].state == GhostState::Wait {
                let rule = self.release_rule(id);
                scheduler.register_conditional_trigger(
                    move |host: &H| rule.is_met(host.pellets()),
                    move |host: &mut H, _: &mut Scheduler<H>| {
                        let (ai, ctx) = host.split();
                        ai.release(id, ctx.events);
                        ActionResult::Unregister
                    },
                );
            }
            scheduler.register_trigger(move |host: &mut H, _: &mut Scheduler<H>| {
                let (ai, mut ctx) = host.split();
                ai.wrap_through_tunnel(id, &mut ctx);
                ActionResult::None
            });
        }
    }

    fn start_scatter(&mut self, events: &mut Vec<GameEvent>) {
        self.scatter_active = true;
        for id in GhostId::ALL {
            if self.ghosts[id.index()].state == GhostState::Chase {
                self.set_state(id, GhostState::Scatter, events);
            }
        }
        events.push(GameEvent::ScatterStarted);
    }

    fn resume_chase(&mut self, events: &mut Vec<GameEvent>) {
        self.scatter_active = false;
        for id in GhostId::ALL {
            if self.ghosts[id.index()].state == GhostState::Scatter {
                self.set_state(id, GhostState::Chase, events);
            }
        }
        events.push(GameEvent::ChaseResumed);
    }

    fn release(&mut self, id: GhostId, events: &mut Vec<GameEvent>) {
        if self.ghosts[id.index()].state != GhostState::Wait {
            return;
        }
        self.set_state(id, GhostState::LeaveHouse, events);
        events.push(GameEvent::GhostReleased { ghost: id });
    }

    fn wrap_through_tunnel(&mut self, id: GhostId, ctx: &mut AiContext<'_>) {
        let key = ActorKey::Ghost(id);
        let actor = &mut self.ghosts[id.index()].actor;
        let cells = ctx.cache.cells_for(key, ctx.grid, actor.region());
        let Some(destination) = ctx.grid.tunnel_destination(&cells, actor.direction()) else {
            return;
        };
        actor.translate(destination, ctx.grid);
        ctx.cache.invalidate(key);
        ctx.events.push(GameEvent::TunnelWrap {
            actor: ActorKey::Ghost(id),
            to: destination,
        });
    }

    /// Reverses every ghost outside the house and makes it frightened. The
    /// timeout restarts if frightened mode is already active.
    pub fn enable_frightened_state<H: AiHost + 'static>(
        &mut self,
        ctx: &mut AiContext<'_>,
        scheduler: &mut Scheduler<H>,
    ) {
        for id in GhostId::ALL {
            if self.ghosts[id.index()].state.is_in_house() {
                continue;
            }
            self.reverse(id, ctx.grid);
            ctx.cache.invalidate(ActorKey::Ghost(id));
            self.set_state(id, GhostState::Frightened, ctx.events);
        }

        if let Some(previous) = self.frightened_event.take() {
            scheduler.unregister_event(previous);
        }
        let timeout = scheduler.register_event(
            |host: &mut H, _: &mut Scheduler<H>| {
                let (ai, mut ctx) = host.split();
                ai.disable_frightened_state(&mut ctx);
                ActionResult::None
            },
            self.info.fright_duration,
            false,
        );
        self.frightened_event = Some(timeout);
        ctx.events.push(GameEvent::FrightenedStarted);
    }

    /// Frightened ghosts return to Chase, whatever mode the global timer is in.
    pub fn disable_frightened_state(&mut self, ctx: &mut AiContext<'_>) {
        self.frightened_event = None;
        for id in GhostId::ALL {
            if self.ghosts[id.index()].state == GhostState::Frightened {
                self.set_state(id, GhostState::Chase, ctx.events);
            }
        }
        ctx.events.push(GameEvent::FrightenedEnded);
    }

    fn reverse(&mut self, id: GhostId, grid: &Grid) {
        let actor = &mut self.ghosts[id.index()].actor;
        let back = actor.direction().back();
        let origin = actor
            .target_cell()
            .and_then(|target| grid.neighbor(target, back));
        match origin {
            Some(origin) => actor.move_to(back, origin, grid),
            None => actor.set_direction(back),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::TestHost;
    use super::*;
    use crate::constants::TICK_MS;

    fn scheduled(seed: u64) -> (TestHost, Scheduler<TestHost>) {
        let host = TestHost::classic(seed);
        let mut scheduler = Scheduler::new();
        host.ai.setup_scheduler(&mut scheduler);
        (host, scheduler)
    }

    fn step(host: &mut TestHost, scheduler: &mut Scheduler<TestHost>, dt_ms: u64) {
        host.cache.reset();
        scheduler.update(dt_ms, host);
        host.update_ai(dt_ms);
    }

    #[test]
    fn frightened_enable_then_disable_restores_chase_with_reversed_direction() {
        let (mut host, mut scheduler) = scheduled(3);
        host.update_ai(TICK_MS);
        assert_eq!(host.ai.ghost(GhostId::Blinky).actor().direction(), MoveDirection::Left);

        {
            let (ai, mut ctx) = host.split();
            ai.enable_frightened_state(&mut ctx, &mut scheduler);
        }
        let blinky = host.ai.ghost(GhostId::Blinky);
        assert_eq!(blinky.state(), GhostState::Frightened);
        assert_eq!(blinky.actor().direction(), MoveDirection::Right);
        assert_eq!(blinky.actor().target_cell(), Some(CellIndex::new(11, 13)));
        assert_eq!(host.ai.ghost(GhostId::Pinky).state(), GhostState::LeaveHouse);
        assert!(host.ai.is_frightened_active());

        {
            let (ai, mut ctx) = host.split();
            ai.disable_frightened_state(&mut ctx);
        }
        let blinky = host.ai.ghost(GhostId::Blinky);
        assert_eq!(blinky.state(), GhostState::Chase);
        assert_eq!(blinky.actor().direction(), MoveDirection::Right);
        assert!(!host.ai.is_frightened_active());
    }

    #[test]
    fn frightened_mode_times_out_through_the_scheduler() {
        let (mut host, mut scheduler) = scheduled(3);
        {
            let (ai, mut ctx) = host.split();
            ai.enable_frightened_state(&mut ctx, &mut scheduler);
        }
        let fright = host.ai.info().fright_duration;
        step(&mut host, &mut scheduler, fright - 1);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Frightened);
        step(&mut host, &mut scheduler, 1);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Chase);
        assert!(host.events.contains(&GameEvent::FrightenedEnded));
    }

    #[test]
    fn re_entering_frightened_restarts_the_timeout() {
        let (mut host, mut scheduler) = scheduled(3);
        let fright = host.ai.info().fright_duration;
        {
            let (ai, mut ctx) = host.split();
            ai.enable_frightened_state(&mut ctx, &mut scheduler);
        }
        scheduler.update(fright / 2, &mut host);
        {
            let (ai, mut ctx) = host.split();
            ai.enable_frightened_state(&mut ctx, &mut scheduler);
        }
        scheduler.update(fright / 2 + 1, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Frightened);
        scheduler.update(fright / 2, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Chase);
    }

    #[test]
    fn scatter_interval_toggles_chase_ghosts_only() {
        let (mut host, mut scheduler) = scheduled(3);
        let info = host.ai.info().clone();
        scheduler.update(info.scatter_interval, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Scatter);
        assert_eq!(host.ai.ghost(GhostId::Pinky).state(), GhostState::LeaveHouse);
        assert_eq!(host.ai.ghost(GhostId::Inky).state(), GhostState::Wait);
        assert!(host.ai.is_scatter_active());
        assert!(host.events.contains(&GameEvent::ScatterStarted));

        scheduler.update(info.scatter_duration, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Chase);
        assert!(!host.ai.is_scatter_active());
        assert!(host.events.contains(&GameEvent::ChaseResumed));
    }

    #[test]
    fn scatter_toggle_leaves_frightened_ghosts_alone() {
        let (mut host, mut scheduler) = scheduled(3);
        host.set_ghost_state(GhostId::Blinky, GhostState::Frightened);
        scheduler.update(host.ai.info().scatter_interval, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Blinky).state(), GhostState::Frightened);
    }

    #[test]
    fn inky_is_released_after_enough_pellets() {
        let (mut host, mut scheduler) = scheduled(3);
        let needed = host.ai.info().inky_release_dots;
        host.eat_pellets(needed - 1);
        scheduler.update(TICK_MS, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Inky).state(), GhostState::Wait);

        host.eat_pellets(needed);
        scheduler.update(TICK_MS, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Inky).state(), GhostState::LeaveHouse);
        assert_eq!(host.ai.ghost(GhostId::Clyde).state(), GhostState::Wait);
        assert!(host.events.contains(&GameEvent::GhostReleased { ghost: GhostId::Inky }));
    }

    #[test]
    fn clyde_waits_for_a_fraction_of_the_pellets() {
        let (mut host, mut scheduler) = scheduled(3);
        let total = host.pellets.total_count() as f32;
        let needed = (total * host.ai.info().clyde_release_fraction).ceil() as usize;
        host.eat_pellets(needed - 1);
        scheduler.update(TICK_MS, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Clyde).state(), GhostState::Wait);

        host.eat_pellets(needed);
        scheduler.update(TICK_MS, &mut host);
        assert_eq!(host.ai.ghost(GhostId::Clyde).state(), GhostState::LeaveHouse);
    }

    #[test]
    fn ghost_on_a_tunnel_exit_wraps_to_the_other_side() {
        let (mut host, mut scheduler) = scheduled(3);
        host.place_ghost(GhostId::Blinky, CellIndex::new(14, 0), MoveDirection::Left);
        step(&mut host, &mut scheduler, TICK_MS);

        assert!(host.events.contains(&GameEvent::TunnelWrap {
            actor: ActorKey::Ghost(GhostId::Blinky),
            to: CellIndex::new(14, 27),
        }));
        let blinky = host.ai.ghost(GhostId::Blinky).actor();
        assert_eq!(blinky.direction(), MoveDirection::Left);
        assert_eq!(blinky.target_cell(), Some(CellIndex::new(14, 26)));
    }

    #[test]
    fn straddling_ghost_is_not_wrapped() {
        let (mut host, mut scheduler) = scheduled(3);
        host.place_ghost(GhostId::Blinky, CellIndex::new(14, 1), MoveDirection::Left);
        host.update_ai(TICK_MS);
        host.update_ai(TICK_MS);
        let cells = host.grid.find_cells(host.ai.ghost(GhostId::Blinky).actor().region());
        assert_eq!(cells, vec![CellIndex::new(14, 0), CellIndex::new(14, 1)]);
        scheduler.update(TICK_MS, &mut host);
        assert!(!host
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::TunnelWrap { .. })));
    }
}
