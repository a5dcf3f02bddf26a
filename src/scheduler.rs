use std::mem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionResult {
    None,
    Unregister,
}

pub type Action<C> = Box<dyn FnMut(&mut C, &mut Scheduler<C>) -> ActionResult>;
pub type Condition<C> = Box<dyn FnMut(&C) -> bool>;

struct Event<C> {
    id: EventId,
    delay: u64,
    elapsed: u64,
    repeatable: bool,
    action: Action<C>,
}

struct Trigger<C> {
    id: TriggerId,
    condition: Option<Condition<C>>,
    action: Action<C>,
}

pub struct Scheduler<C> {
    events: Vec<Event<C>>,
    triggers: Vec<Trigger<C>>,
    next_event_id: u64,
    next_trigger_id: u64,
    removed_events: Vec<EventId>,
    removed_triggers: Vec<TriggerId>,
    updating: bool,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            triggers: Vec::new(),
            next_event_id: 1,
            next_trigger_id: 1,
            removed_events: Vec::new(),
            removed_triggers: Vec::new(),
            updating: false,
        }
    }

    /// Runs `action` once `delay` ms of update time have accumulated.
    /// A repeatable event keeps the excess and stays registered until its
    /// action returns [`ActionResult::Unregister`].
    pub fn register_event<F>(&mut self, action: F, delay: u64, repeatable: bool) -> EventId
    where
        F: FnMut(&mut C, &mut Scheduler<C>) -> ActionResult + 'static,
    {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.events.push(Event {
            id,
            delay,
            elapsed: 0,
            repeatable,
            action: Box::new(action),
        });
        id
    }

    pub fn register_trigger<F>(&mut self, action: F) -> TriggerId
    where
        F: FnMut(&mut C, &mut Scheduler<C>) -> ActionResult + 'static,
    {
        self.push_trigger(None, Box::new(action))
    }

    pub fn register_conditional_trigger<P, F>(&mut self, condition: P, action: F) -> TriggerId
    where
        P: FnMut(&C) -> bool + 'static,
        F: FnMut(&mut C, &mut Scheduler<C>) -> ActionResult + 'static,
    {
        self.push_trigger(Some(Box::new(condition)), Box::new(action))
    }

    fn push_trigger(&mut self, condition: Option<Condition<C>>, action: Action<C>) -> TriggerId {
        let id = TriggerId(self.next_trigger_id);
        self.next_trigger_id += 1;
        self.triggers.push(Trigger {
            id,
            condition,
            action,
        });
        id
    }

    pub fn unregister_event(&mut self, id: EventId) {
        if self.updating {
            if !self.removed_events.contains(&id) {
                self.removed_events.push(id);
            }
        } else {
            self.events.retain(|event| event.id != id);
        }
    }

    pub fn unregister_trigger(&mut self, id: TriggerId) {
        if self.updating {
            if !self.removed_triggers.contains(&id) {
                self.removed_triggers.push(id);
            }
        } else {
            self.triggers.retain(|trigger| trigger.id != id);
        }
    }

    pub fn update(&mut self, dt: u64, ctx: &mut C) {
        self.updating = true;

        let mut events = mem::take(&mut self.events);
        for event in &mut events {
            if self.removed_events.contains(&event.id) {
                continue;
            }
            event.elapsed += dt;
            if event.elapsed < event.delay {
                continue;
            }
            let result = (event.action)(ctx, self);
            if event.repeatable {
                event.elapsed -= event.delay;
            }
            if !event.repeatable || result == ActionResult::Unregister {
                self.removed_events.push(event.id);
            }
        }
        events.append(&mut self.events);
        self.events = events;

        let mut triggers = mem::take(&mut self.triggers);
        for trigger in &mut triggers {
            if self.removed_triggers.contains(&trigger.id) {
                continue;
            }
            if let Some(condition) = trigger.condition.as_mut() {
                if !condition(ctx) {
                    continue;
                }
            }
            if (trigger.action)(ctx, self) == ActionResult::Unregister {
                self.removed_triggers.push(trigger.id);
            }
        }
        triggers.append(&mut self.triggers);
        self.triggers = triggers;

        let removed_events = mem::take(&mut self.removed_events);
        self.events.retain(|event| !removed_events.contains(&event.id));
        let removed_triggers = mem::take(&mut self.removed_triggers);
        self.triggers
            .retain(|trigger| !removed_triggers.contains(&trigger.id));

        self.updating = false;
    }

    pub fn has_event(&self, id: EventId) -> bool {
        !self.removed_events.contains(&id) && self.events.iter().any(|event| event.id == id)
    }

    pub fn has_trigger(&self, id: TriggerId) -> bool {
        !self.removed_triggers.contains(&id)
            && self.triggers.iter().any(|trigger| trigger.id == id)
    }

    pub fn event_elapsed(&self, id: EventId) -> Option<u64> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .map(|event| event.elapsed)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }
}
