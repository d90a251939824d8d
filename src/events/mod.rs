//! Game event bus: ordered publish/subscribe with first-claim short-circuit.
//!
//! Domains never hold references to each other. A domain that needs to react
//! to another registers a listener for a `GameEventKind`; the producer
//! publishes a `GameEvent` and every listener for that kind runs in
//! registration order until one of them returns `Propagation::Stop`.
//!
//! The bus is generic over the context handed to listeners. The running game
//! uses `GameBus = EventBus<World>` so listeners can touch any resource;
//! tests use a plain struct.

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use crate::shared::*;

/// What a listener wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    /// The listener claimed the event; later listeners do not see it.
    Stop,
}

/// Returned by `subscribe`; pass to `unsubscribe` to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken {
    kind: GameEventKind,
    id: u64,
}

impl ListenerToken {
    pub fn kind(&self) -> GameEventKind {
        self.kind
    }
}

pub type Listener<C> = Box<dyn FnMut(&mut C, &GameEvent) -> Propagation + Send + Sync>;

#[derive(Resource)]
pub struct EventBus<C: 'static> {
    listeners: HashMap<GameEventKind, Vec<(u64, Listener<C>)>>,
    next_id: u64,
}

/// The bus the running game uses.
pub type GameBus = EventBus<World>;

impl<C: 'static> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> EventBus<C> {
    /// A bus with an empty listener list for every kind in `GameEventKind::ALL`.
    pub fn new() -> Self {
        let listeners = GameEventKind::ALL
            .into_iter()
            .map(|kind| (kind, Vec::new()))
            .collect();
        Self {
            listeners,
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, kind: GameEventKind, listener: F) -> Result<ListenerToken, GardenError>
    where
        F: FnMut(&mut C, &GameEvent) -> Propagation + Send + Sync + 'static,
    {
        let list = self
            .listeners
            .get_mut(&kind)
            .ok_or_else(|| GardenError::UnknownEvent(kind.to_string()))?;
        let id = self.next_id;
        self.next_id += 1;
        list.push((id, Box::new(listener)));
        Ok(ListenerToken { kind, id })
    }

    /// Subscribe by event name, e.g. from a data file.
    pub fn subscribe_named<F>(&mut self, name: &str, listener: F) -> Result<ListenerToken, GardenError>
    where
        F: FnMut(&mut C, &GameEvent) -> Propagation + Send + Sync + 'static,
    {
        let kind: GameEventKind = name.parse()?;
        self.subscribe(kind, listener)
    }

    /// Returns false if the token was already removed.
    pub fn unsubscribe(&mut self, token: ListenerToken) -> bool {
        let Some(list) = self.listeners.get_mut(&token.kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != token.id);
        list.len() != before
    }

    /// Dispatch `event` to its listeners in registration order.
    ///
    /// Returns how many listeners ran (the claiming listener included).
    pub fn publish(&mut self, ctx: &mut C, event: &GameEvent) -> Result<usize, GardenError> {
        let kind = event.kind();
        let list = self
            .listeners
            .get_mut(&kind)
            .ok_or_else(|| GardenError::UnknownEvent(kind.to_string()))?;

        let mut invoked = 0;
        for (_, listener) in list.iter_mut() {
            invoked += 1;
            if listener(ctx, event) == Propagation::Stop {
                break;
            }
        }
        Ok(invoked)
    }

    pub fn listener_count(&self, kind: GameEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BEVY GLUE
// ═══════════════════════════════════════════════════════════════════════

/// Deferred publish, queued from ordinary systems via `commands.queue(...)`.
///
/// Runs the bus under `resource_scope`, so listeners get `&mut World`
/// while the bus itself is checked out. A listener may publish in turn:
/// the nested event waits in `PendingEvents` and is dispatched once the
/// current one has reached all of its listeners.
pub struct PublishEvent(pub GameEvent);

/// Events waiting for the bus, oldest first.
#[derive(Resource, Debug, Default)]
pub struct PendingEvents {
    queue: VecDeque<GameEvent>,
    draining: bool,
}

impl PendingEvents {
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Command for PublishEvent {
    fn apply(self, world: &mut World) {
        let mut pending = world.get_resource_or_insert_with(PendingEvents::default);
        pending.queue.push_back(self.0);
        if pending.draining {
            return;
        }
        pending.draining = true;
        drain_pending(world);
    }
}

fn drain_pending(world: &mut World) {
    loop {
        let Some(event) = world
            .get_resource_mut::<PendingEvents>()
            .and_then(|mut pending| pending.queue.pop_front())
        else {
            break;
        };
        if !world.contains_resource::<GameBus>() {
            warn!("[Events] No GameBus present, dropping {:?}", event);
            continue;
        }
        world.resource_scope(|world, mut bus: Mut<GameBus>| {
            if let Err(err) = bus.publish(world, &event) {
                error!("[Events] Publish failed: {}", err);
            }
        });
    }
    if let Some(mut pending) = world.get_resource_mut::<PendingEvents>() {
        pending.draining = false;
    }
}

pub struct EventsPlugin;

impl Plugin for EventsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameBus>()
            .init_resource::<PendingEvents>();
    }
}
