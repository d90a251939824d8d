//! Reusable-handle pools.
//!
//! `ObjectPool` is the engine-agnostic core: per-prototype alive/dead lists
//! with strict release checks. `MeshPool` wraps it for ECS entities, tagging
//! every entity it spawns with an immutable `PoolTag` and toggling
//! `Visibility` on acquire/release.

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::shared::*;

pub mod effects;

pub use effects::{EffectPlayer, SmokePuff};

#[derive(Debug)]
struct PoolLists<H> {
    alive: Vec<H>,
    dead: VecDeque<H>,
}

impl<H> Default for PoolLists<H> {
    fn default() -> Self {
        Self {
            alive: Vec::new(),
            dead: VecDeque::new(),
        }
    }
}

/// Result of `ObjectPool::acquire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired<H> {
    pub handle: H,
    /// True when the handle came off the dead list rather than `construct`.
    pub reused: bool,
}

#[derive(Debug)]
pub struct ObjectPool<K, H> {
    pools: HashMap<K, PoolLists<H>>,
}

impl<K, H> Default for ObjectPool<K, H> {
    fn default() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }
}

impl<K, H> ObjectPool<K, H>
where
    K: Eq + Hash + Clone,
    H: Copy + PartialEq,
{
    /// Hand out a handle for `key`: the oldest dead one if any, otherwise a
    /// fresh one from `construct`. The caller tags fresh handles with `key`.
    pub fn acquire<F>(&mut self, key: &K, construct: F) -> Acquired<H>
    where
        F: FnOnce(&K) -> H,
    {
        let lists = self.pools.entry(key.clone()).or_default();
        let acquired = match lists.dead.pop_front() {
            Some(handle) => Acquired { handle, reused: true },
            None => Acquired {
                handle: construct(key),
                reused: false,
            },
        };
        lists.alive.push(acquired.handle);
        acquired
    }

    /// Return `handle` to its pool. `tag` is the prototype the handle carries.
    pub fn release(&mut self, handle: H, tag: Option<&K>) -> Result<(), GardenError> {
        let key = tag.ok_or(GardenError::NotManaged)?;
        let lists = self
            .pools
            .get_mut(key)
            .ok_or(GardenError::UnknownPrototype)?;
        let index = lists
            .alive
            .iter()
            .position(|h| *h == handle)
            .ok_or(GardenError::NotAlive)?;
        lists.alive.remove(index);
        lists.dead.push_back(handle);
        Ok(())
    }

    pub fn alive(&self, key: &K) -> &[H] {
        self.pools.get(key).map_or(&[], |lists| lists.alive.as_slice())
    }

    pub fn dead_count(&self, key: &K) -> usize {
        self.pools.get(key).map_or(0, |lists| lists.dead.len())
    }

    pub fn is_alive(&self, key: &K, handle: H) -> bool {
        self.alive(key).contains(&handle)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ECS POOL
// ═══════════════════════════════════════════════════════════════════════

/// Prototype identity of a pooled visual.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualKey {
    /// Model of one growth stage of a unit.
    Unit { item: ItemType, stage: u8 },
    /// Billboard effect, keyed by its texture identifier.
    Effect(&'static str),
}

impl VisualKey {
    pub fn unit(item: ItemType, stage: u8) -> Self {
        VisualKey::Unit { item, stage }
    }

    /// Asset identifier for this visual.
    pub fn asset_path(&self) -> String {
        match self {
            VisualKey::Unit { item, stage } => format!("models/{}_{}.glb", item.species(), stage),
            VisualKey::Effect(texture) => (*texture).to_string(),
        }
    }
}

/// Prototype tag on every entity the `MeshPool` spawned. Set once at spawn.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PoolTag(VisualKey);

impl PoolTag {
    pub fn key(&self) -> &VisualKey {
        &self.0
    }
}

#[derive(Resource, Debug, Default)]
pub struct MeshPool {
    pool: ObjectPool<VisualKey, Entity>,
}

impl MeshPool {
    /// Acquire an entity for `key`, spawning one through `spawn` when the dead
    /// list is empty. The returned entity is visible.
    pub fn acquire<F>(&mut self, commands: &mut Commands, key: VisualKey, spawn: F) -> Acquired<Entity>
    where
        F: FnOnce(&mut Commands, &VisualKey) -> Entity,
    {
        let acquired = self.pool.acquire(&key, |key| {
            let entity = spawn(commands, key);
            commands.entity(entity).insert(PoolTag(key.clone()));
            entity
        });
        commands.entity(acquired.handle).insert(Visibility::Visible);
        acquired
    }

    /// Hide `entity` and park it on its prototype's dead list.
    pub fn release(
        &mut self,
        commands: &mut Commands,
        entity: Entity,
        tag: Option<&PoolTag>,
    ) -> Result<(), GardenError> {
        self.pool.release(entity, tag.map(PoolTag::key))?;
        commands.entity(entity).insert(Visibility::Hidden);
        Ok(())
    }

    pub fn alive(&self, key: &VisualKey) -> &[Entity] {
        self.pool.alive(key)
    }

    pub fn dead_count(&self, key: &VisualKey) -> usize {
        self.pool.dead_count(key)
    }
}

pub struct PoolPlugin;

impl Plugin for PoolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeshPool>()
            .init_resource::<EffectPlayer>()
            .add_systems(
                Update,
                effects::animate_smoke_puffs.run_if(in_state(GameState::Playing)),
            );
    }
}
