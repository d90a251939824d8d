//! Short-lived billboard effects (the smoke puff on placement).
//!
//! Every effect entity comes from the `MeshPool`, so a burst of clicks
//! recycles the same handful of quads instead of spawning new ones.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{MeshPool, PoolTag, VisualKey};
use crate::data::AssetCache;
use crate::tween::Tween;

pub const SMOKE_TEXTURE: &str = "images/smoke.png";

/// Tilt applied to effect quads so they face the garden camera.
const BILLBOARD_PITCH: f32 = -0.86;
const PUFF_PHASE_SECS: f32 = 0.1;
const PUFF_RISE: f32 = 4.0;

/// Shared quad mesh for all effects, created on first use.
#[derive(Resource, Debug, Default)]
pub struct EffectPlayer {
    quad: Option<Handle<Mesh>>,
    spawned: u32,
}

impl EffectPlayer {
    /// Effects constructed so far (reuses not counted).
    pub fn spawned(&self) -> u32 {
        self.spawned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuffPhase {
    Rise,
    Fade,
}

#[derive(Component, Debug, Clone)]
pub struct SmokePuff {
    pub phase: PuffPhase,
    pub tween: Tween,
    pub start_y: f32,
    pub size: Vec2,
}

impl SmokePuff {
    fn new(start_y: f32, size: Vec2) -> Self {
        Self {
            phase: PuffPhase::Rise,
            tween: Tween::linear(PUFF_PHASE_SECS),
            start_y,
            size,
        }
    }
}

#[derive(SystemParam)]
pub struct EffectSpawner<'w, 's> {
    commands: Commands<'w, 's>,
    pool: ResMut<'w, MeshPool>,
    player: ResMut<'w, EffectPlayer>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    cache: Res<'w, AssetCache>,
}

impl EffectSpawner<'_, '_> {
    /// Play the smoke puff at `pos`, `size` world units across.
    pub fn smoke(&mut self, pos: Vec3, size: Vec2) -> Entity {
        self.spawn(SMOKE_TEXTURE, pos, size)
    }

    pub fn spawn(&mut self, texture: &'static str, pos: Vec3, size: Vec2) -> Entity {
        let quad = self
            .player
            .quad
            .get_or_insert_with(|| self.meshes.add(Rectangle::new(1.0, 1.0)))
            .clone();
        let image = self.cache.get::<Image>(texture);
        let materials = &mut self.materials;

        let acquired = self.pool.acquire(
            &mut self.commands,
            VisualKey::Effect(texture),
            |commands, _| {
                let material = materials.add(StandardMaterial {
                    base_color_texture: image,
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                });
                commands
                    .spawn((Mesh3d(quad), MeshMaterial3d(material), Transform::default()))
                    .id()
            },
        );
        if !acquired.reused {
            self.player.spawned += 1;
        }

        self.commands.entity(acquired.handle).insert((
            SmokePuff::new(pos.y, size),
            Transform::from_translation(pos)
                .with_rotation(Quat::from_rotation_x(BILLBOARD_PITCH))
                .with_scale(Vec3::ZERO),
        ));
        acquired.handle
    }
}

/// Rise for one phase (scale, opacity and height follow progress), then fade
/// out and hand the quad back to the pool.
pub fn animate_smoke_puffs(
    time: Res<Time>,
    mut commands: Commands,
    mut pool: ResMut<MeshPool>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(
        Entity,
        &mut SmokePuff,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
        Option<&PoolTag>,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut puff, mut transform, material, tag) in &mut query {
        let p = puff.tween.advance(dt);
        let (opacity, scale) = match puff.phase {
            PuffPhase::Rise => {
                transform.translation.y = puff.start_y + p * PUFF_RISE;
                (p, p)
            }
            PuffPhase::Fade => (1.0 - p, 1.0 - p),
        };
        transform.scale = (puff.size * scale).extend(1.0);
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.base_color.set_alpha(opacity);
        }

        if !puff.tween.is_finished() {
            continue;
        }
        match puff.phase {
            PuffPhase::Rise => {
                puff.phase = PuffPhase::Fade;
                puff.tween = Tween::linear(PUFF_PHASE_SECS);
            }
            PuffPhase::Fade => {
                commands.entity(entity).remove::<SmokePuff>();
                if let Err(err) = pool.release(&mut commands, entity, tag) {
                    warn!("[Pool] Could not recycle smoke puff {:?}: {}", entity, err);
                }
            }
        }
    }
}
