//! Visual synchronisation: keep pooled unit models in step with `TileGrid`.

use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use std::collections::HashMap;
use std::f32::consts::TAU;

use super::grid::TileGrid;
use crate::data::{ground_scene_path, unit_scene_path, AssetCache};
use crate::pool::{MeshPool, PoolTag, VisualKey};
use crate::shared::*;
use crate::tween::ScaleIn;

const SCALE_IN_SECS: f32 = 0.5;
const IDLE_BOB_HEIGHT: f32 = 0.05;

/// Marker for the ground scene.
#[derive(Component, Debug)]
pub struct Ground;

/// Marker for the model currently standing in for a unit.
#[derive(Component, Debug, Clone, Copy)]
pub struct UnitVisual {
    pub grid_x: i32,
    pub grid_y: i32,
}

/// (x, y) → entity showing the occupant of that tile.
#[derive(Resource, Debug, Default)]
pub struct GardenVisuals {
    pub units: HashMap<(i32, i32), Entity>,
}

pub fn spawn_ground(
    mut commands: Commands,
    server: Res<AssetServer>,
    mut cache: ResMut<AssetCache>,
    existing: Query<(), With<Ground>>,
) {
    if !existing.is_empty() {
        return;
    }
    let scene = cache.load::<Scene>(&server, &ground_scene_path());
    commands.spawn((
        Ground,
        SceneRoot(scene),
        Transform::default(),
        ShadowFlags::default(),
    ));
}

fn spawn_unit_model(commands: &mut Commands, scene: Handle<Scene>) -> Entity {
    commands.spawn((SceneRoot(scene), Transform::default())).id()
}

/// Spawn models for new occupants, swap models whose stage changed, and hand
/// models of vacated tiles back to the pool.
pub fn sync_unit_visuals(
    mut commands: Commands,
    mut grid: ResMut<TileGrid>,
    mut visuals: ResMut<GardenVisuals>,
    mut pool: ResMut<MeshPool>,
    mut cache: ResMut<AssetCache>,
    server: Res<AssetServer>,
    models: Query<(&Transform, Option<&ShadowFlags>, Option<&PoolTag>, Option<&ScaleIn>)>,
) {
    let mut seen = Vec::new();

    for (x, y, unit) in grid.occupied_mut() {
        seen.push((x, y));
        let key = VisualKey::unit(unit.item(), unit.stage());
        let current = visuals.units.get(&(x, y)).copied();

        // Up to date, or spawned this frame and not applied yet.
        let mut previous = None;
        if let Some(entity) = current {
            match models.get(entity) {
                Ok((_, _, Some(tag), _)) if tag.key() == &key => continue,
                Ok((transform, shadows, tag, scale_in)) => {
                    previous = Some((entity, *transform, shadows.copied(), tag, scale_in.cloned()));
                }
                Err(_) => continue,
            }
        }

        let scene = cache.load::<Scene>(&server, &unit_scene_path(unit.item(), unit.stage()));
        let acquired = pool.acquire(&mut commands, key, |commands, _| {
            spawn_unit_model(commands, scene)
        });
        let entity = acquired.handle;

        match previous {
            Some((old, transform, shadows, tag, scale_in)) => {
                if let Err(err) = pool.release(&mut commands, old, tag) {
                    warn!("[Garden] Could not recycle stage model {:?}: {}", old, err);
                }
                commands.entity(old).remove::<(UnitVisual, ScaleIn)>();
                commands.entity(entity).insert((
                    transform,
                    shadows.unwrap_or_default(),
                    UnitVisual { grid_x: x, grid_y: y },
                ));
                // An unfinished pop-in continues on the new stage model.
                if let Some(scale_in) = scale_in {
                    commands.entity(entity).insert(scale_in);
                }
                info!("[Garden] ({}, {}) {:?} grew to stage {}", x, y, unit.item(), unit.stage());
            }
            None => {
                let transform = Transform::from_translation(unit.position())
                    .with_rotation(Quat::from_rotation_y(unit.facing()))
                    .with_scale(Vec3::ZERO);
                commands.entity(entity).insert((
                    transform,
                    ShadowFlags::default(),
                    ScaleIn::elastic(SCALE_IN_SECS, 1.0),
                    UnitVisual { grid_x: x, grid_y: y },
                ));
            }
        }

        visuals.units.insert((x, y), entity);
        unit.set_visual(Some(entity));
    }

    let stale: Vec<(i32, i32)> = visuals
        .units
        .keys()
        .filter(|pos| !seen.contains(pos))
        .copied()
        .collect();
    for pos in stale {
        let Some(entity) = visuals.units.remove(&pos) else {
            continue;
        };
        let tag = models.get(entity).ok().and_then(|(_, _, tag, _)| tag);
        if let Err(err) = pool.release(&mut commands, entity, tag) {
            warn!("[Garden] Could not recycle model of vacated tile {:?}: {}", pos, err);
        }
        commands.entity(entity).remove::<(UnitVisual, ScaleIn)>();
    }
}

/// Push `ShadowFlags` down onto every mesh below the flagged entity. Scenes
/// spawn their meshes a few frames late, so this runs every frame.
pub fn apply_shadow_flags(
    mut commands: Commands,
    roots: Query<(Entity, &ShadowFlags)>,
    children: Query<&Children>,
    meshes: Query<(Has<NotShadowCaster>, Has<NotShadowReceiver>), With<Mesh3d>>,
) {
    for (root, flags) in &roots {
        for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
            let Ok((no_cast, no_receive)) = meshes.get(entity) else {
                continue;
            };
            if flags.cast == no_cast {
                if flags.cast {
                    commands.entity(entity).remove::<NotShadowCaster>();
                } else {
                    commands.entity(entity).insert(NotShadowCaster);
                }
            }
            if flags.receive == no_receive {
                if flags.receive {
                    commands.entity(entity).remove::<NotShadowReceiver>();
                } else {
                    commands.entity(entity).insert(NotShadowReceiver);
                }
            }
        }
    }
}

/// Bob animals up and down along their idle loop.
pub fn animate_idle(
    grid: Res<TileGrid>,
    visuals: Res<GardenVisuals>,
    mut transforms: Query<&mut Transform, With<UnitVisual>>,
) {
    for (x, y, unit) in grid.occupied() {
        let Some(idle) = unit.idle() else {
            continue;
        };
        let Some(entity) = visuals.units.get(&(x, y)) else {
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(*entity) {
            let bob = (idle.phase() * TAU).sin() * IDLE_BOB_HEIGHT;
            transform.translation.y = unit.position().y + bob;
        }
    }
}
