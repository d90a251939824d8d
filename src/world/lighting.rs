//! Day/night lighting.
//!
//! Each `DayTime` has a fixed light setup. Switching applies the colours at
//! once and sweeps the sun across the sky over one second.

use bevy::prelude::*;

use super::CAMERA_POSITION;
use crate::data::AssetCache;
use crate::events::{GameBus, Propagation};
use crate::shared::*;
use crate::tween::Tween;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug)]
pub struct Sun;

/// Sky picture hung behind the garden, swapped with the time of day.
#[derive(Component, Debug)]
pub struct Backdrop;

/// Moves the sun along x while its tween runs.
#[derive(Component, Debug, Clone)]
pub struct SunSweep {
    pub tween: Tween,
    pub from_x: f32,
    pub to_x: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// LIGHT CONFIG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    pub ambient_color: Color,
    pub ambient_brightness: f32,
    pub sun_color: Color,
    pub sun_illuminance: f32,
    pub clear_color: Color,
    /// Where the sun ends up along x.
    pub sun_x: f32,
}

const SUN_START: Vec3 = Vec3::new(-40.0, 60.0, -10.0);
const SWEEP_SECS: f32 = 1.0;

/// Distance from the camera to the backdrop, inside the far plane.
const BACKDROP_DISTANCE: f32 = 90.0;
/// Covers a 45° vertical view at `BACKDROP_DISTANCE` for a 16:9 window.
const BACKDROP_SIZE: Vec2 = Vec2::new(140.0, 80.0);

pub fn backdrop_path(time: DayTime) -> &'static str {
    match time {
        DayTime::Day => "images/bg/day.png",
        DayTime::Night => "images/bg/night.png",
    }
}

/// Centre of the backdrop, straight ahead of the camera.
pub fn backdrop_position() -> Vec3 {
    CAMERA_POSITION + (Vec3::ZERO - CAMERA_POSITION).normalize() * BACKDROP_DISTANCE
}

pub fn light_config(time: DayTime) -> LightConfig {
    match time {
        DayTime::Day => LightConfig {
            ambient_color: Color::srgb_u8(0xcc, 0xcc, 0xcc),
            ambient_brightness: 400.0,
            sun_color: Color::WHITE,
            sun_illuminance: 8_000.0,
            clear_color: Color::srgb_u8(0x87, 0xce, 0xeb),
            sun_x: 40.0,
        },
        DayTime::Night => LightConfig {
            ambient_color: Color::srgb_u8(0x40, 0x40, 0x60),
            ambient_brightness: 400.0,
            sun_color: Color::srgb_u8(0x50, 0x50, 0xaa),
            sun_illuminance: 1_000.0,
            clear_color: Color::srgb_u8(0x00, 0x10, 0x23),
            sun_x: -40.0,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_lights(
    mut commands: Commands,
    player: Res<PlayerData>,
    cache: Res<AssetCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = light_config(player.time);
    commands.insert_resource(AmbientLight {
        color: config.ambient_color,
        brightness: config.ambient_brightness,
    });
    commands.insert_resource(ClearColor(config.clear_color));
    commands.spawn((
        Sun,
        DirectionalLight {
            color: config.sun_color,
            illuminance: config.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_START.with_x(config.sun_x)).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Backdrop,
        Mesh3d(meshes.add(Rectangle::from_size(BACKDROP_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: cache.get::<Image>(backdrop_path(player.time)),
            unlit: true,
            cull_mode: None,
            ..default()
        })),
        Transform::from_translation(backdrop_position()).looking_at(CAMERA_POSITION, Vec3::Y),
        ShadowFlags {
            cast: false,
            receive: false,
        },
    ));
}

/// Apply a light setup and start the sun sweep from the opposite side.
fn set_day_time(world: &mut World, time: DayTime) {
    world.resource_mut::<PlayerData>().time = time;
    let config = light_config(time);

    world.insert_resource(AmbientLight {
        color: config.ambient_color,
        brightness: config.ambient_brightness,
    });
    world.insert_resource(ClearColor(config.clear_color));

    let mut suns = world.query_filtered::<(Entity, &mut DirectionalLight), With<Sun>>();
    let mut swept = Vec::new();
    for (entity, mut light) in suns.iter_mut(world) {
        light.color = config.sun_color;
        light.illuminance = config.sun_illuminance;
        swept.push(entity);
    }
    swap_backdrop(world, time);

    for entity in swept {
        world.entity_mut(entity).insert(SunSweep {
            tween: Tween::linear(SWEEP_SECS),
            from_x: -config.sun_x,
            to_x: config.sun_x,
        });
    }
    info!("[World] Time set to {:?}", time);
}

fn swap_backdrop(world: &mut World, time: DayTime) {
    let texture = world
        .get_resource::<AssetCache>()
        .and_then(|cache| cache.get::<Image>(backdrop_path(time)));
    let mut backdrops = world.query_filtered::<&MeshMaterial3d<StandardMaterial>, With<Backdrop>>();
    let handles: Vec<Handle<StandardMaterial>> =
        backdrops.iter(world).map(|material| material.0.clone()).collect();
    let Some(mut materials) = world.get_resource_mut::<Assets<StandardMaterial>>() else {
        return;
    };
    for handle in handles {
        if let Some(material) = materials.get_mut(&handle) {
            material.base_color_texture = texture.clone();
        }
    }
}

pub fn register_time_listener(world: &mut World) {
    world.resource_scope(|_, mut bus: Mut<GameBus>| {
        let registered = bus.subscribe(GameEventKind::ChangeTime, |world, event| {
            if let GameEvent::ChangeTime(time) = event {
                if world.contains_resource::<PlayerData>() {
                    set_day_time(world, *time);
                }
            }
            Propagation::Continue
        });
        if let Err(err) = registered {
            error!("[World] Could not listen for time changes: {}", err);
        }
    });
}

pub fn sweep_sun(
    time: Res<Time>,
    mut commands: Commands,
    mut suns: Query<(Entity, &mut SunSweep, &mut Transform), With<Sun>>,
) {
    for (entity, mut sweep, mut transform) in &mut suns {
        let p = sweep.tween.advance(time.delta_secs());
        transform.translation.x = sweep.from_x + (sweep.to_x - sweep.from_x) * p;
        *transform = transform.looking_at(Vec3::ZERO, Vec3::Y);
        if sweep.tween.is_finished() {
            commands.entity(entity).remove::<SunSweep>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_and_night_differ() {
        let day = light_config(DayTime::Day);
        let night = light_config(DayTime::Night);
        assert!(day.sun_illuminance > night.sun_illuminance);
        assert_eq!(day.sun_x, -night.sun_x);
        assert_ne!(day.clear_color, night.clear_color);
    }

    #[test]
    fn test_backdrop_faces_camera_inside_far_plane() {
        assert_ne!(backdrop_path(DayTime::Day), backdrop_path(DayTime::Night));
        let distance = backdrop_position().distance(CAMERA_POSITION);
        assert!((distance - BACKDROP_DISTANCE).abs() < 1e-3);
        assert!(distance < 100.0, "must stay inside the camera's far plane");
    }

    #[test]
    fn test_time_change_swaps_backdrop_texture() {
        let day: Handle<Image> = Handle::weak_from_u128(0x5eed_da7);
        let night: Handle<Image> = Handle::weak_from_u128(0x5eed_0017);
        let mut cache = AssetCache::default();
        cache.insert(backdrop_path(DayTime::Day), day.clone());
        cache.insert(backdrop_path(DayTime::Night), night.clone());

        let mut world = World::new();
        world.init_resource::<PlayerData>();
        world.insert_resource(cache);
        let mut materials = Assets::<StandardMaterial>::default();
        let material = materials.add(StandardMaterial {
            base_color_texture: Some(day.clone()),
            ..default()
        });
        world.insert_resource(materials);
        world.spawn((Backdrop, MeshMaterial3d(material.clone())));

        set_day_time(&mut world, DayTime::Night);
        let texture = |world: &World| {
            world
                .resource::<Assets<StandardMaterial>>()
                .get(&material)
                .and_then(|m| m.base_color_texture.clone())
        };
        assert_eq!(texture(&world), Some(night));
        assert_eq!(world.resource::<PlayerData>().time, DayTime::Night);

        set_day_time(&mut world, DayTime::Day);
        assert_eq!(texture(&world), Some(day));
    }
}
