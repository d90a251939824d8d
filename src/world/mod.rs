//! World domain plugin.
//!
//! Responsible for:
//! - The garden camera
//! - Ambient and sun lighting, switched between day and night over the bus

use bevy::prelude::*;

use crate::shared::*;

pub mod lighting;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(
                OnEnter(GameState::Playing),
                (lighting::spawn_lights, lighting::register_time_listener),
            )
            .add_systems(
                Update,
                lighting::sweep_sun.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Where the garden camera sits. It looks at the origin.
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 35.0, 30.0);

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45f32.to_radians(),
            near: 0.01,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
