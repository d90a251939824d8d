//! Player domain: the garden cursor and placing units on click.
//!
//! The cursor is a flat quad that snaps to tile centres under the mouse and
//! is tinted by what the selected item could do there. Releasing the left
//! button over the garden publishes `Click` and, if the tile accepts the
//! selected item, plants it with a puff of smoke.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::PI;

use crate::events::PublishEvent;
use crate::garden::{ground_point, permission_at_ray_hit, HitBuffer, TileGrid};
use crate::input::PointerInput;
use crate::pool::effects::EffectSpawner;
use crate::shared::*;

const VALID_COLOR: Color = Color::WHITE;
const OTHER_CATEGORY_COLOR: Color = Color::srgb(1.0, 0.533, 0.0);
const INVALID_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Side of the smoke puff played on placement, in world units.
const SMOKE_SIZE: f32 = 3.0;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorTarget>()
            .add_systems(OnEnter(GameState::Playing), spawn_cursor)
            .add_systems(
                Update,
                (update_cursor, place_on_release)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Component, Debug)]
pub struct GardenCursor;

/// Snapped world position under the mouse, if the mouse is over the ground.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct CursorTarget(pub Option<Vec3>);

/// How the cursor reads for the selected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Valid,
    OtherCategory,
    Invalid,
}

impl CursorState {
    pub fn color(self) -> Color {
        match self {
            CursorState::Valid => VALID_COLOR,
            CursorState::OtherCategory => OTHER_CATEGORY_COLOR,
            CursorState::Invalid => INVALID_COLOR,
        }
    }
}

/// Centre of the tile under `ground`, lifted just above it.
pub fn snap_to_tile(ground: Vec3) -> Vec3 {
    Vec3::new(
        ground.x.floor() + 0.5,
        ground.y + CURSOR_LIFT,
        ground.z.floor() + 0.5,
    )
}

pub fn cursor_state(grid: &TileGrid, item: ItemType, pos: Vec3, hits: &mut HitBuffer) -> CursorState {
    let tile = permission_at_ray_hit(grid, pos, hits);
    if !TileGrid::is_sentinel(tile) && tile.occupant.is_none() && tile.allows(item.category()) {
        CursorState::Valid
    } else if tile.croppable || tile.animals {
        CursorState::OtherCategory
    } else {
        CursorState::Invalid
    }
}

fn spawn_cursor(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        GardenCursor,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(TILE_SIZE, TILE_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: VALID_COLOR,
            unlit: true,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        ShadowFlags {
            cast: false,
            receive: false,
        },
    ));
}

fn update_cursor(
    input: Res<PointerInput>,
    grid: Res<TileGrid>,
    player: Res<PlayerData>,
    mut hits: ResMut<HitBuffer>,
    mut target: ResMut<CursorTarget>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursors: Query<
        (&mut Transform, &mut Visibility, &MeshMaterial3d<StandardMaterial>),
        With<GardenCursor>,
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = input.cursor.and_then(|cursor| {
        let (camera, camera_tf) = cameras.get_single().ok()?;
        let ray = camera.viewport_to_world(camera_tf, cursor).ok()?;
        ground_point(ray, &mut hits)
    });
    target.0 = ground.map(snap_to_tile);

    let Ok((mut transform, mut visibility, material)) = cursors.get_single_mut() else {
        return;
    };
    let Some(pos) = target.0 else {
        *visibility = Visibility::Hidden;
        return;
    };
    *visibility = Visibility::Visible;
    transform.translation = pos;

    let state = cursor_state(&grid, player.selected, pos, &mut hits);
    if let Some(mat) = materials.get_mut(&material.0) {
        mat.base_color = state.color();
    }
}

fn place_on_release(
    mut commands: Commands,
    input: Res<PointerInput>,
    target: Res<CursorTarget>,
    player: Res<PlayerData>,
    mut grid: ResMut<TileGrid>,
    mut hits: ResMut<HitBuffer>,
    mut effects: EffectSpawner,
) {
    if !input.released || input.over_ui {
        return;
    }
    let Some(pos) = target.0 else {
        return;
    };
    commands.queue(PublishEvent(GameEvent::Click(pos)));

    let item = player.selected;
    if cursor_state(&grid, item, pos, &mut hits) != CursorState::Valid
        || !grid.is_placeable(item, pos)
    {
        return;
    }

    effects.smoke(pos, Vec2::splat(SMOKE_SIZE));
    let facing = rand::thread_rng().gen_range(-PI..PI);
    match grid.place_unit(item, pos, facing) {
        Ok(_) => {
            info!("[Player] Planted {:?} at {:?}", item, pos);
            commands.queue(PublishEvent(GameEvent::SpawnUnit(item)));
        }
        Err(err) => warn!("[Player] Could not place {:?}: {}", item, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_tile_centre() {
        assert_eq!(snap_to_tile(Vec3::new(2.3, 0.0, -0.2)), Vec3::new(2.5, CURSOR_LIFT, -0.5));
        assert_eq!(snap_to_tile(Vec3::new(-3.0, 1.0, 4.99)), Vec3::new(-2.5, 1.0 + CURSOR_LIFT, 4.5));
    }

    #[test]
    fn test_cursor_state_colours() {
        let mut grid = TileGrid::new(10, 10);
        grid.fill_region(TilePermission::ANIMALS, 0, 0, 5, 10).unwrap();
        let mut hits = HitBuffer::default();
        let animal_tile = snap_to_tile(Vec3::new(-3.0, 0.0, 0.0));
        let bare_tile = snap_to_tile(Vec3::new(3.0, 0.0, 0.0));

        assert_eq!(cursor_state(&grid, ItemType::Cow, animal_tile, &mut hits), CursorState::Valid);
        assert_eq!(
            cursor_state(&grid, ItemType::Corn, animal_tile, &mut hits),
            CursorState::OtherCategory
        );
        assert_eq!(cursor_state(&grid, ItemType::Cow, bare_tile, &mut hits), CursorState::Invalid);
        assert_eq!(
            cursor_state(&grid, ItemType::Cow, Vec3::new(40.0, CURSOR_LIFT, 0.0), &mut hits),
            CursorState::Invalid
        );
    }
}
