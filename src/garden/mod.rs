//! Garden domain: the tile grid, its occupants and their models.
//!
//! `TileGrid` is the single source of truth for what grows where. Rendering
//! follows it through `render::sync_unit_visuals`; nothing writes tile state
//! except the grid's own methods.

use bevy::prelude::*;

use crate::events::{GameBus, Propagation};
use crate::shared::*;

pub mod grid;
pub mod picking;
pub mod render;
pub mod unit;

pub use grid::{Tile, TileGrid};
pub use picking::{ground_point, permission_at_ray_hit, HitBuffer, RayHit};
pub use render::{GardenVisuals, Ground, UnitVisual};
pub use unit::{GrowthUnit, IdleAnimation};

pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileGrid>()
            .init_resource::<GardenVisuals>()
            .init_resource::<HitBuffer>()
            .add_systems(
                OnEnter(GameState::Playing),
                (configure_garden, register_garden_listeners, render::spawn_ground),
            )
            .add_systems(
                Update,
                (
                    tick_units,
                    render::sync_unit_visuals,
                    render::animate_idle,
                    render::apply_shadow_flags,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Rebuild the grid from the loaded `GardenLayout`.
pub fn configure_garden(layout: Option<Res<GardenLayout>>, mut grid: ResMut<TileGrid>) {
    let layout = layout.map(|layout| layout.clone()).unwrap_or_default();
    *grid = match TileGrid::from_layout(&layout) {
        Ok(grid) => grid,
        Err(err) => {
            error!("[Garden] Layout rejected ({}), using the built-in layout", err);
            match TileGrid::from_layout(&GardenLayout::default()) {
                Ok(grid) => grid,
                Err(err) => {
                    error!("[Garden] Built-in layout rejected too ({}), garden is empty", err);
                    TileGrid::new(layout.width, layout.height)
                }
            }
        }
    };
    info!("[Garden] Grid ready: {}x{}", grid.width(), grid.height());
}

/// Day tick: every occupant advances one stage.
pub fn register_garden_listeners(world: &mut World) {
    world.resource_scope(|_, mut bus: Mut<GameBus>| {
        let registered = bus.subscribe(GameEventKind::AdvanceDay, |world, _| {
            let Some(mut grid) = world.get_resource_mut::<TileGrid>() else {
                return Propagation::Continue;
            };
            let grown = grid.advance_day();
            info!("[Garden] Day advanced, {} units grew", grown);
            Propagation::Continue
        });
        if let Err(err) = registered {
            error!("[Garden] Could not listen for day ticks: {}", err);
        }
    });
}

pub fn tick_units(time: Res<Time>, mut grid: ResMut<TileGrid>) {
    grid.update(time.delta_secs());
}
