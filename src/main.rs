mod shared;
mod events;
mod tween;
mod pool;
mod data;
mod garden;
mod tutorial;
mod input;
mod player;
mod world;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Garden Plot".into(),
                resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<PlayerData>()
        // Core plumbing
        .add_plugins(data::DataPlugin)
        .add_plugins(events::EventsPlugin)
        .add_plugins(tween::TweenPlugin)
        .add_plugins(pool::PoolPlugin)
        // Domain plugins
        .add_plugins(garden::GardenPlugin)
        .add_plugins(tutorial::TutorialPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
