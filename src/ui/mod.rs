//! UI domain: HUD buttons, the item picker, the tutorial message box and
//! finger, and sound.

pub mod audio;
pub mod hud;
pub mod message_box;

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── HUD + TUTORIAL OVERLAY ───
        app.add_systems(
            OnEnter(GameState::Playing),
            (
                hud::spawn_hud,
                message_box::spawn_message_box,
                message_box::spawn_finger,
            ),
        );
        app.add_systems(
            Update,
            (
                hud::hud_buttons,
                hud::item_slots,
                hud::refresh_slots,
                hud::refresh_icons,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
        app.add_systems(
            Update,
            (
                message_box::press_ok,
                message_box::sync_message_box,
                message_box::sync_finger,
            )
                .chain()
                .after(crate::tutorial::drive_tutorial)
                .run_if(in_state(GameState::Playing)),
        );

        // ─── AUDIO ───
        app.add_systems(
            OnEnter(GameState::Playing),
            (audio::register_sound_listeners, audio::start_game_music).chain(),
        );
    }
}
