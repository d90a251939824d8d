use bevy::audio::{AudioSinkPlayback, Volume};
use bevy::prelude::*;

use crate::data::AssetCache;
use crate::events::{GameBus, Propagation};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// SOUND PATHS
// ═══════════════════════════════════════════════════════════════════════

pub const CLICK_SOUND: &str = "sounds/click_003.ogg";
pub const MUSIC_TRACK: &str = "sounds/theme.ogg";

/// Sound an item makes when it is placed.
pub fn spawn_sound(item: ItemType) -> Option<&'static str> {
    match item {
        ItemType::Sheep => Some("sounds/sheep.ogg"),
        ItemType::Cow => Some("sounds/cow.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SOUND PLAYER
// ═══════════════════════════════════════════════════════════════════════

/// Marker on the looping theme.
#[derive(Component, Debug)]
pub struct Music;

/// Spawn `path` at the player's volume. Missing sounds are skipped.
fn play(world: &mut World, path: &str, looped: bool) -> Option<Entity> {
    let handle = world.get_resource::<AssetCache>()?.get::<AudioSource>(path)?;
    let volume = world
        .get_resource::<PlayerData>()
        .map_or(1.0, |player| player.sound_volume);
    let settings = if looped {
        PlaybackSettings::LOOP
    } else {
        PlaybackSettings::DESPAWN
    };
    Some(
        world
            .spawn((AudioPlayer::new(handle), settings.with_volume(Volume::new(volume))))
            .id(),
    )
}

fn set_volume(world: &mut World, volume: f32) {
    let mut sinks = world.query::<&AudioSink>();
    for sink in sinks.iter(world) {
        sink.set_volume(volume);
    }
}

/// Hook the sound player onto the bus: clicks, placements and the mute toggle.
pub fn register_sound_listeners(world: &mut World) {
    if !world.contains_resource::<AssetCache>() {
        warn!("[Audio] No asset cache, sound disabled");
        return;
    }
    world.resource_scope(|_, mut bus: Mut<GameBus>| {
        let results = [
            bus.subscribe(GameEventKind::Click, |world, _| {
                play(world, CLICK_SOUND, false);
                Propagation::Continue
            }),
            bus.subscribe(GameEventKind::SpawnUnit, |world, event| {
                if let GameEvent::SpawnUnit(item) = event {
                    if let Some(path) = spawn_sound(*item) {
                        play(world, path, false);
                    }
                }
                Propagation::Continue
            }),
            bus.subscribe(GameEventKind::ToggleSound, |world, event| {
                if let GameEvent::ToggleSound(volume) = event {
                    set_volume(world, *volume);
                }
                Propagation::Continue
            }),
        ];
        for err in results.into_iter().filter_map(Result::err) {
            error!("[Audio] Could not register listener: {}", err);
        }
    });
}

/// Start the theme when entering Playing. Skipped if it is already running.
pub fn start_game_music(world: &mut World) {
    let mut music = world.query_filtered::<(), With<Music>>();
    if music.iter(world).next().is_some() {
        return;
    }
    match play(world, MUSIC_TRACK, true) {
        Some(entity) => {
            world.entity_mut(entity).insert(Music);
        }
        None => warn!("[Audio] Theme not loaded, playing without music"),
    }
}
