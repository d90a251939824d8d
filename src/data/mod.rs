//! Data layer: config parsing and asset preloading.
//!
//! This plugin runs in `GameState::Loading`. It parses the embedded RON
//! configs into `GardenLayout` and `TutorialScriptDef`, starts loading every
//! asset the game references through the memoizing `AssetCache`, and moves
//! to `GameState::Playing` once each asset has either loaded or failed.

use bevy::asset::{LoadState, UntypedAssetId};
use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

const GARDEN_RON: &str = include_str!("../../assets/data/garden.ron");
const TUTORIAL_RON: &str = include_str!("../../assets/data/tutorial.ron");

/// Label of the first scene inside a glTF file.
const SCENE_LABEL: &str = "#Scene0";

// ═══════════════════════════════════════════════════════════════════════
// ASSET CACHE
// ═══════════════════════════════════════════════════════════════════════

/// Identifier → handle memo. An identifier is loaded at most once.
#[derive(Resource, Debug, Default)]
pub struct AssetCache {
    handles: HashMap<String, UntypedHandle>,
}

impl AssetCache {
    pub fn load<A: Asset>(&mut self, server: &AssetServer, path: &str) -> Handle<A> {
        if let Some(handle) = self.get::<A>(path) {
            return handle;
        }
        let handle: Handle<A> = server.load(path.to_string());
        self.handles.insert(path.to_string(), handle.clone().untyped());
        handle
    }

    /// The handle for `path` if it was loaded before as an `A`.
    pub fn get<A: Asset>(&self, path: &str) -> Option<Handle<A>> {
        self.handles
            .get(path)
            .and_then(|handle| handle.clone().try_typed::<A>().ok())
    }

    pub fn insert<A: Asset>(&mut self, path: &str, handle: Handle<A>) {
        self.handles.insert(path.to_string(), handle.untyped());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.handles.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn ids(&self) -> impl Iterator<Item = (&str, UntypedAssetId)> {
        self.handles
            .iter()
            .map(|(path, handle)| (path.as_str(), handle.id()))
    }
}

/// Cache identifier of the scene for one growth stage of `item`.
pub fn unit_scene_path(item: ItemType, stage: u8) -> String {
    format!("models/{}_{}.glb{}", item.species(), stage, SCENE_LABEL)
}

pub fn ground_scene_path() -> String {
    format!("models/ground.glb{}", SCENE_LABEL)
}

pub fn item_icon_path(item: ItemType) -> String {
    format!("images/{}.png", item.species())
}

pub const UI_IMAGES: &[&str] = &[
    "images/sun.png",
    "images/moon.png",
    "images/bg/day.png",
    "images/bg/night.png",
    "images/skip_day.png",
    "images/ui/sound_on.png",
    "images/ui/sound_off.png",
    "images/ui/default.png",
    "images/ui/hover.png",
    "images/ui/headless.png",
    "images/ui/finger_up.png",
    "images/ui/finger_down.png",
    crate::pool::effects::SMOKE_TEXTURE,
];

pub const SOUNDS: &[&str] = &[
    "sounds/click_003.ogg",
    "sounds/sheep.ogg",
    "sounds/cow.ogg",
    "sounds/theme.ogg",
];

// ═══════════════════════════════════════════════════════════════════════
// CONFIG PARSING
// ═══════════════════════════════════════════════════════════════════════

pub fn parse_garden_layout(text: &str) -> Result<GardenLayout, GardenError> {
    let layout: GardenLayout = ron::from_str(text)?;
    if layout.width == 0 || layout.height == 0 {
        return Err(GardenError::Config(format!(
            "garden must have a non-empty grid, got {}x{}",
            layout.width, layout.height
        )));
    }
    Ok(layout)
}

pub fn parse_tutorial_script(text: &str) -> Result<TutorialScriptDef, GardenError> {
    Ok(ron::from_str(text)?)
}

fn load_configs(mut commands: Commands) {
    let layout = parse_garden_layout(GARDEN_RON).unwrap_or_else(|err| {
        error!("[Data] garden.ron rejected ({}), using the built-in layout", err);
        GardenLayout::default()
    });
    info!(
        "[Data] Garden layout: {}x{} with {} regions",
        layout.width,
        layout.height,
        layout.regions.len()
    );
    commands.insert_resource(layout);

    let script = parse_tutorial_script(TUTORIAL_RON).unwrap_or_else(|err| {
        error!("[Data] tutorial.ron rejected ({}), tutorial disabled", err);
        TutorialScriptDef::default()
    });
    info!("[Data] Tutorial pages: {}", script.pages.len());
    commands.insert_resource(script);
}

// ═══════════════════════════════════════════════════════════════════════
// PRELOADING
// ═══════════════════════════════════════════════════════════════════════

fn preload_assets(server: Res<AssetServer>, mut cache: ResMut<AssetCache>) {
    cache.load::<Scene>(&server, &ground_scene_path());
    for item in ItemType::ANIMALS.into_iter().chain(ItemType::CROPS) {
        for stage in 1..=item.stage_count() {
            cache.load::<Scene>(&server, &unit_scene_path(item, stage));
        }
        cache.load::<Image>(&server, &item_icon_path(item));
    }
    for path in UI_IMAGES {
        cache.load::<Image>(&server, path);
    }
    for path in SOUNDS {
        cache.load::<AudioSource>(&server, path);
    }
    info!("[Data] Preloading {} assets…", cache.len());
}

/// Leaves Loading once nothing is still in flight. Failed assets are logged
/// and left as empty handles; the game runs without them.
fn finish_loading(
    server: Res<AssetServer>,
    cache: Res<AssetCache>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut pending = 0;
    let mut failed = Vec::new();
    for (path, id) in cache.ids() {
        match server.load_state(id) {
            LoadState::Loaded => {}
            LoadState::Failed(_) => failed.push(path),
            _ => pending += 1,
        }
    }
    if pending > 0 {
        return;
    }
    for path in &failed {
        warn!("[Data] Asset failed to load: {}", path);
    }
    info!("[Data] Assets ready ({} failed)", failed.len());
    next_state.set(GameState::Playing);
}

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetCache>()
            .add_systems(OnEnter(GameState::Loading), (load_configs, preload_assets))
            .add_systems(Update, finish_loading.run_if(in_state(GameState::Loading)));
    }
}
