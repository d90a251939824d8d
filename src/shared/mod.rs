//! Shared components, resources, events, and states for Garden Plot.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly; cross-domain
//! traffic goes through the `GameBus` (see `crate::events`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS: everything the player can place on the garden
// ═══════════════════════════════════════════════════════════════════════

/// Which permission flag of a tile an item consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Crop,
    Animal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Cow,
    Sheep,
    Corn,
    Grape,
    Strawberry,
    Tomato,
}

impl ItemType {
    pub const ANIMALS: [ItemType; 2] = [ItemType::Sheep, ItemType::Cow];
    pub const CROPS: [ItemType; 4] = [
        ItemType::Corn,
        ItemType::Grape,
        ItemType::Strawberry,
        ItemType::Tomato,
    ];

    pub fn category(self) -> UnitCategory {
        match self {
            ItemType::Cow | ItemType::Sheep => UnitCategory::Animal,
            ItemType::Corn | ItemType::Grape | ItemType::Strawberry | ItemType::Tomato => {
                UnitCategory::Crop
            }
        }
    }

    pub fn is_animal(self) -> bool {
        self.category() == UnitCategory::Animal
    }

    pub fn is_crop(self) -> bool {
        self.category() == UnitCategory::Crop
    }

    /// Asset-side species name, used to build model and icon identifiers.
    pub fn species(self) -> &'static str {
        match self {
            ItemType::Cow => "cow",
            ItemType::Sheep => "sheep",
            ItemType::Corn => "corn",
            ItemType::Grape => "grape",
            ItemType::Strawberry => "strawberry",
            ItemType::Tomato => "tomato",
        }
    }

    /// Number of distinct growth stages with their own model.
    pub fn stage_count(self) -> u8 {
        match self.category() {
            UnitCategory::Crop => MAX_CROP_STAGE,
            UnitCategory::Animal => 1,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER DATA
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayTime {
    #[default]
    Day,
    Night,
}

impl DayTime {
    pub fn toggled(self) -> Self {
        match self {
            DayTime::Day => DayTime::Night,
            DayTime::Night => DayTime::Day,
        }
    }
}

/// Session-wide player choices: selected item, volume, time of day.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub selected: ItemType,
    pub sound_volume: f32,
    pub time: DayTime,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            selected: ItemType::Cow,
            sound_volume: 1.0,
            time: DayTime::Day,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG: populated by the data layer from assets/data/*.ron
// ═══════════════════════════════════════════════════════════════════════

/// Placement permissions of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TilePermission {
    pub croppable: bool,
    pub animals: bool,
}

impl TilePermission {
    pub const CROPS: TilePermission = TilePermission {
        croppable: true,
        animals: false,
    };
    pub const ANIMALS: TilePermission = TilePermission {
        croppable: false,
        animals: true,
    };
    pub const MIXED: TilePermission = TilePermission {
        croppable: true,
        animals: true,
    };
}

/// A rectangle of tiles that share one permission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionDef {
    pub permission: TilePermission,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Grid size and the zones carved into it, applied in order.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenLayout {
    pub width: usize,
    pub height: usize,
    pub regions: Vec<RegionDef>,
}

impl Default for GardenLayout {
    fn default() -> Self {
        Self {
            width: 28,
            height: 24,
            regions: vec![
                RegionDef { permission: TilePermission::CROPS, x: 0, y: 0, width: 11, height: 20 },
                RegionDef { permission: TilePermission::ANIMALS, x: 22, y: 4, width: 6, height: 5 },
                RegionDef { permission: TilePermission::MIXED, x: 18, y: 12, width: 10, height: 12 },
            ],
        }
    }
}

/// One tutorial step as written in the script file. Interpreted by
/// `tutorial::script`, which rejects unknown `action` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StepDef {
    pub action: String,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub duration: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDef {
    #[serde(default)]
    pub message: Option<String>,
    pub actions: Vec<StepDef>,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TutorialScriptDef {
    pub pages: Vec<PageDef>,
}

// ═══════════════════════════════════════════════════════════════════════
// BUS EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Closed set of event kinds the `GameBus` dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    SpawnUnit,
    Click,
    ToggleSound,
    ChangeTime,
    AdvanceDay,
}

impl GameEventKind {
    pub const ALL: [GameEventKind; 5] = [
        GameEventKind::SpawnUnit,
        GameEventKind::Click,
        GameEventKind::ToggleSound,
        GameEventKind::ChangeTime,
        GameEventKind::AdvanceDay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameEventKind::SpawnUnit => "spawn_unit",
            GameEventKind::Click => "click",
            GameEventKind::ToggleSound => "toggle_sound",
            GameEventKind::ChangeTime => "change_time",
            GameEventKind::AdvanceDay => "advance_day",
        }
    }
}

impl fmt::Display for GameEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameEventKind {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameEventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GardenError::UnknownEvent(s.to_string()))
    }
}

/// An event published on the `GameBus`, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A unit of this type was just placed.
    SpawnUnit(ItemType),
    /// The player clicked the garden at this world position.
    Click(Vec3),
    /// New master volume, 0.0 or 1.0 from the HUD toggle.
    ToggleSound(f32),
    ChangeTime(DayTime),
    AdvanceDay,
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::SpawnUnit(_) => GameEventKind::SpawnUnit,
            GameEvent::Click(_) => GameEventKind::Click,
            GameEvent::ToggleSound(_) => GameEventKind::ToggleSound,
            GameEvent::ChangeTime(_) => GameEventKind::ChangeTime,
            GameEvent::AdvanceDay => GameEventKind::AdvanceDay,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

/// Programmer-error conditions raised by the garden core.
///
/// None of these are retried. Glue systems log them and drop the offending
/// operation; the rest of the simulation keeps running.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GardenError {
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("tile ({x}, {y}) already has an occupant")]
    TileOccupied { x: i32, y: i32 },

    #[error("handle is not managed by any pool")]
    NotManaged,

    #[error("no pool exists for the handle's prototype")]
    UnknownPrototype,

    #[error("handle is not alive in its pool")]
    NotAlive,

    #[error("unknown event kind '{0}'")]
    UnknownEvent(String),

    #[error("unrecognized tutorial step: {0}")]
    UnrecognizedStep(String),

    #[error("no UI anchor named '{0}'")]
    UnknownAnchor(String),

    #[error("invalid config: {0}")]
    Config(String),
}

impl From<ron::error::SpannedError> for GardenError {
    fn from(err: ron::error::SpannedError) -> Self {
        GardenError::Config(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHARED COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Shadow capability of a scene node, set by whoever constructs it.
///
/// Render glue translates this into `NotShadowCaster`/`NotShadowReceiver`;
/// visual swaps copy it from the old node to the new one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowFlags {
    pub cast: bool,
    pub receive: bool,
}

impl Default for ShadowFlags {
    fn default() -> Self {
        Self {
            cast: true,
            receive: true,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const TILE_SIZE: f32 = 1.0;
pub const MAX_CROP_STAGE: u8 = 3;

/// Height of the invisible permission plane that pointer rays are cast onto.
pub const GRID_PLANE_Y: f32 = -1.8;
/// Cursor marker floats this far above the ground hit.
pub const CURSOR_LIFT: f32 = 0.4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_categories() {
        for item in ItemType::ANIMALS {
            assert!(item.is_animal());
            assert!(!item.is_crop());
            assert_eq!(item.stage_count(), 1);
        }
        for item in ItemType::CROPS {
            assert!(item.is_crop());
            assert_eq!(item.stage_count(), MAX_CROP_STAGE);
        }
    }

    #[test]
    fn test_event_kind_round_trips_through_name() {
        for kind in GameEventKind::ALL {
            assert_eq!(kind.name().parse::<GameEventKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_event_name_is_rejected() {
        assert_eq!(
            "harvest".parse::<GameEventKind>(),
            Err(GardenError::UnknownEvent("harvest".to_string()))
        );
    }

    #[test]
    fn test_event_kind_matches_payload() {
        assert_eq!(GameEvent::AdvanceDay.kind(), GameEventKind::AdvanceDay);
        assert_eq!(
            GameEvent::SpawnUnit(ItemType::Sheep).kind(),
            GameEventKind::SpawnUnit
        );
        assert_eq!(GameEvent::Click(Vec3::ZERO).kind(), GameEventKind::Click);
    }

    #[test]
    fn test_day_time_toggle() {
        assert_eq!(DayTime::Day.toggled(), DayTime::Night);
        assert_eq!(DayTime::Night.toggled(), DayTime::Day);
    }
}
