use bevy::prelude::*;

use crate::data::{item_icon_path, AssetCache};
use crate::events::PublishEvent;
use crate::shared::*;
use crate::tutorial::UiAnchors;

pub const SLOT_SIZE: f32 = 130.0;
pub const ITEM_SIZE: f32 = 100.0;

const HOVER_SCALE: f32 = 1.2;
const PRESSED_SCALE: f32 = 0.6;
const SELECTED_TINT: Color = Color::srgb(0.55, 0.55, 0.55);

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudAction {
    ToggleSound,
    ToggleTime,
    SkipDay,
}

impl HudAction {
    /// Name the tutorial uses to point at this button.
    pub fn anchor_name(self) -> &'static str {
        match self {
            HudAction::ToggleSound => "SoundButton",
            HudAction::ToggleTime => "Sun",
            HudAction::SkipDay => "SkipDay",
        }
    }

    /// Centre of the button, origin bottom-left.
    pub fn screen_position(self) -> Vec2 {
        let y = SCREEN_HEIGHT - SLOT_SIZE;
        match self {
            HudAction::ToggleSound => Vec2::new(SLOT_SIZE, y),
            HudAction::ToggleTime => Vec2::new(SCREEN_WIDTH / 2.0 - SLOT_SIZE / 4.0, y),
            HudAction::SkipDay => Vec2::new(SCREEN_WIDTH - SLOT_SIZE, y),
        }
    }
}

/// A HUD button. Fires on release after being pressed.
#[derive(Component, Debug)]
pub struct HudButton {
    pub action: HudAction,
    armed: bool,
}

/// A slot in the item picker.
#[derive(Component, Debug)]
pub struct ItemSlot {
    pub item: ItemType,
    armed: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// LAYOUT
// ═══════════════════════════════════════════════════════════════════════

/// Absolute node of `size` centred on `center` (origin bottom-left).
pub fn centered_node(center: Vec2, size: f32) -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(center.x - size / 2.0),
        top: Val::Px(SCREEN_HEIGHT - center.y - size / 2.0),
        width: Val::Px(size),
        height: Val::Px(size),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

/// Centre of the picker slot for `item`: animals on the bottom row, crops above.
pub fn slot_position(item: ItemType) -> Vec2 {
    let (row, col) = match item.category() {
        UnitCategory::Animal => (0, ItemType::ANIMALS.iter().position(|i| *i == item)),
        UnitCategory::Crop => (1, ItemType::CROPS.iter().position(|i| *i == item)),
    };
    let col = col.unwrap_or_default();
    Vec2::new(SLOT_SIZE * (col + 1) as f32, SLOT_SIZE * (row + 1) as f32)
}

fn sound_icon(volume: f32) -> &'static str {
    if volume >= 1.0 {
        "images/ui/sound_on.png"
    } else {
        "images/ui/sound_off.png"
    }
}

fn time_icon(time: DayTime) -> &'static str {
    match time {
        DayTime::Day => "images/sun.png",
        DayTime::Night => "images/moon.png",
    }
}

fn button_icon(action: HudAction, player: &PlayerData) -> &'static str {
    match action {
        HudAction::ToggleSound => sound_icon(player.sound_volume),
        HudAction::ToggleTime => time_icon(player.time),
        HudAction::SkipDay => "images/skip_day.png",
    }
}

fn image(cache: &AssetCache, path: &str) -> Handle<Image> {
    cache.get::<Image>(path).unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HUD
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(
    mut commands: Commands,
    cache: Res<AssetCache>,
    player: Res<PlayerData>,
    mut anchors: ResMut<UiAnchors>,
) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            // ─── TOP BUTTONS ───
            for action in [HudAction::ToggleSound, HudAction::ToggleTime, HudAction::SkipDay] {
                let center = action.screen_position();
                anchors.0.insert(action.anchor_name().to_string(), center);
                parent.spawn((
                    HudButton { action, armed: false },
                    Button,
                    centered_node(center, SLOT_SIZE),
                    ImageNode::new(image(&cache, button_icon(action, &player))),
                    Name::new(action.anchor_name()),
                ));
            }

            // ─── ITEM PICKER ───
            for item in ItemType::ANIMALS.into_iter().chain(ItemType::CROPS) {
                parent
                    .spawn((
                        ItemSlot { item, armed: false },
                        Button,
                        centered_node(slot_position(item), SLOT_SIZE),
                        ImageNode::new(image(&cache, "images/ui/default.png")),
                    ))
                    .with_children(|slot| {
                        slot.spawn((
                            Node {
                                width: Val::Px(ITEM_SIZE),
                                height: Val::Px(ITEM_SIZE),
                                ..default()
                            },
                            ImageNode::new(image(&cache, &item_icon_path(item))),
                        ));
                    });
            }
        });
    info!("[UI] HUD ready, {} anchors", anchors.0.len());
}

// ═══════════════════════════════════════════════════════════════════════
// INTERACTION
// ═══════════════════════════════════════════════════════════════════════

pub fn hud_buttons(
    mut commands: Commands,
    mut player: ResMut<PlayerData>,
    mut buttons: Query<(&Interaction, &mut HudButton, &mut Transform), Changed<Interaction>>,
) {
    for (interaction, mut button, mut transform) in &mut buttons {
        let released = button.armed && *interaction == Interaction::Hovered;
        button.armed = *interaction == Interaction::Pressed;
        transform.scale = Vec3::splat(match interaction {
            Interaction::Pressed => PRESSED_SCALE,
            Interaction::Hovered => HOVER_SCALE,
            Interaction::None => 1.0,
        });
        if !released {
            continue;
        }

        let event = match button.action {
            HudAction::ToggleSound => {
                player.sound_volume = if player.sound_volume >= 1.0 { 0.0 } else { 1.0 };
                GameEvent::ToggleSound(player.sound_volume)
            }
            HudAction::ToggleTime => GameEvent::ChangeTime(player.time.toggled()),
            HudAction::SkipDay => GameEvent::AdvanceDay,
        };
        commands.queue(PublishEvent(event));
    }
}

pub fn item_slots(
    mut player: ResMut<PlayerData>,
    mut slots: Query<(&Interaction, &mut ItemSlot), Changed<Interaction>>,
) {
    for (interaction, mut slot) in &mut slots {
        let released = slot.armed && *interaction == Interaction::Hovered;
        slot.armed = *interaction == Interaction::Pressed;
        if released && player.selected != slot.item {
            player.selected = slot.item;
            info!("[UI] Selected {:?}", slot.item);
        }
    }
}

/// Selected slot is greyed out; hovered slots use the hover frame.
pub fn refresh_slots(
    player: Res<PlayerData>,
    cache: Res<AssetCache>,
    mut slots: Query<(&ItemSlot, &Interaction, &mut ImageNode)>,
) {
    for (slot, interaction, mut node) in &mut slots {
        let (frame, tint) = if slot.item == player.selected {
            ("images/ui/default.png", SELECTED_TINT)
        } else if *interaction == Interaction::None {
            ("images/ui/default.png", Color::WHITE)
        } else {
            ("images/ui/hover.png", Color::WHITE)
        };
        let frame = image(&cache, frame);
        if node.image != frame {
            node.image = frame;
        }
        if node.color != tint {
            node.color = tint;
        }
    }
}

pub fn refresh_icons(
    player: Res<PlayerData>,
    cache: Res<AssetCache>,
    mut buttons: Query<(&HudButton, &mut ImageNode)>,
) {
    if !player.is_changed() {
        return;
    }
    for (button, mut node) in &mut buttons {
        node.image = image(&cache, button_icon(button.action, &player));
    }
}
