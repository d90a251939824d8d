//! Tutorial message box and the pointing finger.

use bevy::prelude::*;

use super::hud::centered_node;
use crate::data::AssetCache;
use crate::shared::*;
use crate::tutorial::{Pointer, Tutorial};

const BOX_WIDTH: f32 = 640.0;
const BOX_HEIGHT: f32 = 260.0;
const OK_SIZE: f32 = 90.0;
const FINGER_SIZE: f32 = 96.0;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct MessageBoxRoot;

#[derive(Component)]
pub struct MessageText;

#[derive(Component, Default)]
pub struct OkButton {
    armed: bool,
}

#[derive(Component)]
pub struct Finger;

fn image(cache: &AssetCache, path: &str) -> Handle<Image> {
    cache.get::<Image>(path).unwrap_or_default()
}

fn finger_image(pressed: bool) -> &'static str {
    if pressed {
        "images/ui/finger_down.png"
    } else {
        "images/ui/finger_up.png"
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_message_box(mut commands: Commands, cache: Res<AssetCache>) {
    let panel = image(&cache, "images/ui/headless.png");

    commands
        .spawn((
            MessageBoxRoot,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            GlobalZIndex(5),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(BOX_WIDTH),
                        height: Val::Px(BOX_HEIGHT),
                        flex_direction: FlexDirection::Column,
                        justify_content: JustifyContent::SpaceBetween,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(28.0)),
                        ..default()
                    },
                    ImageNode::new(panel.clone()),
                ))
                .with_children(|panel_node| {
                    panel_node.spawn((
                        MessageText,
                        Text::new(""),
                        TextFont {
                            font_size: 26.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.2, 0.15, 0.1)),
                        TextLayout::new_with_justify(JustifyText::Center),
                    ));

                    panel_node
                        .spawn((
                            OkButton::default(),
                            Button,
                            Node {
                                width: Val::Px(OK_SIZE),
                                height: Val::Px(OK_SIZE / 2.0),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            ImageNode::new(panel),
                        ))
                        .with_children(|button| {
                            button.spawn((
                                Text::new("OK"),
                                TextFont {
                                    font_size: 22.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(0.2, 0.15, 0.1)),
                            ));
                        });
                });
        });
}

pub fn spawn_finger(mut commands: Commands, cache: Res<AssetCache>) {
    commands.spawn((
        Finger,
        centered_node(Vec2::ZERO, FINGER_SIZE),
        ImageNode::new(image(&cache, finger_image(false))),
        Transform::from_scale(Vec3::ZERO),
        Visibility::Hidden,
        GlobalZIndex(10),
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// SYNC FROM TUTORIAL
// ═══════════════════════════════════════════════════════════════════════

pub fn sync_message_box(
    tutorial: Res<Tutorial>,
    mut roots: Query<&mut Visibility, With<MessageBoxRoot>>,
    mut texts: Query<&mut Text, With<MessageText>>,
) {
    if !tutorial.is_changed() {
        return;
    }
    let visible = tutorial.message_box.is_visible();
    for mut visibility in &mut roots {
        let wanted = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
    let message = tutorial.message_box.current_text().unwrap_or_default();
    for mut text in &mut texts {
        if text.0 != message {
            text.0 = message.to_string();
        }
    }
}

pub fn press_ok(
    mut tutorial: ResMut<Tutorial>,
    mut buttons: Query<(&Interaction, &mut OkButton), Changed<Interaction>>,
) {
    for (interaction, mut button) in &mut buttons {
        let released = button.armed && *interaction == Interaction::Hovered;
        button.armed = *interaction == Interaction::Pressed;
        if released {
            tutorial.advance_page();
        }
    }
}

/// Apply the sequencer's pointer to the finger node.
pub fn apply_pointer(pointer: &Pointer, node: &mut Node, transform: &mut Transform) {
    let placed = centered_node(pointer.position, FINGER_SIZE);
    node.left = placed.left;
    node.top = placed.top;
    transform.scale = Vec3::new(pointer.scale, pointer.scale, 1.0);
}

pub fn sync_finger(
    tutorial: Res<Tutorial>,
    cache: Res<AssetCache>,
    mut fingers: Query<(&mut Node, &mut Transform, &mut ImageNode, &mut Visibility), With<Finger>>,
) {
    let pointer = tutorial.sequencer.pointer();
    for (mut node, mut transform, mut image_node, mut visibility) in &mut fingers {
        apply_pointer(pointer, &mut node, &mut transform);
        let wanted = if pointer.scale > 0.0 && !tutorial.sequencer.is_idle() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
        let texture = image(&cache, finger_image(pointer.pressed));
        if image_node.image != texture {
            image_node.image = texture;
        }
    }
}
