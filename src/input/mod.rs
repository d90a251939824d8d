use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerInput>()
            .add_systems(PreUpdate, read_pointer_input);
    }
}

/// Mouse state for this frame, as the garden sees it.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PointerInput {
    /// Cursor in window coordinates, `None` when outside the window.
    pub cursor: Option<Vec2>,
    pub pressed: bool,
    /// Left button went up this frame.
    pub released: bool,
    /// The cursor is over an interactive UI node, which gets the click instead.
    pub over_ui: bool,
}

/// The single point where mouse hardware becomes pointer state.
fn read_pointer_input(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Query<&Interaction>,
    mut input: ResMut<PointerInput>,
) {
    *input = PointerInput {
        cursor: windows.get_single().ok().and_then(Window::cursor_position),
        pressed: mouse.pressed(MouseButton::Left),
        released: mouse.just_released(MouseButton::Left),
        over_ui: buttons.iter().any(|interaction| *interaction != Interaction::None),
    };
}
