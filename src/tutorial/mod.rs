//! Tutorial domain: a scripted finger walks the player through the HUD while
//! the message box explains each part. Pressing OK moves to the next page,
//! which interrupts the finger's current loop.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

pub mod message_box;
pub mod script;
pub mod sequencer;

pub use message_box::{MessageBox, PageAdvance};
pub use script::{MoveTarget, Step, TutorialPage, TutorialScript};
pub use sequencer::{AnchorLookup, Pointer, Sequencer, SequencerStatus};

/// Screen positions of named HUD elements, origin bottom-left. Filled in by
/// the UI when it builds the HUD.
#[derive(Resource, Debug, Clone, Default)]
pub struct UiAnchors(pub HashMap<String, Vec2>);

impl AnchorLookup for UiAnchors {
    fn anchor(&self, name: &str) -> Option<Vec2> {
        self.0.anchor(name)
    }
}

#[derive(Resource, Debug, Default)]
pub struct Tutorial {
    pub sequencer: Sequencer,
    pub message_box: MessageBox,
}

impl Tutorial {
    /// Queue every message, open the first page, then queue the step lists.
    pub fn play_tutorial(&mut self, script: &TutorialScript) {
        self.message_box.reset();
        for message in script.messages() {
            self.message_box.add_page(message);
        }
        self.advance_page();
        self.sequencer
            .play(script.pages.iter().map(|page| page.steps.clone()));
    }

    /// OK pressed. A newly shown page interrupts the finger's current list.
    pub fn advance_page(&mut self) -> PageAdvance {
        let advance = self.message_box.advance_page();
        if let PageAdvance::Shown(page) = advance {
            debug!("[Tutorial] Page {}", page);
            self.sequencer.stop_current_action();
        }
        advance
    }

    /// Stop everything and hide the box.
    pub fn abort(&mut self) {
        self.sequencer.clear();
        self.message_box.reset();
        self.message_box.advance_page();
    }
}

pub fn start_tutorial(script: Option<Res<TutorialScriptDef>>, mut tutorial: ResMut<Tutorial>) {
    let Some(script) = script else {
        return;
    };
    match TutorialScript::try_from(&*script) {
        Ok(script) if script.pages.is_empty() => {}
        Ok(script) => {
            info!("[Tutorial] Starting with {} pages", script.pages.len());
            tutorial.play_tutorial(&script);
        }
        Err(err) => error!("[Tutorial] Script rejected, skipping tutorial: {}", err),
    }
}

/// Per-frame driver. A failing step ends the tutorial; the game carries on.
pub fn drive_tutorial(time: Res<Time>, anchors: Res<UiAnchors>, mut tutorial: ResMut<Tutorial>) {
    if tutorial.sequencer.is_idle() {
        return;
    }
    if let Err(err) = tutorial.sequencer.tick(time.delta_secs(), &*anchors) {
        error!("[Tutorial] Stopped: {}", err);
        tutorial.abort();
    }
}

pub struct TutorialPlugin;

impl Plugin for TutorialPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Tutorial>()
            .init_resource::<UiAnchors>()
            .add_systems(OnEnter(GameState::Playing), start_tutorial)
            .add_systems(Update, drive_tutorial.run_if(in_state(GameState::Playing)));
    }
}
