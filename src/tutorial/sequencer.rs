//! Step interpreter for the tutorial pointer.
//!
//! Runs a queue of step lists one after another. Timed steps (move, show,
//! hide, click) park a tween in `suspended`; every `tick` advances it and
//! resumes the list once it finishes. All state lives in the struct, so a
//! list can be interrupted at any frame with `stop_current_action`.

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use super::script::{MoveTarget, Step};
use crate::shared::*;
use crate::tween::Tween;

pub const CLICK_SECS: f32 = 0.2;
pub const FADE_SECS: f32 = 0.2;

/// Resolves UI element names to screen positions (origin bottom-left).
pub trait AnchorLookup {
    fn anchor(&self, name: &str) -> Option<Vec2>;
}

impl AnchorLookup for HashMap<String, Vec2> {
    fn anchor(&self, name: &str) -> Option<Vec2> {
        self.get(name).copied()
    }
}

/// The on-screen finger driven by the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
    pub scale: f32,
    pub pressed: bool,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            pressed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
    Move { from: Vec2, to: Vec2 },
    Scale { from: f32, to: f32 },
    Press,
}

#[derive(Debug, Clone, PartialEq)]
struct Suspended {
    motion: Motion,
    tween: Tween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStatus {
    /// A list is running or waiting to run.
    Running,
    /// Nothing left to do.
    Idle,
}

#[derive(Debug, Clone, Default)]
struct ActiveList {
    steps: Vec<Step>,
    cursor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    pointer: Pointer,
    pending: VecDeque<Vec<Step>>,
    current: Option<ActiveList>,
    suspended: Option<Suspended>,
    aborted: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Queue step lists to run in order after whatever is already queued.
    pub fn play<I>(&mut self, lists: I)
    where
        I: IntoIterator<Item = Vec<Step>>,
    {
        self.pending.extend(lists);
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Abort the current list: the parked step resolves without finishing its
    /// tween and the remaining steps are skipped. The next list runs normally.
    pub fn stop_current_action(&mut self) {
        self.aborted = true;
        if let Some(suspended) = self.suspended.take() {
            if suspended.motion == Motion::Press {
                self.pointer.pressed = false;
            }
        }
    }

    /// Drop the current list and everything queued behind it.
    pub fn clear(&mut self) {
        self.stop_current_action();
        self.current = None;
        self.pending.clear();
    }

    /// Advance by `dt` seconds and run steps until one suspends, a reset
    /// yields, or nothing is left.
    pub fn tick(&mut self, dt: f32, anchors: &impl AnchorLookup) -> Result<SequencerStatus, GardenError> {
        let mut dt = dt;
        loop {
            if let Some(suspended) = self.suspended.as_mut() {
                let p = suspended.tween.advance(dt);
                dt = 0.0;
                apply_motion(&mut self.pointer, &suspended.motion, p);
                if !suspended.tween.is_finished() {
                    return Ok(SequencerStatus::Running);
                }
                if suspended.motion == Motion::Press {
                    self.pointer.pressed = false;
                }
                self.suspended = None;
            }

            let Some(list) = self.current.as_mut() else {
                match self.pending.pop_front() {
                    Some(steps) => {
                        self.current = Some(ActiveList { steps, cursor: 0 });
                        self.aborted = false;
                        continue;
                    }
                    None => return Ok(SequencerStatus::Idle),
                }
            };

            if self.aborted || list.cursor >= list.steps.len() {
                self.current = None;
                continue;
            }
            let step = list.steps[list.cursor].clone();
            list.cursor += 1;

            match step {
                Step::Reset => {
                    list.cursor = 0;
                    return Ok(SequencerStatus::Running);
                }
                Step::Click => {
                    self.pointer.pressed = true;
                    self.suspend(Motion::Press, CLICK_SECS);
                }
                Step::Show => {
                    if self.pointer.scale < 1.0 {
                        self.suspend(Motion::Scale { from: 0.0, to: 1.0 }, FADE_SECS);
                    }
                }
                Step::Hide => {
                    if self.pointer.scale != 0.0 {
                        self.suspend(Motion::Scale { from: 1.0, to: 0.0 }, FADE_SECS);
                    }
                }
                Step::InstantShow => self.pointer.scale = 1.0,
                Step::InstantHide => self.pointer.scale = 0.0,
                Step::SetPosition(position) => self.pointer.position = position,
                Step::MoveTo { target, duration } => {
                    let to = match target {
                        MoveTarget::Absolute(to) => to,
                        MoveTarget::Anchor { name, offset } => {
                            let origin = anchors
                                .anchor(&name)
                                .ok_or(GardenError::UnknownAnchor(name))?;
                            origin + offset
                        }
                    };
                    let from = self.pointer.position;
                    self.suspend(Motion::Move { from, to }, duration);
                }
            }
        }
    }

    fn suspend(&mut self, motion: Motion, duration: f32) {
        self.suspended = Some(Suspended {
            motion,
            tween: Tween::linear(duration),
        });
    }
}

fn apply_motion(pointer: &mut Pointer, motion: &Motion, p: f32) {
    match motion {
        Motion::Move { from, to } => pointer.position = from.lerp(*to, p),
        Motion::Scale { from, to } => pointer.scale = from + (to - from) * p,
        Motion::Press => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> HashMap<String, Vec2> {
        HashMap::from([("Sun".to_string(), Vec2::new(600.0, 590.0))])
    }

    fn run(seq: &mut Sequencer, frames: usize, dt: f32) -> SequencerStatus {
        let mut status = SequencerStatus::Idle;
        for _ in 0..frames {
            status = seq.tick(dt, &anchors()).unwrap();
        }
        status
    }

    #[test]
    fn test_lone_reset_loops_until_stopped() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Reset]]);

        assert_eq!(run(&mut seq, 100, 0.016), SequencerStatus::Running);

        seq.stop_current_action();
        assert_eq!(seq.tick(0.016, &anchors()), Ok(SequencerStatus::Idle));
        assert!(seq.is_idle());
        // Does not come back.
        assert_eq!(seq.tick(0.016, &anchors()), Ok(SequencerStatus::Idle));
    }

    #[test]
    fn test_move_suspends_across_frames() {
        let mut seq = Sequencer::new();
        seq.play([vec![
            Step::SetPosition(Vec2::ZERO),
            Step::MoveTo {
                target: MoveTarget::Absolute(Vec2::new(100.0, 0.0)),
                duration: 1.0,
            },
            Step::InstantHide,
        ]]);

        assert_eq!(seq.tick(0.0, &anchors()), Ok(SequencerStatus::Running));
        assert_eq!(seq.pointer().position, Vec2::ZERO);

        seq.tick(0.5, &anchors()).unwrap();
        assert!((seq.pointer().position.x - 50.0).abs() < 1e-3);
        assert_eq!(seq.pointer().scale, 1.0, "later steps have not run yet");

        assert_eq!(seq.tick(0.5, &anchors()), Ok(SequencerStatus::Idle));
        assert_eq!(seq.pointer().position, Vec2::new(100.0, 0.0));
        assert_eq!(seq.pointer().scale, 0.0);
    }

    #[test]
    fn test_anchor_relative_move() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::MoveTo {
            target: MoveTarget::Anchor {
                name: "Sun".to_string(),
                offset: Vec2::new(32.0, -65.0),
            },
            duration: 0.1,
        }]]);
        run(&mut seq, 3, 0.05);
        assert_eq!(seq.pointer().position, Vec2::new(632.0, 525.0));
    }

    #[test]
    fn test_unknown_anchor_is_an_error() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::MoveTo {
            target: MoveTarget::Anchor {
                name: "Moon".to_string(),
                offset: Vec2::ZERO,
            },
            duration: 1.0,
        }]]);
        assert_eq!(
            seq.tick(0.016, &anchors()),
            Err(GardenError::UnknownAnchor("Moon".to_string()))
        );
    }

    #[test]
    fn test_click_presses_then_releases() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Click]]);
        seq.tick(0.1, &anchors()).unwrap();
        assert!(seq.pointer().pressed);
        seq.tick(0.15, &anchors()).unwrap();
        assert!(!seq.pointer().pressed);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_show_and_hide_skip_when_already_there() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Show, Step::InstantShow]]);
        // Already at full scale: show does not suspend, list ends this tick.
        assert_eq!(seq.tick(0.0, &anchors()), Ok(SequencerStatus::Idle));

        seq.play([vec![Step::InstantHide, Step::Hide, Step::SetPosition(Vec2::ONE)]]);
        assert_eq!(seq.tick(0.0, &anchors()), Ok(SequencerStatus::Idle));
        assert_eq!(seq.pointer().position, Vec2::ONE);
    }

    #[test]
    fn test_hide_fades_scale() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Hide]]);
        seq.tick(0.0, &anchors()).unwrap();
        seq.tick(0.1, &anchors()).unwrap();
        assert!((seq.pointer().scale - 0.5).abs() < 1e-3);
        seq.tick(0.1, &anchors()).unwrap();
        assert_eq!(seq.pointer().scale, 0.0);
    }

    #[test]
    fn test_stop_skips_rest_of_list_and_starts_next() {
        let mut seq = Sequencer::new();
        seq.play([
            vec![
                Step::MoveTo {
                    target: MoveTarget::Absolute(Vec2::new(10.0, 10.0)),
                    duration: 1.0,
                },
                Step::InstantHide,
                Step::Reset,
            ],
            vec![Step::SetPosition(Vec2::new(-1.0, -1.0))],
        ]);
        seq.tick(0.5, &anchors()).unwrap();
        seq.stop_current_action();

        assert_eq!(seq.tick(0.016, &anchors()), Ok(SequencerStatus::Idle));
        assert_eq!(seq.pointer().scale, 1.0, "skipped step never ran");
        assert_eq!(seq.pointer().position, Vec2::new(-1.0, -1.0), "next list ran");
    }

    #[test]
    fn test_stop_during_click_lifts_finger() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Click, Step::Reset]]);
        seq.tick(0.05, &anchors()).unwrap();
        assert!(seq.pointer().pressed);
        seq.stop_current_action();
        assert!(!seq.pointer().pressed);
    }

    #[test]
    fn test_stop_before_any_list_does_not_leak() {
        let mut seq = Sequencer::new();
        seq.stop_current_action();
        seq.play([vec![Step::InstantHide]]);
        seq.tick(0.0, &anchors()).unwrap();
        assert_eq!(seq.pointer().scale, 0.0, "flag cleared for the new list");
    }

    #[test]
    fn test_clear_drops_queue() {
        let mut seq = Sequencer::new();
        seq.play([vec![Step::Reset], vec![Step::InstantHide]]);
        seq.tick(0.0, &anchors()).unwrap();
        seq.clear();
        assert!(seq.is_idle());
        assert_eq!(seq.tick(0.0, &anchors()), Ok(SequencerStatus::Idle));
        assert_eq!(seq.pointer().scale, 1.0);
    }
}
