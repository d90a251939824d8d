//! Occupants of garden tiles.

use bevy::prelude::*;

use crate::shared::*;

/// Length of one idle loop, in seconds.
const IDLE_PERIOD: f32 = 2.0;

/// A looping idle clip. Time wraps at `period`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleAnimation {
    pub clip: &'static str,
    pub elapsed: f32,
    pub period: f32,
}

impl IdleAnimation {
    pub fn new(clip: &'static str) -> Self {
        Self {
            clip,
            elapsed: 0.0,
            period: IDLE_PERIOD,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.period <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + dt).rem_euclid(self.period);
    }

    /// Position in the loop, 0..1.
    pub fn phase(&self) -> f32 {
        if self.period <= 0.0 {
            0.0
        } else {
            self.elapsed / self.period
        }
    }
}

/// Idle clip name for an animal, `None` for crops.
pub fn idle_clip(item: ItemType) -> Option<&'static str> {
    match item {
        ItemType::Cow => Some("idle_cow"),
        ItemType::Sheep => Some("action_sheep"),
        _ => None,
    }
}

/// A crop or animal standing on a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthUnit {
    item: ItemType,
    stage: u8,
    position: Vec3,
    /// Yaw in radians.
    facing: f32,
    idle: Option<IdleAnimation>,
    visual: Option<Entity>,
}

impl GrowthUnit {
    pub fn new(item: ItemType, position: Vec3, facing: f32) -> Self {
        Self {
            item,
            stage: 1,
            position,
            facing,
            idle: idle_clip(item).map(IdleAnimation::new),
            visual: None,
        }
    }

    pub fn item(&self) -> ItemType {
        self.item
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn idle(&self) -> Option<&IdleAnimation> {
        self.idle.as_ref()
    }

    pub fn visual(&self) -> Option<Entity> {
        self.visual
    }

    pub fn set_visual(&mut self, visual: Option<Entity>) {
        self.visual = visual;
    }

    /// Grow one stage. Crops stop at the last stage; animals never grow.
    pub fn advance(&mut self) -> bool {
        if !self.item.is_crop() || self.stage >= self.item.stage_count() {
            return false;
        }
        self.stage += 1;
        true
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(idle) = self.idle.as_mut() {
            idle.update(dt);
        }
    }
}
