//! Progress-driven tweens.
//!
//! A `Tween` is a plain state object: it knows how long it runs, how far it
//! got and how to ease. Whoever owns it calls `advance(dt)` once per frame and
//! applies the returned progress. Dropping a tween cancels it.

use bevy::prelude::*;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    /// Overshoots and settles, amplitude 1, period 0.3.
    ElasticOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::ElasticOut => {
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                let c4 = TAU / 3.0;
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    pub fn linear(duration: f32) -> Self {
        Self::new(duration, Easing::Linear)
    }

    /// Step forward by `dt` seconds and return the eased progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.progress()
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.easing.apply(1.0);
        }
        self.easing.apply(self.elapsed / self.duration)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Grows an entity's uniform scale from 0 to `target` along a tween.
#[derive(Component, Debug, Clone)]
pub struct ScaleIn {
    pub tween: Tween,
    pub target: f32,
}

impl ScaleIn {
    pub fn elastic(duration: f32, target: f32) -> Self {
        Self {
            tween: Tween::new(duration, Easing::ElasticOut),
            target,
        }
    }
}

pub fn drive_scale_in(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut ScaleIn, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut scale_in, mut transform) in &mut query {
        let p = scale_in.tween.advance(dt);
        transform.scale = Vec3::splat(p * scale_in.target);
        if scale_in.tween.is_finished() {
            commands.entity(entity).remove::<ScaleIn>();
        }
    }
}

pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drive_scale_in);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_tween_reaches_one_and_finishes() {
        let mut tween = Tween::linear(1.0);
        assert_eq!(tween.advance(0.25), 0.25);
        assert!(!tween.is_finished());
        assert_eq!(tween.advance(0.5), 0.75);
        assert_eq!(tween.advance(10.0), 1.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_tween_is_finished_at_once() {
        let mut tween = Tween::linear(0.0);
        assert!(tween.is_finished());
        assert_eq!(tween.advance(0.0), 1.0);
    }

    #[test]
    fn test_negative_dt_does_not_rewind() {
        let mut tween = Tween::linear(1.0);
        tween.advance(0.5);
        assert_eq!(tween.advance(-1.0), 0.5);
    }

    #[test]
    fn test_elastic_out_endpoints_and_overshoot() {
        assert_eq!(Easing::ElasticOut.apply(0.0), 0.0);
        assert_eq!(Easing::ElasticOut.apply(1.0), 1.0);
        let peak = (1..100)
            .map(|i| Easing::ElasticOut.apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0, "elastic.out should overshoot, peak was {peak}");
    }
}
