//! Buildup effect
//!
//! Stars accelerate: for the first 70% of the duration the speed multiplier
//! ramps linearly from 1 to the target, then holds. Velocities are always
//! derived from the snapshot, never compounded. On completion every star's
//! velocity and the global speed bounds are restored exactly.

use crate::config::SimConfig;
use crate::sim::Star;

use super::snapshot::Snapshot;
use super::{duration_ms, EffectError, EffectState, MAX_MULTIPLIER};

/// Fraction of the duration spent ramping
pub const RAMP_FRACTION: f32 = 0.7;

/// Speed multiplier at `progress` (0..=1) towards `target`
pub fn multiplier_at(progress: f32, target: f32) -> f32 {
    if progress < RAMP_FRACTION {
        1.0 + (target - 1.0) * (progress / RAMP_FRACTION)
    } else {
        target
    }
}

/// Buildup state and its snapshot
#[derive(Debug, Clone)]
pub struct Buildup<const CAP: usize> {
    active: bool,
    start_ms: u64,
    duration_ms: u64,
    target: f32,
    multiplier: f32,
    snapshot: Snapshot<CAP>,
}

impl<const CAP: usize> Default for Buildup<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Buildup<CAP> {
    pub const fn new() -> Self {
        Self {
            active: false,
            start_ms: 0,
            duration_ms: 0,
            target: 1.0,
            multiplier: 1.0,
            snapshot: Snapshot::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Multiplier applied on the last update
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Start (or restart) the effect
    ///
    /// A restart first restores the old snapshot so the new one is taken from
    /// unscaled values.
    pub fn start(
        &mut self,
        now_ms: u64,
        duration_s: f32,
        target: f32,
        stars: &mut [Star],
        config: &mut SimConfig,
    ) -> Result<(), EffectError> {
        let duration_ms = duration_ms(duration_s)?;
        if !(target > 0.0 && target <= MAX_MULTIPLIER) {
            return Err(EffectError::InvalidMultiplier);
        }

        if self.active {
            self.restore(stars, config);
        }

        self.snapshot.capture(stars, config);
        self.active = true;
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.target = target;
        self.multiplier = 1.0;
        Ok(())
    }

    /// Progress through the effect, 0.0 to 1.0
    fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Current phase
    pub fn state(&self, now_ms: u64) -> EffectState {
        if !self.active {
            EffectState::Inactive
        } else if self.progress(now_ms) < RAMP_FRACTION {
            EffectState::Ramp
        } else {
            EffectState::Hold
        }
    }

    /// Advance to `now_ms`
    ///
    /// Returns `true` on the update that completes the effect.
    pub fn update(&mut self, now_ms: u64, stars: &mut [Star], config: &mut SimConfig) -> bool {
        if !self.active {
            return false;
        }

        if now_ms.saturating_sub(self.start_ms) >= self.duration_ms {
            self.restore(stars, config);
            self.active = false;
            return true;
        }

        self.multiplier = multiplier_at(self.progress(now_ms), self.target);
        for (saved, star) in self.snapshot.pairs(stars) {
            star.vx = saved.vx * self.multiplier;
        }
        self.snapshot.apply_speeds(config, self.multiplier);
        false
    }

    /// Stop without completing, restoring everything
    pub fn abort(&mut self, stars: &mut [Star], config: &mut SimConfig) {
        if self.active {
            self.restore(stars, config);
            self.active = false;
        }
    }

    /// Deactivate and drop the snapshot
    pub fn cleanup(&mut self, stars: &mut [Star], config: &mut SimConfig) {
        self.abort(stars, config);
        self.snapshot.clear();
    }

    fn restore(&mut self, stars: &mut [Star], config: &mut SimConfig) {
        self.snapshot.restore_velocities(stars);
        self.snapshot.settle_unsaved(stars);
        self.snapshot.apply_speeds(config, 1.0);
        self.multiplier = 1.0;
    }
}
