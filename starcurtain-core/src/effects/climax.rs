//! Climax (spiral) effect
//!
//! Every star is boosted horizontally and pulled from its saved row down to
//! row 0 as the effect progresses, with a sideways wobble that dies out
//! towards the end, while its brightness fades by `1 - progress^1.5`. On
//! completion the global speeds are restored and the field is emptied.

use core::f32::consts::TAU;

use libm::{powf, roundf, sinf};

use crate::config::SimConfig;
use crate::sim::Star;

use super::snapshot::Snapshot;
use super::{duration_ms, EffectError, EffectState, MAX_BOOST};

/// Peak wobble in rows at the start of the effect
const WOBBLE_ROWS: f32 = 1.5;

/// Wobble frequency
const WOBBLE_HZ: f32 = 1.2;

/// Phase offset between neighbouring stars, in radians
const WOBBLE_PHASE_STEP: f32 = 0.9;

/// Row offset of star `index` at `progress`, `t_s` seconds in
pub fn wobble(index: usize, progress: f32, t_s: f32) -> f32 {
    let phase = TAU * WOBBLE_HZ * t_s + index as f32 * WOBBLE_PHASE_STEP;
    WOBBLE_ROWS * (1.0 - progress) * sinf(phase)
}

/// Brightness factor at `progress`
pub fn fade_at(progress: f32) -> f32 {
    1.0 - powf(progress, 1.5)
}

/// Climax state and its snapshot
#[derive(Debug, Clone)]
pub struct Climax<const CAP: usize> {
    active: bool,
    start_ms: u64,
    duration_ms: u64,
    boost: f32,
    snapshot: Snapshot<CAP>,
}

impl<const CAP: usize> Default for Climax<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Climax<CAP> {
    pub const fn new() -> Self {
        Self {
            active: false,
            start_ms: 0,
            duration_ms: 0,
            boost: 1.0,
            snapshot: Snapshot::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> EffectState {
        if self.active {
            EffectState::Spiral
        } else {
            EffectState::Inactive
        }
    }

    /// Start (or restart) the effect and apply the speed boost immediately
    pub fn start(
        &mut self,
        now_ms: u64,
        duration_s: f32,
        boost: f32,
        stars: &mut [Star],
        config: &mut SimConfig,
    ) -> Result<(), EffectError> {
        let duration_ms = duration_ms(duration_s)?;
        if !(boost > 0.0 && boost <= MAX_BOOST) {
            return Err(EffectError::InvalidBoost);
        }

        if self.active {
            self.restore(stars, config);
        }

        self.snapshot.capture(stars, config);
        self.active = true;
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.boost = boost;

        for (saved, star) in self.snapshot.pairs(stars) {
            star.vx = saved.vx * boost;
        }
        self.snapshot.apply_speeds(config, boost);
        Ok(())
    }

    /// Advance to `now_ms`
    ///
    /// Returns `true` on the update that completes the effect. The caller is
    /// responsible for clearing the star field at that point.
    pub fn update(
        &mut self,
        now_ms: u64,
        stars: &mut [Star],
        config: &mut SimConfig,
        height: usize,
    ) -> bool {
        if !self.active {
            return false;
        }

        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed >= self.duration_ms {
            self.snapshot.apply_speeds(config, 1.0);
            self.active = false;
            return true;
        }

        let progress = (elapsed as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        let t_s = elapsed as f32 / 1000.0;
        let max_row = height.saturating_sub(1) as f32;
        let fade = fade_at(progress);

        for (index, (saved, star)) in self.snapshot.pairs(stars).enumerate() {
            let base = saved.row as f32 * (1.0 - progress);
            let row = roundf(base + wobble(index, progress, t_s)).clamp(0.0, max_row);
            star.row = row as usize;
            star.vx = saved.vx * self.boost;
            star.brightness = saved.brightness * fade;
        }
        false
    }

    /// Stop without completing, restoring every star and the speeds
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
        self.snapshot.restore_all(stars);
        self.snapshot.settle_unsaved(stars);
        self.snapshot.apply_speeds(config, 1.0);
    }
}
