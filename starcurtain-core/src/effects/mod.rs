//! Transient effects
//!
//! Two timed effects temporarily override simulation parameters and per-star
//! state, then restore them from a snapshot taken at activation:
//!
//! - [`Buildup`]: stars speed up, then everything is restored
//! - [`Climax`]: stars spiral down to row 0 and fade, then the field is cleared
//!
//! Only one effect runs at a time. [`Effects`] owns both and enforces that.

pub mod buildup;
pub mod climax;
pub mod idle;
pub mod snapshot;

pub use buildup::Buildup;
pub use climax::Climax;
pub use idle::{IdleAction, IdleMonitor, IdlePhase, IdleSequencer};
pub use snapshot::{Snapshot, StarBackup};

use crate::config::SimConfig;
use crate::sim::Starfield;

/// Longest accepted effect duration in seconds
pub const MAX_DURATION_S: f32 = 120.0;

/// Largest Buildup target multiplier
pub const MAX_MULTIPLIER: f32 = 20.0;

/// Largest Climax speed boost
pub const MAX_BOOST: f32 = 10.0;

/// Effect parameter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectError {
    /// Duration outside (0, 120] seconds
    InvalidDuration,
    /// Multiplier outside (0, 20]
    InvalidMultiplier,
    /// Boost outside (0, 10]
    InvalidBoost,
}

impl EffectError {
    pub fn reason(&self) -> &'static str {
        match self {
            EffectError::InvalidDuration => "duration must be in (0, 120] seconds",
            EffectError::InvalidMultiplier => "multiplier must be in (0, 20]",
            EffectError::InvalidBoost => "boost must be in (0, 10]",
        }
    }
}

/// Validate a duration in seconds and convert it to milliseconds
pub(crate) fn duration_ms(duration_s: f32) -> Result<u64, EffectError> {
    if duration_s > 0.0 && duration_s <= MAX_DURATION_S {
        Ok(libm::roundf(duration_s * 1000.0) as u64)
    } else {
        Err(EffectError::InvalidDuration)
    }
}

/// Phase of one effect, as reported by `effect:status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectState {
    Inactive,
    /// Buildup multiplier still rising
    Ramp,
    /// Buildup holding at its target
    Hold,
    /// Climax running
    Spiral,
}

impl EffectState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectState::Inactive => "inactive",
            EffectState::Ramp => "ramp",
            EffectState::Hold => "hold",
            EffectState::Spiral => "spiral",
        }
    }
}

/// One-shot completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectEvent {
    BuildupDone,
    ClimaxDone,
}

impl EffectEvent {
    /// Command name of the completion notification
    pub fn notification(&self) -> &'static str {
        match self {
            EffectEvent::BuildupDone => "buildup_done",
            EffectEvent::ClimaxDone => "climax_done",
        }
    }
}

/// Both effects, at most one active
#[derive(Debug, Clone, Default)]
pub struct Effects<const CAP: usize> {
    buildup: Buildup<CAP>,
    climax: Climax<CAP>,
}

impl<const CAP: usize> Effects<CAP> {
    pub const fn new() -> Self {
        Self {
            buildup: Buildup::new(),
            climax: Climax::new(),
        }
    }

    /// Whether either effect is running
    pub fn is_active(&self) -> bool {
        self.buildup.is_active() || self.climax.is_active()
    }

    pub fn buildup_state(&self, now_ms: u64) -> EffectState {
        self.buildup.state(now_ms)
    }

    pub fn climax_state(&self) -> EffectState {
        self.climax.state()
    }

    /// Start Buildup, silently aborting a running Climax
    pub fn start_buildup(
        &mut self,
        now_ms: u64,
        duration_s: f32,
        multiplier: f32,
        field: &mut Starfield<CAP>,
        config: &mut SimConfig,
    ) -> Result<(), EffectError> {
        duration_ms(duration_s)?;
        if !(multiplier > 0.0 && multiplier <= MAX_MULTIPLIER) {
            return Err(EffectError::InvalidMultiplier);
        }
        self.climax.abort(field.stars_mut(), config);
        self.buildup
            .start(now_ms, duration_s, multiplier, field.stars_mut(), config)
    }

    /// Start Climax, silently aborting a running Buildup
    pub fn start_climax(
        &mut self,
        now_ms: u64,
        duration_s: f32,
        boost: f32,
        field: &mut Starfield<CAP>,
        config: &mut SimConfig,
    ) -> Result<(), EffectError> {
        duration_ms(duration_s)?;
        if !(boost > 0.0 && boost <= MAX_BOOST) {
            return Err(EffectError::InvalidBoost);
        }
        self.buildup.abort(field.stars_mut(), config);
        self.climax
            .start(now_ms, duration_s, boost, field.stars_mut(), config)
    }

    /// Advance whichever effect is running
    ///
    /// Returns the completion event on the update an effect finishes.
    pub fn update(
        &mut self,
        now_ms: u64,
        field: &mut Starfield<CAP>,
        config: &mut SimConfig,
    ) -> Option<EffectEvent> {
        if self.buildup.update(now_ms, field.stars_mut(), config) {
            return Some(EffectEvent::BuildupDone);
        }

        let height = field.layout().height;
        if self.climax.update(now_ms, field.stars_mut(), config, height) {
            field.clear();
            return Some(EffectEvent::ClimaxDone);
        }

        None
    }

    /// Stop both effects, restore, and release their snapshots
    pub fn cleanup(&mut self, field: &mut Starfield<CAP>, config: &mut SimConfig) {
        self.buildup.cleanup(field.stars_mut(), config);
        self.climax.cleanup(field.stars_mut(), config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelLayout;
    use crate::sim::StarOverrides;

    fn field() -> (Starfield<16>, SimConfig) {
        let config = SimConfig::default();
        let mut field = Starfield::new(PanelLayout::new(2, 4, 6), 42);
        field.add_many(6, &config, &StarOverrides::default());
        (field, config)
    }

    #[test]
    fn test_duration_bounds() {
        assert_eq!(duration_ms(10.0), Ok(10_000));
        assert_eq!(duration_ms(120.0), Ok(120_000));
        assert_eq!(duration_ms(0.0), Err(EffectError::InvalidDuration));
        assert_eq!(duration_ms(120.01), Err(EffectError::InvalidDuration));
        assert_eq!(duration_ms(f32::NAN), Err(EffectError::InvalidDuration));
    }

    #[test]
    fn test_buildup_then_notification() {
        let (mut field, mut config) = field();
        let original: [f32; 6] = core::array::from_fn(|i| field.stars()[i].vx);
        let mut effects = Effects::<16>::new();

        effects
            .start_buildup(0, 10.0, 5.0, &mut field, &mut config)
            .unwrap();
        assert_eq!(effects.update(3_000, &mut field, &mut config), None);
        assert_eq!(effects.buildup_state(3_000), EffectState::Ramp);

        assert_eq!(
            effects.update(10_000, &mut field, &mut config),
            Some(EffectEvent::BuildupDone)
        );
        for (star, vx) in field.stars().iter().zip(original.iter()) {
            assert_eq!(star.vx, *vx);
        }
        assert!(!effects.is_active());
    }

    #[test]
    fn test_climax_clears_field() {
        let (mut field, mut config) = field();
        let mut effects = Effects::<16>::new();
        effects
            .start_climax(0, 2.0, 2.0, &mut field, &mut config)
            .unwrap();
        effects.update(1_000, &mut field, &mut config);
        assert_eq!(field.active(), 6);

        assert_eq!(
            effects.update(2_000, &mut field, &mut config),
            Some(EffectEvent::ClimaxDone)
        );
        assert_eq!(field.active(), 0);
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_starting_one_aborts_the_other() {
        let (mut field, mut config) = field();
        let original: [f32; 6] = core::array::from_fn(|i| field.stars()[i].vx);
        let mut effects = Effects::<16>::new();

        effects
            .start_buildup(0, 10.0, 5.0, &mut field, &mut config)
            .unwrap();
        effects.update(5_000, &mut field, &mut config);
        effects
            .start_climax(5_000, 8.0, 2.0, &mut field, &mut config)
            .unwrap();

        assert_eq!(effects.buildup_state(5_000), EffectState::Inactive);
        assert_eq!(effects.climax_state(), EffectState::Spiral);
        // Climax boost is applied to the restored, unscaled velocities
        assert_eq!(field.stars()[0].vx, original[0] * 2.0);
    }

    #[test]
    fn test_invalid_start_leaves_running_effect() {
        let (mut field, mut config) = field();
        let mut effects = Effects::<16>::new();
        effects
            .start_buildup(0, 10.0, 5.0, &mut field, &mut config)
            .unwrap();
        assert_eq!(
            effects.start_climax(0, 500.0, 2.0, &mut field, &mut config),
            Err(EffectError::InvalidDuration)
        );
        assert_eq!(effects.buildup_state(0), EffectState::Ramp);
    }

    #[test]
    fn test_cleanup_restores_everything() {
        let (mut field, mut config) = field();
        let original: [f32; 6] = core::array::from_fn(|i| field.stars()[i].vx);
        let mut effects = Effects::<16>::new();
        effects
            .start_buildup(0, 10.0, 5.0, &mut field, &mut config)
            .unwrap();
        effects.update(9_000, &mut field, &mut config);

        effects.cleanup(&mut field, &mut config);
        assert!(!effects.is_active());
        assert_eq!(field.stars()[3].vx, original[3]);
        assert_eq!(config, SimConfig::default());
    }
}
