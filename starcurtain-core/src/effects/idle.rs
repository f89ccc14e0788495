//! Idle detection and the idle animation cycle
//!
//! The host sends `system:ping` keep-alives. When none arrive for the
//! configured timeout the display is idle, and the sequencer loops
//! Buildup -> Climax -> reset -> rest for as long as it stays idle.

use crate::config::IdleConfig;

use super::EffectEvent;

/// Keep-alive tracking
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleMonitor {
    /// Idle threshold
    timeout_ms: u32,
    /// Time since last keep-alive (ms)
    since_keepalive_ms: u32,
}

impl IdleMonitor {
    /// Create a monitor that starts out active (not idle)
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            since_keepalive_ms: 0,
        }
    }

    /// Record a keep-alive
    pub fn keepalive(&mut self) {
        self.since_keepalive_ms = 0;
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        self.since_keepalive_ms = self.since_keepalive_ms.saturating_add(delta_ms);
    }

    /// Whether the timeout has passed without a keep-alive
    pub fn is_idle(&self) -> bool {
        self.since_keepalive_ms >= self.timeout_ms
    }

    /// Time since the last keep-alive
    pub fn since_keepalive_ms(&self) -> u32 {
        self.since_keepalive_ms
    }
}

/// Where the idle cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdlePhase {
    /// Not cycling; waiting for the display to go idle
    Waiting,
    /// Idle Buildup running
    Buildup,
    /// Idle Climax running
    Climax,
    /// Pause after a reset
    Rest,
}

impl IdlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdlePhase::Waiting => "waiting",
            IdlePhase::Buildup => "buildup",
            IdlePhase::Climax => "climax",
            IdlePhase::Rest => "rest",
        }
    }
}

/// What the control loop should do next
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdleAction {
    None,
    StartBuildup { duration_s: f32, multiplier: f32 },
    StartClimax { duration_s: f32, boost: f32 },
    /// Bring back `stars` freshly randomised stars
    Reset { stars: usize },
}

/// Chains the idle cycle
///
/// Holds no effect state of its own; every cycle starts the effects afresh so
/// they take new snapshots.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleSequencer {
    config: IdleConfig,
    phase: IdlePhase,
    /// Star count captured when the cycle began
    restore_stars: usize,
    rest_until_ms: u64,
}

impl IdleSequencer {
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            phase: IdlePhase::Waiting,
            restore_stars: 0,
            rest_until_ms: 0,
        }
    }

    pub fn phase(&self) -> IdlePhase {
        self.phase
    }

    /// Abandon the current cycle and rest before trying again
    ///
    /// Used when an effect the cycle asked for could not be started.
    pub fn rest(&mut self, now_ms: u64) {
        if self.config.enabled {
            self.phase = IdlePhase::Rest;
            self.rest_until_ms = now_ms + self.config.rest_ms as u64;
        }
    }

    /// Step the cycle
    ///
    /// - `idle`: keep-alive timeout has passed
    /// - `effect_active`: any effect is currently running
    /// - `event`: completion event from this frame's effect update
    /// - `active_stars`: current live star count
    pub fn tick(
        &mut self,
        now_ms: u64,
        idle: bool,
        effect_active: bool,
        event: Option<EffectEvent>,
        active_stars: usize,
    ) -> IdleAction {
        if !self.config.enabled {
            return IdleAction::None;
        }

        match self.phase {
            IdlePhase::Waiting => {
                if idle && !effect_active {
                    self.restore_stars = if active_stars > 0 {
                        active_stars
                    } else {
                        self.config.stars
                    };
                    self.phase = IdlePhase::Buildup;
                    return IdleAction::StartBuildup {
                        duration_s: self.config.buildup_duration_s,
                        multiplier: self.config.buildup_multiplier,
                    };
                }
            }
            IdlePhase::Buildup => match event {
                Some(EffectEvent::BuildupDone) if idle => {
                    self.phase = IdlePhase::Climax;
                    return IdleAction::StartClimax {
                        duration_s: self.config.climax_duration_s,
                        boost: self.config.climax_boost,
                    };
                }
                Some(_) => self.phase = IdlePhase::Waiting,
                None if !effect_active => self.phase = IdlePhase::Waiting,
                None => {}
            },
            IdlePhase::Climax => match event {
                Some(EffectEvent::ClimaxDone) => {
                    self.phase = IdlePhase::Rest;
                    self.rest_until_ms = now_ms + self.config.rest_ms as u64;
                    return IdleAction::Reset {
                        stars: self.restore_stars,
                    };
                }
                Some(EffectEvent::BuildupDone) => self.phase = IdlePhase::Waiting,
                None if !effect_active => self.phase = IdlePhase::Waiting,
                None => {}
            },
            IdlePhase::Rest => {
                if now_ms >= self.rest_until_ms {
                    self.phase = IdlePhase::Waiting;
                }
            }
        }

        IdleAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_timeout() {
        let mut monitor = IdleMonitor::new(30_000);
        assert!(!monitor.is_idle());
        monitor.update_time(29_999);
        assert!(!monitor.is_idle());
        monitor.update_time(1);
        assert!(monitor.is_idle());

        monitor.keepalive();
        assert!(!monitor.is_idle());
        assert_eq!(monitor.since_keepalive_ms(), 0);
    }

    #[test]
    fn test_monitor_saturates() {
        let mut monitor = IdleMonitor::new(10);
        monitor.update_time(u32::MAX);
        monitor.update_time(u32::MAX);
        assert!(monitor.is_idle());
    }

    #[test]
    fn test_full_cycle() {
        let config = IdleConfig::default();
        let mut seq = IdleSequencer::new(config);

        assert_eq!(seq.tick(0, false, false, None, 50), IdleAction::None);

        assert_eq!(
            seq.tick(100, true, false, None, 50),
            IdleAction::StartBuildup {
                duration_s: config.buildup_duration_s,
                multiplier: config.buildup_multiplier,
            }
        );
        assert_eq!(seq.phase(), IdlePhase::Buildup);
        assert_eq!(seq.tick(200, true, true, None, 50), IdleAction::None);

        assert_eq!(
            seq.tick(300, true, false, Some(EffectEvent::BuildupDone), 50),
            IdleAction::StartClimax {
                duration_s: config.climax_duration_s,
                boost: config.climax_boost,
            }
        );
        assert_eq!(seq.phase(), IdlePhase::Climax);

        assert_eq!(
            seq.tick(400, true, false, Some(EffectEvent::ClimaxDone), 0),
            IdleAction::Reset { stars: 50 }
        );
        assert_eq!(seq.phase(), IdlePhase::Rest);

        assert_eq!(seq.tick(401, true, false, None, 50), IdleAction::None);
        assert_eq!(seq.phase(), IdlePhase::Rest);
        seq.tick(400 + config.rest_ms as u64, true, false, None, 50);
        assert_eq!(seq.phase(), IdlePhase::Waiting);

        // Still idle: next cycle starts
        assert!(matches!(
            seq.tick(6_000, true, false, None, 50),
            IdleAction::StartBuildup { .. }
        ));
    }

    #[test]
    fn test_keepalive_stops_chaining() {
        let mut seq = IdleSequencer::new(IdleConfig::default());
        seq.tick(0, true, false, None, 10);
        assert_eq!(
            seq.tick(100, false, false, Some(EffectEvent::BuildupDone), 10),
            IdleAction::None
        );
        assert_eq!(seq.phase(), IdlePhase::Waiting);
    }

    #[test]
    fn test_empty_field_restores_configured_stars() {
        let config = IdleConfig {
            stars: 77,
            ..IdleConfig::default()
        };
        let mut seq = IdleSequencer::new(config);
        seq.tick(0, true, false, None, 0);
        seq.tick(1, true, false, Some(EffectEvent::BuildupDone), 0);
        assert_eq!(
            seq.tick(2, true, false, Some(EffectEvent::ClimaxDone), 0),
            IdleAction::Reset { stars: 77 }
        );
    }

    #[test]
    fn test_waits_for_user_effect() {
        let mut seq = IdleSequencer::new(IdleConfig::default());
        assert_eq!(seq.tick(0, true, true, None, 10), IdleAction::None);
        assert_eq!(seq.phase(), IdlePhase::Waiting);
    }

    #[test]
    fn test_aborted_effect_returns_to_waiting() {
        let mut seq = IdleSequencer::new(IdleConfig::default());
        seq.tick(0, true, false, None, 10);
        seq.tick(1, true, false, None, 10);
        assert_eq!(seq.phase(), IdlePhase::Waiting);
    }

    #[test]
    fn test_rest_after_failed_start() {
        let config = IdleConfig::default();
        let mut seq = IdleSequencer::new(config);
        assert!(matches!(
            seq.tick(0, true, false, None, 10),
            IdleAction::StartBuildup { .. }
        ));
        seq.rest(0);
        assert_eq!(seq.phase(), IdlePhase::Rest);
        assert_eq!(seq.tick(1, true, false, None, 10), IdleAction::None);
        assert_eq!(seq.phase(), IdlePhase::Rest);

        seq.tick(config.rest_ms as u64, true, false, None, 10);
        assert_eq!(seq.phase(), IdlePhase::Waiting);
    }

    #[test]
    fn test_disabled() {
        let config = IdleConfig {
            enabled: false,
            ..IdleConfig::default()
        };
        let mut seq = IdleSequencer::new(config);
        assert_eq!(seq.tick(0, true, false, None, 10), IdleAction::None);
    }
}
