//! Runtime tunables
//!
//! One explicit configuration struct owned by the control loop and passed by
//! reference to the simulation, the command handlers and the effects.

use smart_leds::RGB8;

use super::layout::{PanelLayout, MAX_STARS};

/// Baseline minimum speed (columns per second)
pub const BASELINE_MIN_SPEED: f32 = 8.0;

/// Baseline maximum speed (columns per second)
pub const BASELINE_MAX_SPEED: f32 = 25.0;

/// Default per-frame fade factor
pub const DEFAULT_FADE: f32 = 0.86;

/// Default target frame period
pub const DEFAULT_FRAME_MS: u32 = 20;

/// Default star colour (warm amber)
pub const DEFAULT_COLOR: RGB8 = RGB8 {
    r: 255,
    g: 191,
    b: 3,
};

/// Stars active right after boot
pub const DEFAULT_INITIAL_STARS: usize = 120;

/// Upper bound for `frame_ms`, exclusive
pub const MAX_FRAME_MS: u32 = 1000;

/// Simulation tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Lower bound for randomised star velocity
    pub min_speed: f32,
    /// Upper bound for randomised star velocity
    pub max_speed: f32,
    /// Multiplier applied to every channel once per frame
    pub fade: f32,
    /// Target frame period
    pub frame_ms: u32,
    /// Respawned stars pick a random row
    pub random_rows: bool,
    /// Stars leaving on the right re-enter on the left instead of respawning
    pub wrap: bool,
    /// Colour given to randomised stars
    pub color: RGB8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_speed: BASELINE_MIN_SPEED,
            max_speed: BASELINE_MAX_SPEED,
            fade: DEFAULT_FADE,
            frame_ms: DEFAULT_FRAME_MS,
            random_rows: true,
            wrap: false,
            color: DEFAULT_COLOR,
        }
    }
}

impl SimConfig {
    /// Velocity range with bounds ordered low to high
    pub fn speed_range(&self) -> (f32, f32) {
        if self.min_speed <= self.max_speed {
            (self.min_speed, self.max_speed)
        } else {
            (self.max_speed, self.min_speed)
        }
    }
}

/// Value checks shared by the config file and the `config:set` command
pub mod limits {
    use super::{MAX_FRAME_MS, MAX_STARS};

    pub fn star_count(v: i32) -> bool {
        v >= 0 && v as usize <= MAX_STARS
    }

    pub fn speed(v: f32) -> bool {
        v > 0.0 && v.is_finite()
    }

    pub fn fade(v: f32) -> bool {
        (0.0..=1.0).contains(&v)
    }

    pub fn frame_ms(v: i32) -> bool {
        v > 0 && (v as u32) < MAX_FRAME_MS
    }

    pub fn channel(v: i32) -> bool {
        (0..=255).contains(&v)
    }
}

/// Idle animation settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleConfig {
    /// Run the idle cycle at all
    pub enabled: bool,
    /// Time without a keep-alive before the display counts as idle
    pub timeout_ms: u32,
    /// Star count restored after a cycle when none were active before it
    pub stars: usize,
    /// Pause between cycles
    pub rest_ms: u32,
    /// Buildup duration in seconds
    pub buildup_duration_s: f32,
    /// Buildup target multiplier
    pub buildup_multiplier: f32,
    /// Climax duration in seconds
    pub climax_duration_s: f32,
    /// Climax speed boost
    pub climax_boost: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 30_000,
            stars: DEFAULT_INITIAL_STARS,
            rest_ms: 5_000,
            buildup_duration_s: 10.0,
            buildup_multiplier: 5.0,
            climax_duration_s: 8.0,
            climax_boost: 2.0,
        }
    }
}

/// Everything loaded at boot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowConfig {
    pub layout: PanelLayout,
    pub sim: SimConfig,
    /// Stars active after boot
    pub initial_stars: usize,
    pub idle: IdleConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            layout: PanelLayout::default(),
            sim: SimConfig::default(),
            initial_stars: DEFAULT_INITIAL_STARS,
            idle: IdleConfig::default(),
        }
    }
}
