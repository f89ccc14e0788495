//! Star field simulation
//!
//! The pool is a fixed array; only the first `active` slots are live.
//! Removing a star just shrinks the live prefix, leaving the slot's data
//! inert until it is reused.

use libm::floorf;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smart_leds::RGB8;

use crate::config::{PanelLayout, SimConfig};
use crate::render::{map_pixel, FrameBuffer};

use super::star::{Star, StarOverrides, MAX_RANDOM_BRIGHTNESS, MIN_RANDOM_BRIGHTNESS};

/// Stars are drawn while within this many columns of the visible area
const RENDER_MARGIN: f32 = 2.0;

/// Spacing between trail segments, in columns
const TRAIL_STEP: f32 = 0.5;

/// Bounded pool of stars plus the RNG that feeds it
pub struct Starfield<const CAP: usize> {
    stars: [Star; CAP],
    active: usize,
    layout: PanelLayout,
    rng: SmallRng,
}

impl<const CAP: usize> Starfield<CAP> {
    /// Create an empty field; every slot is dark
    pub fn new(layout: PanelLayout, seed: u64) -> Self {
        Self {
            stars: [Star::DARK; CAP],
            active: 0,
            layout,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Randomise every slot and spread them across the visible width
    ///
    /// Used once at boot so the first stars do not arrive as one wave.
    pub fn seed(&mut self, config: &SimConfig) {
        let width = self.layout.total_width() as f32;
        let height = self.layout.height;
        for star in self.stars.iter_mut() {
            randomize(&mut self.rng, star, config, height, true);
            star.x = self.rng.gen_range(0.0..width);
        }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    /// Number of live stars
    pub fn active(&self) -> usize {
        self.active
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Free slots
    pub fn available(&self) -> usize {
        CAP - self.active
    }

    /// Live stars
    pub fn stars(&self) -> &[Star] {
        &self.stars[..self.active]
    }

    /// Live stars, mutable
    pub fn stars_mut(&mut self) -> &mut [Star] {
        &mut self.stars[..self.active]
    }

    /// Set the live count directly, clamped to capacity
    ///
    /// Slots brought back to life keep whatever data they last held.
    pub fn set_active(&mut self, count: usize) {
        self.active = count.min(CAP);
    }

    /// Set the live count, re-randomising any slot brought back to life
    pub fn grow_to(&mut self, count: usize, config: &SimConfig) {
        let count = count.min(CAP);
        let height = self.layout.height;
        if count > self.active {
            for star in self.stars[self.active..count].iter_mut() {
                randomize(&mut self.rng, star, config, height, true);
            }
        }
        self.active = count;
    }

    /// Re-randomise one live star
    pub fn reset_star(&mut self, index: usize, config: &SimConfig, random_row_allowed: bool) {
        let height = self.layout.height;
        if let Some(star) = self.stars[..self.active].get_mut(index) {
            randomize(&mut self.rng, star, config, height, random_row_allowed);
        }
    }

    /// Re-randomise every live star
    pub fn reset_active(&mut self, config: &SimConfig) {
        let height = self.layout.height;
        for star in self.stars[..self.active].iter_mut() {
            randomize(&mut self.rng, star, config, height, true);
        }
    }

    /// Activate one new star, randomised then overridden
    ///
    /// Returns `false` when the pool is full.
    pub fn add(&mut self, config: &SimConfig, overrides: &StarOverrides) -> bool {
        let height = self.layout.height;
        let Some(star) = self.stars.get_mut(self.active) else {
            return false;
        };
        randomize(&mut self.rng, star, config, height, true);
        overrides.apply(star, height);
        self.active += 1;
        true
    }

    /// Activate up to `count` stars; returns how many fit
    pub fn add_many(&mut self, count: usize, config: &SimConfig, overrides: &StarOverrides) -> usize {
        let count = count.min(self.available());
        for _ in 0..count {
            self.add(config, overrides);
        }
        count
    }

    /// Retire up to `count` stars from the end of the live prefix
    pub fn remove(&mut self, count: usize) -> usize {
        let removed = count.min(self.active);
        self.active -= removed;
        removed
    }

    /// Darken and retire every live star
    pub fn clear(&mut self) {
        for star in self.stars[..self.active].iter_mut() {
            star.brightness = 0.0;
        }
        self.active = 0;
    }

    /// Move every live star by `dt` seconds and render it into `frame`
    ///
    /// A star leaving on the right either wraps back to the left edge or is
    /// replaced by a fresh random star, depending on `config.wrap`.
    pub fn advance<const N: usize>(&mut self, dt: f32, config: &SimConfig, frame: &mut FrameBuffer<N>) {
        let width = self.layout.total_width() as f32;
        let height = self.layout.height;

        for star in self.stars[..self.active].iter_mut() {
            star.x += star.vx * dt;

            if star.x > -RENDER_MARGIN && star.x < width + RENDER_MARGIN {
                render_star(&self.layout, star, frame);
            }

            if star.x > width + 1.0 {
                if config.wrap {
                    star.x -= width + RENDER_MARGIN;
                } else {
                    randomize(&mut self.rng, star, config, height, true);
                }
            }
        }
    }
}

/// Give `star` a fresh random row, speed and brightness, just left of column 0
fn randomize(
    rng: &mut SmallRng,
    star: &mut Star,
    config: &SimConfig,
    height: usize,
    random_row_allowed: bool,
) {
    let (lo, hi) = config.speed_range();

    star.x = rng.gen_range(-RENDER_MARGIN..0.0);
    star.row = if config.random_rows && random_row_allowed && height > 0 {
        rng.gen_range(0..height)
    } else {
        0
    };
    star.vx = rng.gen_range(lo..=hi);
    star.brightness = rng.gen_range(MIN_RANDOM_BRIGHTNESS..=MAX_RANDOM_BRIGHTNESS);
    star.color = config.color;
    star.size = 1;
}

/// Draw one star and its trail, splitting each segment across two columns
pub fn render_star<const N: usize>(layout: &PanelLayout, star: &Star, frame: &mut FrameBuffer<N>) {
    let size = star.size.max(1);

    for i in 0..size {
        let trail_factor = 1.0 - i as f32 / size as f32;
        let x = star.x - i as f32 * TRAIL_STEP;
        let left = floorf(x);
        let frac = x - left;
        let level = star.brightness * trail_factor;

        plot(layout, frame, left as i32, star.row, star.color, level * (1.0 - frac));
        plot(layout, frame, left as i32 + 1, star.row, star.color, level * frac);
    }
}

fn plot<const N: usize>(
    layout: &PanelLayout,
    frame: &mut FrameBuffer<N>,
    gx: i32,
    row: usize,
    color: RGB8,
    weight: f32,
) {
    if let Some(index) = map_pixel(layout, gx, row) {
        frame.accumulate(
            index,
            color.r as f32 * weight,
            color.g as f32 * weight,
            color.b as f32 * weight,
        );
    }
}
