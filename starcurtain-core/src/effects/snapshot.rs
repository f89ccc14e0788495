//! Per-star backup taken when an effect starts

use heapless::Vec;
use smart_leds::RGB8;

use crate::config::SimConfig;
use crate::sim::Star;

/// Saved state of one star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarBackup {
    pub row: usize,
    pub vx: f32,
    pub brightness: f32,
    pub color: RGB8,
}

impl From<&Star> for StarBackup {
    fn from(star: &Star) -> Self {
        Self {
            row: star.row,
            vx: star.vx,
            brightness: star.brightness,
            color: star.color,
        }
    }
}

/// Stars and global speed bounds at activation time
///
/// Indexed in parallel with the star pool; holds one entry per star that was
/// live when captured.
#[derive(Debug, Clone)]
pub struct Snapshot<const CAP: usize> {
    stars: Vec<StarBackup, CAP>,
    min_speed: f32,
    max_speed: f32,
}

impl<const CAP: usize> Default for Snapshot<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Snapshot<CAP> {
    pub const fn new() -> Self {
        Self {
            stars: Vec::new(),
            min_speed: 0.0,
            max_speed: 0.0,
        }
    }

    /// Replace the contents with the current live stars and speed bounds
    pub fn capture(&mut self, stars: &[Star], config: &SimConfig) {
        self.stars.clear();
        for star in stars.iter().take(CAP) {
            // Capacity matches the pool, push cannot fail
            let _ = self.stars.push(StarBackup::from(star));
        }
        self.min_speed = config.min_speed;
        self.max_speed = config.max_speed;
    }

    /// Drop all saved stars
    pub fn clear(&mut self) {
        self.stars.clear();
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Saved state of star `index`
    pub fn get(&self, index: usize) -> Option<&StarBackup> {
        self.stars.get(index)
    }

    /// Saved state zipped with the stars it belongs to
    ///
    /// Stars added after the capture have no backup and are skipped.
    pub fn pairs<'a>(
        &'a self,
        stars: &'a mut [Star],
    ) -> impl Iterator<Item = (&'a StarBackup, &'a mut Star)> + 'a {
        self.stars.iter().zip(stars.iter_mut())
    }

    /// Captured speed bounds
    pub fn speeds(&self) -> (f32, f32) {
        (self.min_speed, self.max_speed)
    }

    /// Put the captured speed bounds back, scaled by `factor`
    pub fn apply_speeds(&self, config: &mut SimConfig, factor: f32) {
        config.min_speed = self.min_speed * factor;
        config.max_speed = self.max_speed * factor;
    }

    /// Restore velocity of every saved star
    pub fn restore_velocities(&self, stars: &mut [Star]) {
        for (saved, star) in self.pairs(stars) {
            star.vx = saved.vx;
        }
    }

    /// Pull stars added after the capture back into the captured speed range
    ///
    /// Such stars were randomised from the scaled bounds and have no backup.
    pub fn settle_unsaved(&self, stars: &mut [Star]) {
        let (lo, hi) = if self.min_speed <= self.max_speed {
            (self.min_speed, self.max_speed)
        } else {
            (self.max_speed, self.min_speed)
        };
        for star in stars.iter_mut().skip(self.stars.len()) {
            star.vx = star.vx.max(lo).min(hi);
        }
    }

    /// Restore row, velocity, brightness and colour of every saved star
    pub fn restore_all(&self, stars: &mut [Star]) {
        for (saved, star) in self.pairs(stars) {
            star.row = saved.row;
            star.vx = saved.vx;
            star.brightness = saved.brightness;
            star.color = saved.color;
        }
    }
}
