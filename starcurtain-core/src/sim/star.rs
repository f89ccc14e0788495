//! Star particle

use smart_leds::RGB8;

/// Brightness range given to randomised stars
pub const MIN_RANDOM_BRIGHTNESS: f32 = 0.70;
pub const MAX_RANDOM_BRIGHTNESS: f32 = 1.00;

/// Longest trail a star can carry
pub const MAX_STAR_SIZE: u8 = 16;

/// One particle moving left to right along a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Continuous global column; negative means not yet on screen
    pub x: f32,
    /// Vertical lane, always below the layout height
    pub row: usize,
    /// Horizontal velocity in columns per second
    pub vx: f32,
    /// 0.0 to 1.0
    pub brightness: f32,
    pub color: RGB8,
    /// Trail segments; 1 renders a single anti-aliased dot
    pub size: u8,
}

impl Star {
    /// An inert star: off screen, unlit
    pub const DARK: Star = Star {
        x: -2.0,
        row: 0,
        vx: 0.0,
        brightness: 0.0,
        color: RGB8 { r: 0, g: 0, b: 0 },
        size: 1,
    };
}

impl Default for Star {
    fn default() -> Self {
        Self::DARK
    }
}

/// Fields forced onto a freshly randomised star
///
/// Anything left `None` keeps the randomised value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StarOverrides {
    pub speed: Option<f32>,
    pub color: Option<RGB8>,
    pub brightness: Option<f32>,
    pub size: Option<u8>,
    pub row: Option<usize>,
}

impl StarOverrides {
    /// Overwrite the supplied fields of `star`
    ///
    /// `row` is only honoured when below `height`; `size` is clamped to
    /// `1..=MAX_STAR_SIZE` and brightness to `0..=1`.
    pub fn apply(&self, star: &mut Star, height: usize) {
        if let Some(speed) = self.speed {
            star.vx = speed;
        }
        if let Some(color) = self.color {
            star.color = color;
        }
        if let Some(brightness) = self.brightness {
            star.brightness = brightness.clamp(0.0, 1.0);
        }
        if let Some(size) = self.size {
            star.size = size.clamp(1, MAX_STAR_SIZE);
        }
        if let Some(row) = self.row.filter(|&r| r < height) {
            star.row = row;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_touch_only_supplied_fields() {
        let mut star = Star {
            x: -1.0,
            row: 3,
            vx: 10.0,
            brightness: 0.8,
            color: RGB8::new(1, 2, 3),
            size: 1,
        };
        let overrides = StarOverrides {
            speed: Some(42.0),
            size: Some(4),
            ..Default::default()
        };
        overrides.apply(&mut star, 8);

        assert_eq!(star.vx, 42.0);
        assert_eq!(star.size, 4);
        assert_eq!(star.row, 3);
        assert_eq!(star.brightness, 0.8);
        assert_eq!(star.color, RGB8::new(1, 2, 3));
    }

    #[test]
    fn test_overrides_clamp() {
        let mut star = Star::DARK;
        let overrides = StarOverrides {
            brightness: Some(3.0),
            size: Some(0),
            row: Some(99),
            ..Default::default()
        };
        overrides.apply(&mut star, 8);
        assert_eq!(star.brightness, 1.0);
        assert_eq!(star.size, 1);
        assert_eq!(star.row, 0);
    }
}
