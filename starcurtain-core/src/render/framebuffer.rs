//! Persistent additive frame buffer
//!
//! Rendering adds light into the buffer; once per frame, before anything is
//! rendered, the whole buffer is faded. Trails are what is left of earlier
//! frames after repeated fading.

use smart_leds::RGB8;

use crate::traits::LedTransport;

/// Fade results below this are snapped to zero
const SNAP_THRESHOLD: f32 = 0.5;

/// One RGB triple per physical LED
#[derive(Debug, Clone)]
pub struct FrameBuffer<const N: usize> {
    pixels: [RGB8; N],
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// Create an all-black buffer
    pub const fn new() -> Self {
        Self {
            pixels: [RGB8 { r: 0, g: 0, b: 0 }; N],
        }
    }

    /// Number of LEDs
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the buffer holds no LEDs at all (not whether it is dark)
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Read one pixel
    pub fn get(&self, index: usize) -> Option<RGB8> {
        self.pixels.get(index).copied()
    }

    /// All pixels in physical order
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Black out every pixel
    pub fn clear(&mut self) {
        self.pixels.fill(RGB8::default());
    }

    /// Add light to one pixel, clamping each channel at 255
    ///
    /// Out-of-range indices are ignored.
    pub fn accumulate(&mut self, index: usize, r: f32, g: f32, b: f32) {
        if let Some(px) = self.pixels.get_mut(index) {
            px.r = add_channel(px.r, r);
            px.g = add_channel(px.g, g);
            px.b = add_channel(px.b, b);
        }
    }

    /// Scale every channel by `factor`
    ///
    /// `factor` is clamped to `[0, 1]`, so fading never brightens.
    pub fn fade_all(&mut self, factor: f32) {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        for px in self.pixels.iter_mut() {
            px.r = fade_channel(px.r, factor);
            px.g = fade_channel(px.g, factor);
            px.b = fade_channel(px.b, factor);
        }
    }

    /// Push every pixel to the transport and present the frame
    pub fn flush<T: LedTransport>(&self, out: &mut T) {
        for (index, px) in self.pixels.iter().enumerate() {
            out.set_pixel(index, *px);
        }
        out.show();
    }
}

fn add_channel(current: u8, add: f32) -> u8 {
    if add.is_nan() || add <= 0.0 {
        return current;
    }
    (current as f32 + add).min(255.0) as u8
}

fn fade_channel(current: u8, factor: f32) -> u8 {
    let v = current as f32 * factor;
    if v < SNAP_THRESHOLD {
        0
    } else {
        v.min(255.0) as u8
    }
}
