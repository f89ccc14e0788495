//! WS2812 panel output over PIO
//!
//! Each panel is its own data line driven by one PIO state machine: four on
//! PIO0 and the fifth on PIO1. The core flushes a frame into the staging
//! buffers through [`LedTransport`]; [`PanelStrips::write`] then clocks all
//! five strips out in parallel.

use embassy_futures::join::join5;
use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::RGB8;

use starcurtain_core::config::{DEFAULT_PANELS, DEFAULT_PANEL_HEIGHT, DEFAULT_PANEL_WIDTH};
use starcurtain_core::traits::LedTransport;

/// Panels (data lines) the board drives
pub const PANELS: usize = DEFAULT_PANELS;

/// LEDs on one panel
pub const LEDS_PER_PANEL: usize = DEFAULT_PANEL_WIDTH * DEFAULT_PANEL_HEIGHT;

/// LEDs on the whole display
pub const PIXELS: usize = PANELS * LEDS_PER_PANEL;

/// The five panel strips plus their staging buffers
pub struct PanelStrips {
    staging: [[RGB8; LEDS_PER_PANEL]; PANELS],
    strip0: PioWs2812<'static, PIO0, 0, LEDS_PER_PANEL>,
    strip1: PioWs2812<'static, PIO0, 1, LEDS_PER_PANEL>,
    strip2: PioWs2812<'static, PIO0, 2, LEDS_PER_PANEL>,
    strip3: PioWs2812<'static, PIO0, 3, LEDS_PER_PANEL>,
    strip4: PioWs2812<'static, PIO1, 0, LEDS_PER_PANEL>,
    /// A complete frame is staged and not yet written
    ready: bool,
}

impl PanelStrips {
    pub fn new(
        strip0: PioWs2812<'static, PIO0, 0, LEDS_PER_PANEL>,
        strip1: PioWs2812<'static, PIO0, 1, LEDS_PER_PANEL>,
        strip2: PioWs2812<'static, PIO0, 2, LEDS_PER_PANEL>,
        strip3: PioWs2812<'static, PIO0, 3, LEDS_PER_PANEL>,
        strip4: PioWs2812<'static, PIO1, 0, LEDS_PER_PANEL>,
    ) -> Self {
        Self {
            staging: [[RGB8::default(); LEDS_PER_PANEL]; PANELS],
            strip0,
            strip1,
            strip2,
            strip3,
            strip4,
            ready: false,
        }
    }

    /// Write the staged frame to every strip
    ///
    /// Does nothing unless a frame was presented since the last write.
    pub async fn write(&mut self) {
        if !self.ready {
            return;
        }
        self.ready = false;

        let [p0, p1, p2, p3, p4] = &self.staging;
        join5(
            self.strip0.write(p0),
            self.strip1.write(p1),
            self.strip2.write(p2),
            self.strip3.write(p3),
            self.strip4.write(p4),
        )
        .await;
    }
}

impl LedTransport for PanelStrips {
    fn set_pixel(&mut self, index: usize, color: RGB8) {
        let (panel, local) = (index / LEDS_PER_PANEL, index % LEDS_PER_PANEL);
        if let Some(strip) = self.staging.get_mut(panel) {
            strip[local] = color;
        }
    }

    fn show(&mut self) {
        self.ready = true;
    }
}
