//! Board drivers

pub mod ws2812;

pub use ws2812::{PanelStrips, LEDS_PER_PANEL, PANELS, PIXELS};
