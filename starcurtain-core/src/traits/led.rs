//! LED output trait

use smart_leds::RGB8;

/// Trait for the physical LED transport
///
/// The frame buffer only ever writes pixels by physical index and then asks
/// for the frame to be presented. How the transport gets the data onto the
/// wire (PIO, SPI, DMA) is its own business.
pub trait LedTransport {
    /// Set one LED by physical index
    ///
    /// Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: RGB8);

    /// Present the pixels written since the last call
    fn show(&mut self);
}
