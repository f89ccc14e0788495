//! Hardware abstraction traits
//!
//! These traits define the interface between the animation engine and the
//! board-specific output driver.

pub mod led;

pub use led::LedTransport;
