//! Frame buffer and coordinate mapping

pub mod framebuffer;
pub mod mapping;

pub use framebuffer::FrameBuffer;
pub use mapping::{local_index, map_pixel, physical_index};
