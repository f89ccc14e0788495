//! Star-field simulation

pub mod field;
pub mod star;

pub use field::{render_star, Starfield};
pub use star::{Star, StarOverrides, MAX_STAR_SIZE};
