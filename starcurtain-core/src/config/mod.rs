//! Configuration types
//!
//! Compile-time layout defaults, the runtime tunables owned by the control
//! loop, and the parser for the embedded `starcurtain.toml`.

pub mod file;
pub mod layout;
pub mod sim;

pub use file::{parse_config, ConfigError};
pub use layout::*;
pub use sim::*;
