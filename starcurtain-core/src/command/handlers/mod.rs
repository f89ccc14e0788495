//! Built-in command families

mod config;
mod effect;
mod star;
mod system;

pub use config::ConfigHandler;
pub use effect::EffectHandler;
pub use star::StarHandler;
pub use system::SystemHandler;
