//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod animation;
pub mod serial_rx;
pub mod serial_tx;

pub use animation::{animation_task, CurtainShow};
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
