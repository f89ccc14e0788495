//! Command dispatch
//!
//! Each [`CommandHandler`] declares which commands it accepts and turns a
//! request into a response. The [`Registry`] keeps handlers in registration
//! order and hands each command to the first one that accepts it.

pub mod handlers;
pub mod registry;
pub mod response;

pub use registry::{Registry, RegistryFull, MAX_HANDLERS};
pub use response::Status;

use starcurtain_protocol::{Command, CommandError};

use crate::config::SimConfig;
use crate::effects::{Effects, IdleMonitor, IdlePhase};
use crate::sim::Starfield;

/// Firmware version reported by `system:info`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mutable show state lent to a handler for one command
pub struct Context<'a, const CAP: usize> {
    pub config: &'a mut SimConfig,
    pub stars: &'a mut Starfield<CAP>,
    pub effects: &'a mut Effects<CAP>,
    pub idle: &'a mut IdleMonitor,
    /// Idle cycle phase, for status reporting
    pub idle_phase: IdlePhase,
    /// Show clock
    pub now_ms: u64,
}

/// A family of commands
pub trait CommandHandler<const CAP: usize> {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Whether this handler accepts `cmd`
    fn can_handle(&self, cmd: &Command) -> bool;

    /// Handle `cmd`, filling in `response`
    ///
    /// Domain failures are reported through the response's `status`; an
    /// `Err` means the response itself could not be built.
    fn handle(
        &self,
        cmd: &Command,
        ctx: &mut Context<'_, CAP>,
        response: &mut Command,
    ) -> Result<(), CommandError>;
}
