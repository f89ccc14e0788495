//! Ordered handler registry

use core::fmt::Write;

use heapless::{String, Vec};
use starcurtain_protocol::{Command, VALUE_LEN};

use super::handlers::{ConfigHandler, EffectHandler, StarHandler, SystemHandler};
use super::{CommandHandler, Context};

/// Maximum number of registered handlers
pub const MAX_HANDLERS: usize = 8;

/// The registry already holds [`MAX_HANDLERS`] handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryFull;

/// Handlers in dispatch priority order
pub struct Registry<'h, const CAP: usize> {
    handlers: Vec<&'h dyn CommandHandler<CAP>, MAX_HANDLERS>,
}

impl<'h, const CAP: usize> Default for Registry<'h, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Registry<'static, CAP> {
    /// Registry with the built-in families: system, config, star, effect
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let builtin: [&'static dyn CommandHandler<CAP>; 4] =
            [&SystemHandler, &ConfigHandler, &StarHandler, &EffectHandler];
        for handler in builtin {
            // Four handlers always fit
            let _ = registry.register(handler);
        }
        registry
    }
}

impl<'h, const CAP: usize> Registry<'h, CAP> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; earlier registrations take priority
    pub fn register(&mut self, handler: &'h dyn CommandHandler<CAP>) -> Result<(), RegistryFull> {
        self.handlers.push(handler).map_err(|_| RegistryFull)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// First handler that accepts `cmd`
    pub fn find(&self, cmd: &Command) -> Option<&'h dyn CommandHandler<CAP>> {
        self.handlers.iter().copied().find(|h| h.can_handle(cmd))
    }

    /// Produce exactly one response for `cmd`
    ///
    /// With no matching handler the response is a protocol error naming the
    /// unmatched command.
    pub fn dispatch(&self, cmd: &Command, ctx: &mut Context<'_, CAP>) -> Command {
        let Some(handler) = self.find(cmd) else {
            let mut message: String<VALUE_LEN> = String::new();
            let _ = write!(message, "Unknown command: {}:{}", cmd.msg_type, cmd.command);
            return Command::error(&cmd.command, &message);
        };

        let mut response = Command::response_to(cmd);
        match handler.handle(cmd, ctx, &mut response) {
            Ok(()) => response,
            Err(_) => Command::error(&cmd.command, "Response too large"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::response::{reply, Status};
    use crate::config::{PanelLayout, SimConfig};
    use crate::effects::{Effects, IdleMonitor, IdlePhase};
    use crate::sim::Starfield;
    use starcurtain_protocol::{CommandError, MessageKind};

    struct Tagged(&'static str);

    impl CommandHandler<4> for Tagged {
        fn name(&self) -> &'static str {
            self.0
        }

        fn can_handle(&self, cmd: &Command) -> bool {
            cmd.msg_type == "test"
        }

        fn handle(
            &self,
            _cmd: &Command,
            _ctx: &mut Context<'_, 4>,
            response: &mut Command,
        ) -> Result<(), CommandError> {
            reply(response, Status::Ok, self.0)
        }
    }

    struct Overflowing;

    impl CommandHandler<4> for Overflowing {
        fn name(&self) -> &'static str {
            "overflow"
        }

        fn can_handle(&self, cmd: &Command) -> bool {
            cmd.msg_type == "big"
        }

        fn handle(
            &self,
            _cmd: &Command,
            _ctx: &mut Context<'_, 4>,
            response: &mut Command,
        ) -> Result<(), CommandError> {
            for key in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m"] {
                response.set_param(key, "1")?;
            }
            Ok(())
        }
    }

    struct World {
        config: SimConfig,
        stars: Starfield<4>,
        effects: Effects<4>,
        idle: IdleMonitor,
    }

    impl World {
        fn new() -> Self {
            Self {
                config: SimConfig::default(),
                stars: Starfield::new(PanelLayout::new(1, 4, 4), 1),
                effects: Effects::new(),
                idle: IdleMonitor::new(1000),
            }
        }

        fn ctx(&mut self) -> Context<'_, 4> {
            Context {
                config: &mut self.config,
                stars: &mut self.stars,
                effects: &mut self.effects,
                idle: &mut self.idle,
                idle_phase: IdlePhase::Waiting,
                now_ms: 0,
            }
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let first = Tagged("first");
        let second = Tagged("second");
        let mut registry = Registry::<4>::new();
        registry.register(&first).unwrap();
        registry.register(&second).unwrap();

        let mut world = World::new();
        let cmd = Command::new("test", "anything").unwrap();
        let response = registry.dispatch(&cmd, &mut world.ctx());
        assert_eq!(response.param("message"), Some("first"));
        assert!(response.is("test", "anything"));
        assert_eq!(registry.find(&cmd).unwrap().name(), "first");
    }

    #[test]
    fn test_no_handler_is_error() {
        let registry = Registry::<4>::new();
        let mut world = World::new();
        let cmd = Command::new("nope", "thing").unwrap();
        let response = registry.dispatch(&cmd, &mut world.ctx());

        assert_eq!(response.kind(), MessageKind::Error);
        assert!(response.is("error", "thing"));
        assert_eq!(response.param("message"), Some("Unknown command: nope:thing"));
    }

    #[test]
    fn test_response_overflow_becomes_error() {
        let mut registry = Registry::<4>::new();
        registry.register(&Overflowing).unwrap();
        let mut world = World::new();
        let cmd = Command::new("big", "one").unwrap();
        let response = registry.dispatch(&cmd, &mut world.ctx());
        assert!(response.is("error", "one"));
    }

    #[test]
    fn test_registry_full() {
        let handler = Tagged("x");
        let mut registry = Registry::<4>::new();
        for _ in 0..MAX_HANDLERS {
            registry.register(&handler).unwrap();
        }
        assert_eq!(registry.register(&handler), Err(RegistryFull));
        assert_eq!(registry.len(), MAX_HANDLERS);
    }

    #[test]
    fn test_standard_order() {
        let registry = Registry::<4>::standard();
        assert_eq!(registry.len(), 4);
        let ping = Command::new("system", "ping").unwrap();
        assert_eq!(registry.find(&ping).unwrap().name(), "system");
        let add = Command::new("star", "add").unwrap();
        assert_eq!(registry.find(&add).unwrap().name(), "star");
    }
}
