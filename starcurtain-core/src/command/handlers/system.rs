//! `system` family: keep-alive and device info

use starcurtain_protocol::{Command, CommandError};

use crate::command::response::{flag, reply, unknown_command, Status};
use crate::command::{CommandHandler, Context, VERSION};

pub struct SystemHandler;

impl<const CAP: usize> CommandHandler<CAP> for SystemHandler {
    fn name(&self) -> &'static str {
        "system"
    }

    fn can_handle(&self, cmd: &Command) -> bool {
        cmd.msg_type == "system"
    }

    fn handle(
        &self,
        cmd: &Command,
        ctx: &mut Context<'_, CAP>,
        response: &mut Command,
    ) -> Result<(), CommandError> {
        match cmd.command.as_str() {
            "ping" => {
                ctx.idle.keepalive();
                reply(response, Status::Ok, "pong")
            }
            "info" => {
                let layout = *ctx.stars.layout();
                reply(response, Status::Ok, "starcurtain")?;
                response.set_param("version", VERSION)?;
                response.set_param_fmt("uptimeMs", format_args!("{}", ctx.now_ms))?;
                response.set_param_fmt("panels", format_args!("{}", layout.panels))?;
                response.set_param_fmt("width", format_args!("{}", layout.total_width()))?;
                response.set_param_fmt("height", format_args!("{}", layout.height))?;
                response.set_param_fmt("pixels", format_args!("{}", layout.pixel_count()))?;
                response.set_param_fmt("active", format_args!("{}", ctx.stars.active()))?;
                response.set_param_fmt("max", format_args!("{}", CAP))?;
                response.set_param("idle", flag(ctx.idle.is_idle()))
            }
            _ => unknown_command(cmd, response, "ping|info"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::tests::World;
    use starcurtain_protocol::parse;

    #[test]
    fn test_ping_resets_idle() {
        let mut world = World::new();
        world.idle.update_time(60_000);
        assert!(world.idle.is_idle());

        let response = world.run(&SystemHandler, "!!system:ping:{}##");
        assert_eq!(response.param("status"), Some("ok"));
        assert_eq!(response.param("message"), Some("pong"));
        assert!(!world.idle.is_idle());
    }

    #[test]
    fn test_info() {
        let mut world = World::new();
        world.now_ms = 1234;
        let response = world.run(&SystemHandler, "!!system:info:{}##");
        assert_eq!(response.param("uptimeMs"), Some("1234"));
        assert_eq!(response.param("panels"), Some("2"));
        assert_eq!(response.param("width"), Some("8"));
        assert_eq!(response.param("height"), Some("6"));
        assert_eq!(response.param("pixels"), Some("48"));
        assert_eq!(response.param("max"), Some("16"));
        assert_eq!(response.param("idle"), Some("false"));
        assert_eq!(response.param("version"), Some(VERSION));
        // Whole response still fits on the wire
        assert!(parse(&response.encode_to_string().unwrap()).is_ok());
    }

    #[test]
    fn test_unknown() {
        let mut world = World::new();
        let response = world.run(&SystemHandler, "!!system:reboot:{}##");
        assert_eq!(response.param("status"), Some("unknown_command"));
    }
}
