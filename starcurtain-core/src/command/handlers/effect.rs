//! `effect` family: Buildup and Climax control

use starcurtain_protocol::{Command, CommandError};

use crate::command::response::{flag, invalid_param, reply, unknown_command, Status};
use crate::command::{CommandHandler, Context};
use crate::config::IdleConfig;

pub struct EffectHandler;

impl<const CAP: usize> CommandHandler<CAP> for EffectHandler {
    fn name(&self) -> &'static str {
        "effect"
    }

    fn can_handle(&self, cmd: &Command) -> bool {
        cmd.msg_type == "effect"
    }

    fn handle(
        &self,
        cmd: &Command,
        ctx: &mut Context<'_, CAP>,
        response: &mut Command,
    ) -> Result<(), CommandError> {
        let defaults = IdleConfig::default();
        match cmd.command.as_str() {
            "buildup" => {
                let Some(duration) = number(cmd, "duration", defaults.buildup_duration_s) else {
                    return invalid_param(response, "duration");
                };
                let Some(multiplier) = number(cmd, "multiplier", defaults.buildup_multiplier)
                else {
                    return invalid_param(response, "multiplier");
                };
                let started = ctx.effects.start_buildup(
                    ctx.now_ms,
                    duration,
                    multiplier,
                    ctx.stars,
                    ctx.config,
                );
                if let Err(e) = started {
                    return reply(response, Status::InvalidParam, e.reason());
                }
                reply(response, Status::Ok, "Buildup started")?;
                response.set_param_fmt("duration", format_args!("{}", duration))?;
                response.set_param_fmt("multiplier", format_args!("{}", multiplier))
            }
            "climax" => {
                let Some(duration) = number(cmd, "duration", defaults.climax_duration_s) else {
                    return invalid_param(response, "duration");
                };
                let Some(boost) = number(cmd, "boost", defaults.climax_boost) else {
                    return invalid_param(response, "boost");
                };
                let started =
                    ctx.effects
                        .start_climax(ctx.now_ms, duration, boost, ctx.stars, ctx.config);
                if let Err(e) = started {
                    return reply(response, Status::InvalidParam, e.reason());
                }
                reply(response, Status::Ok, "Climax started")?;
                response.set_param_fmt("duration", format_args!("{}", duration))?;
                response.set_param_fmt("boost", format_args!("{}", boost))
            }
            "status" => {
                reply(response, Status::Ok, "effects")?;
                response.set_param("buildup", ctx.effects.buildup_state(ctx.now_ms).as_str())?;
                response.set_param("climax", ctx.effects.climax_state().as_str())?;
                response.set_param("idle", flag(ctx.idle.is_idle()))?;
                response.set_param("idlePhase", ctx.idle_phase.as_str())
            }
            _ => unknown_command(cmd, response, "buildup|climax|status"),
        }
    }
}

/// Numeric parameter with a default; `None` when present but unparsable
fn number(cmd: &Command, key: &str, default: f32) -> Option<f32> {
    match cmd.param_f32(key) {
        Ok(value) => Some(value.unwrap_or(default)),
        Err(_) => None,
    }
}
