//! `star` family: pool management

use smart_leds::RGB8;
use starcurtain_protocol::{Command, CommandError};

use crate::command::response::{flag, invalid_param, reply, reply_fmt, unknown_command, Status};
use crate::command::{CommandHandler, Context};
use crate::sim::{StarOverrides, MAX_STAR_SIZE};

pub struct StarHandler;

impl<const CAP: usize> CommandHandler<CAP> for StarHandler {
    fn name(&self) -> &'static str {
        "star"
    }

    fn can_handle(&self, cmd: &Command) -> bool {
        cmd.msg_type == "star"
    }

    fn handle(
        &self,
        cmd: &Command,
        ctx: &mut Context<'_, CAP>,
        response: &mut Command,
    ) -> Result<(), CommandError> {
        match cmd.command.as_str() {
            "add" => handle_add(cmd, ctx, response),
            "remove" => handle_remove(cmd, ctx, response),
            "reset" => {
                ctx.stars.reset_active(ctx.config);
                reply_fmt(
                    response,
                    Status::Ok,
                    format_args!("Reset {} stars", ctx.stars.active()),
                )
            }
            "info" => {
                reply(response, Status::Ok, "stars")?;
                response.set_param_fmt("active", format_args!("{}", ctx.stars.active()))?;
                response.set_param_fmt("max", format_args!("{}", CAP))?;
                response.set_param_fmt("minSpeed", format_args!("{}", ctx.config.min_speed))?;
                response.set_param_fmt("maxSpeed", format_args!("{}", ctx.config.max_speed))?;
                response.set_param("randomRows", flag(ctx.config.random_rows))?;
                response.set_param("wrap", flag(ctx.config.wrap))
            }
            _ => unknown_command(cmd, response, "add|remove|reset|info"),
        }
    }
}

fn handle_add<const CAP: usize>(
    cmd: &Command,
    ctx: &mut Context<'_, CAP>,
    response: &mut Command,
) -> Result<(), CommandError> {
    let Some(requested) = count(cmd) else {
        return invalid_param(response, "count");
    };
    let overrides = match parse_overrides(cmd, ctx.stars.layout().height) {
        Ok(overrides) => overrides,
        Err(key) => return invalid_param(response, key),
    };

    let added = ctx.stars.add_many(requested, ctx.config, &overrides);

    reply_fmt(response, Status::Ok, format_args!("Added {} stars", added))?;
    response.set_param_fmt("added", format_args!("{}", added))?;
    response.set_param_fmt("requested", format_args!("{}", requested))?;
    response.set_param_fmt("active", format_args!("{}", ctx.stars.active()))?;
    response.set_param_fmt("max", format_args!("{}", CAP))
}

fn handle_remove<const CAP: usize>(
    cmd: &Command,
    ctx: &mut Context<'_, CAP>,
    response: &mut Command,
) -> Result<(), CommandError> {
    let Some(requested) = count(cmd) else {
        return invalid_param(response, "count");
    };
    if ctx.stars.active() == 0 {
        return reply(response, Status::NoneActive, "No active stars");
    }

    let removed = ctx.stars.remove(requested);

    reply_fmt(response, Status::Ok, format_args!("Removed {} stars", removed))?;
    response.set_param_fmt("removed", format_args!("{}", removed))?;
    response.set_param_fmt("active", format_args!("{}", ctx.stars.active()))
}

/// `count` parameter, default 1, must be at least 1
fn count(cmd: &Command) -> Option<usize> {
    match cmd.param_i32("count") {
        Ok(None) => Some(1),
        Ok(Some(n)) if n >= 1 => Some(n as usize),
        _ => None,
    }
}

/// Per-star overrides; `Err` names the first bad key
fn parse_overrides(cmd: &Command, height: usize) -> Result<StarOverrides, &'static str> {
    let mut overrides = StarOverrides::default();

    match cmd.param_f32("speed") {
        Ok(None) => {}
        Ok(Some(v)) if v > 0.0 && v.is_finite() => overrides.speed = Some(v),
        _ => return Err("speed"),
    }

    match cmd.param_hex("color") {
        Ok(None) => {}
        Ok(Some(v)) if v <= 0xFF_FFFF => {
            overrides.color = Some(RGB8::new((v >> 16) as u8, (v >> 8) as u8, v as u8));
        }
        _ => return Err("color"),
    }

    match cmd.param_f32("brightness") {
        Ok(None) => {}
        Ok(Some(v)) if (0.0..=100.0).contains(&v) => overrides.brightness = Some(v / 100.0),
        _ => return Err("brightness"),
    }

    match cmd.param_i32("size") {
        Ok(None) => {}
        Ok(Some(v)) if (1..=MAX_STAR_SIZE as i32).contains(&v) => overrides.size = Some(v as u8),
        _ => return Err("size"),
    }

    match cmd.param_i32("row") {
        Ok(None) => {}
        Ok(Some(v)) if v >= 0 && (v as usize) < height => overrides.row = Some(v as usize),
        _ => return Err("row"),
    }

    Ok(overrides)
}
