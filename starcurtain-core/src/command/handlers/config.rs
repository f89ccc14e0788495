//! `config` family: live tunables
//!
//! `config:set` validates and applies every supplied key independently; a
//! bad value for one key never blocks the others.

use heapless::String;
use starcurtain_protocol::{Command, CommandError, ValueError, VALUE_LEN};

use crate::command::response::{flag, reply, reply_fmt, unknown_command, Status};
use crate::command::{CommandHandler, Context};
use crate::config::limits;

pub struct ConfigHandler;

impl<const CAP: usize> CommandHandler<CAP> for ConfigHandler {
    fn name(&self) -> &'static str {
        "config"
    }

    fn can_handle(&self, cmd: &Command) -> bool {
        cmd.msg_type == "config"
    }

    fn handle(
        &self,
        cmd: &Command,
        ctx: &mut Context<'_, CAP>,
        response: &mut Command,
    ) -> Result<(), CommandError> {
        match cmd.command.as_str() {
            "set" => handle_set(cmd, ctx, response),
            "get" => handle_get(ctx, response),
            _ => unknown_command(cmd, response, "set|get"),
        }
    }
}

fn handle_set<const CAP: usize>(
    cmd: &Command,
    ctx: &mut Context<'_, CAP>,
    response: &mut Command,
) -> Result<(), CommandError> {
    let mut report = Report::default();
    let config = &mut *ctx.config;

    if let Some(v) = report.take("stars", field(cmd.param_i32("stars"), limits::star_count)) {
        ctx.stars.grow_to(v as usize, config);
    }
    if let Some(v) = report.take("minSpeed", field(cmd.param_f32("minSpeed"), limits::speed)) {
        config.min_speed = v;
    }
    if let Some(v) = report.take("maxSpeed", field(cmd.param_f32("maxSpeed"), limits::speed)) {
        config.max_speed = v;
    }
    if let Some(v) = report.take("fade", field(cmd.param_f32("fade"), limits::fade)) {
        config.fade = v;
    }
    if let Some(v) = report.take("frameMs", field(cmd.param_i32("frameMs"), limits::frame_ms)) {
        config.frame_ms = v as u32;
    }
    if let Some(v) = report.take("randomRows", field(cmd.param_bool("randomRows"), |_| true)) {
        config.random_rows = v;
    }
    if let Some(v) = report.take("wrap", field(cmd.param_bool("wrap"), |_| true)) {
        config.wrap = v;
    }
    if let Some(v) = report.take("r", field(cmd.param_i32("r"), limits::channel)) {
        config.color.r = v as u8;
    }
    if let Some(v) = report.take("g", field(cmd.param_i32("g"), limits::channel)) {
        config.color.g = v as u8;
    }
    if let Some(v) = report.take("b", field(cmd.param_i32("b"), limits::channel)) {
        config.color.b = v as u8;
    }

    match (report.applied_count, report.rejected_count) {
        (0, 0) => reply(response, Status::NoChange, "No valid parameters"),
        (0, _) => {
            reply(response, Status::InvalidParam, "No valid parameters")?;
            response.set_param("rejected", &report.rejected)
        }
        (applied, rejected) => {
            reply_fmt(response, Status::Ok, format_args!("applied {}", applied))?;
            response.set_param("applied", &report.applied)?;
            if rejected > 0 {
                response.set_param("rejected", &report.rejected)?;
            }
            Ok(())
        }
    }
}

fn handle_get<const CAP: usize>(
    ctx: &mut Context<'_, CAP>,
    response: &mut Command,
) -> Result<(), CommandError> {
    let config = &*ctx.config;
    reply(response, Status::Ok, "config")?;
    response.set_param_fmt("stars", format_args!("{}", ctx.stars.active()))?;
    response.set_param_fmt("minSpeed", format_args!("{}", config.min_speed))?;
    response.set_param_fmt("maxSpeed", format_args!("{}", config.max_speed))?;
    response.set_param_fmt("fade", format_args!("{}", config.fade))?;
    response.set_param_fmt("frameMs", format_args!("{}", config.frame_ms))?;
    response.set_param("randomRows", flag(config.random_rows))?;
    response.set_param("wrap", flag(config.wrap))?;
    response.set_param_fmt("r", format_args!("{}", config.color.r))?;
    response.set_param_fmt("g", format_args!("{}", config.color.g))?;
    response.set_param_fmt("b", format_args!("{}", config.color.b))
}

/// One supplied key after validation
enum Field<T> {
    Absent,
    Valid(T),
    Invalid,
}

fn field<T: Copy>(value: Result<Option<T>, ValueError>, valid: impl Fn(T) -> bool) -> Field<T> {
    match value {
        Ok(None) => Field::Absent,
        Ok(Some(v)) if valid(v) => Field::Valid(v),
        _ => Field::Invalid,
    }
}

/// Keys applied and rejected, `|`-separated
#[derive(Default)]
struct Report {
    applied: String<VALUE_LEN>,
    rejected: String<VALUE_LEN>,
    applied_count: usize,
    rejected_count: usize,
}

impl Report {
    /// Record the outcome for `key`, returning the value to apply
    fn take<T>(&mut self, key: &str, field: Field<T>) -> Option<T> {
        match field {
            Field::Absent => None,
            Field::Valid(v) => {
                append(&mut self.applied, key);
                self.applied_count += 1;
                Some(v)
            }
            Field::Invalid => {
                append(&mut self.rejected, key);
                self.rejected_count += 1;
                None
            }
        }
    }
}

fn append(list: &mut String<VALUE_LEN>, key: &str) {
    // Every key name together fits in VALUE_LEN
    if !list.is_empty() {
        let _ = list.push('|');
    }
    let _ = list.push_str(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::tests::World;
    use crate::config::SimConfig;
    use smart_leds::RGB8;

    #[test]
    fn test_set_fade_exact() {
        let mut world = World::new();
        let response = world.run(&ConfigHandler, "!!config:set:{fade=0.9}##");
        assert_eq!(response.param("status"), Some("ok"));
        assert_eq!(world.config.fade, 0.9);
        assert_eq!(response.param("applied"), Some("fade"));
        assert!(!response.has_param("rejected"));
    }

    #[test]
    fn test_set_many_keys() {
        let mut world = World::new();
        let response = world.run(
            &ConfigHandler,
            "!!config:set:{stars=5,minSpeed=2.5,maxSpeed=9,frameMs=33,randomRows=false,wrap=TRUE,r=1,g=2,b=3}##",
        );
        assert_eq!(response.param("status"), Some("ok"));
        assert_eq!(response.param("message"), Some("applied 9"));
        assert_eq!(world.stars.active(), 5);
        assert_eq!(world.config.min_speed, 2.5);
        assert_eq!(world.config.max_speed, 9.0);
        assert_eq!(world.config.frame_ms, 33);
        assert!(!world.config.random_rows);
        assert!(world.config.wrap);
        assert_eq!(world.config.color, RGB8::new(1, 2, 3));
    }

    #[test]
    fn test_each_key_validated_independently() {
        let mut world = World::new();
        let response = world.run(
            &ConfigHandler,
            "!!config:set:{fade=1.5,minSpeed=4,r=300,wrap=maybe}##",
        );
        assert_eq!(response.param("status"), Some("ok"));
        assert_eq!(response.param("applied"), Some("minSpeed"));
        assert_eq!(response.param("rejected"), Some("fade|wrap|r"));
        assert_eq!(world.config.min_speed, 4.0);
        assert_eq!(world.config.fade, SimConfig::default().fade);
        assert_eq!(world.config.color, SimConfig::default().color);
    }

    #[test]
    fn test_only_rejected_is_invalid_param() {
        let mut world = World::new();
        let response = world.run(&ConfigHandler, "!!config:set:{frameMs=1000,stars=-1}##");
        assert_eq!(response.param("status"), Some("invalid_param"));
        assert_eq!(response.param("rejected"), Some("stars|frameMs"));
        assert_eq!(world.config, SimConfig::default());
    }

    #[test]
    fn test_nothing_supplied_is_no_change() {
        let mut world = World::new();
        let response = world.run(&ConfigHandler, "!!config:set:{unknown=1,fade=}##");
        assert_eq!(response.param("status"), Some("no_change"));
    }

    #[test]
    fn test_get_echoes_config() {
        let mut world = World::with_stars(3);
        world.config.fade = 0.5;
        let response = world.run(&ConfigHandler, "!!config:get:{}##");
        assert_eq!(response.param("status"), Some("ok"));
        assert_eq!(response.param("stars"), Some("3"));
        assert_eq!(response.param("minSpeed"), Some("8"));
        assert_eq!(response.param("fade"), Some("0.5"));
        assert_eq!(response.param("frameMs"), Some("20"));
        assert_eq!(response.param("randomRows"), Some("true"));
        assert_eq!(response.param("g"), Some("191"));
    }

    #[test]
    fn test_unknown() {
        let mut world = World::new();
        let response = world.run(&ConfigHandler, "!!config:reset:{}##");
        assert_eq!(response.param("status"), Some("unknown_command"));
    }
}
