//! Response statuses and helpers

use core::fmt;

use starcurtain_protocol::{Command, CommandError};

/// Value of the `status` parameter on every response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    /// Request understood but nothing changed
    NoChange,
    /// A parameter was malformed or out of range
    InvalidParam,
    /// Known family, unknown command
    UnknownCommand,
    /// Nothing to act on (e.g. removing from an empty pool)
    NoneActive,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NoChange => "no_change",
            Status::InvalidParam => "invalid_param",
            Status::UnknownCommand => "unknown_command",
            Status::NoneActive => "none_active",
            Status::Error => "error",
        }
    }
}

/// Set `status` and `message`
pub fn reply(response: &mut Command, status: Status, message: &str) -> Result<(), CommandError> {
    response.set_param("status", status.as_str())?;
    response.set_param("message", message)
}

/// Set `status` and a formatted `message`
pub fn reply_fmt(
    response: &mut Command,
    status: Status,
    message: fmt::Arguments<'_>,
) -> Result<(), CommandError> {
    response.set_param("status", status.as_str())?;
    response.set_param_fmt("message", message)
}

/// Answer a command the handler's family does not know
pub fn unknown_command(
    cmd: &Command,
    response: &mut Command,
    available: &str,
) -> Result<(), CommandError> {
    reply_fmt(
        response,
        Status::UnknownCommand,
        format_args!("Unknown command: {}", cmd.command),
    )?;
    response.set_param("available", available)
}

/// Answer a rejected parameter
pub fn invalid_param(response: &mut Command, key: &str) -> Result<(), CommandError> {
    reply_fmt(response, Status::InvalidParam, format_args!("invalid {}", key))
}

/// `true`/`false` as parameter text
pub fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
