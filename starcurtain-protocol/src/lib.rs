//! Starcurtain Command Protocol
//!
//! This crate defines the text protocol spoken over the serial link between
//! the show controller (a host PC or another board) and the LED firmware.
//!
//! # Protocol Overview
//!
//! Every message, in both directions, is a single framed line:
//! ```text
//! !!<type>:<command>:{<key>=<value>,<key>=<value>,...}##
//! ```
//!
//! - `type` names the command family (`config`, `star`, `system`, `effect`)
//!   on requests, and is mirrored on responses. Failures that cannot be
//!   attributed to a family use the type `error`.
//! - `command` names the action inside the family (`set`, `add`, `ping`...).
//! - Parameters are an ordered list of string pairs; values are parsed on
//!   demand by whoever consumes them.
//!
//! Responses carry a `status` parameter (`ok`, `no_change`, `invalid_param`,
//! ...) and a human-readable `message`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod line;
pub mod parse;

pub use command::{
    Command, CommandError, MessageKind, Param, ValueError, COMMAND_LEN, KEY_LEN, MAX_FRAME_LEN,
    MAX_PARAMS, TYPE_LEN, VALUE_LEN,
};
pub use line::{LineAssembler, LineError};
pub use parse::{parse, ParseError, FRAME_PREFIX, FRAME_SUFFIX};
