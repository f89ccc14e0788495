//! Command model for the Starcurtain protocol
//!
//! A [`Command`] is the structured form of one framed line: a type (command
//! family), a command name, and an ordered list of string parameters.
//! Requests, responses, errors and notifications all share this shape.

use core::fmt::{self, Write};

use heapless::{String, Vec};

/// Maximum length of the type field
pub const TYPE_LEN: usize = 16;

/// Maximum length of the command field
pub const COMMAND_LEN: usize = 24;

/// Maximum length of a parameter key
pub const KEY_LEN: usize = 16;

/// Maximum length of a parameter value
pub const VALUE_LEN: usize = 64;

/// Maximum number of parameters per command
pub const MAX_PARAMS: usize = 12;

/// Maximum length of a complete encoded frame
pub const MAX_FRAME_LEN: usize = 1024;

/// Type used for protocol-level failures (parse errors, unknown commands)
pub const ERROR_TYPE: &str = "error";

/// Errors that can occur while building or encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A type, command, key or value exceeds its capacity
    FieldTooLong,
    /// More than [`MAX_PARAMS`] distinct parameters
    TooManyParams,
    /// Output buffer too small for encoding
    BufferTooSmall,
}

/// A parameter value could not be interpreted as the requested type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueError {
    /// Value is present but malformed
    Invalid,
}

/// Role of a command on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// No `status` parameter: a request or an unsolicited notification
    Request,
    /// Successful response (`status` is `ok` or `no_change`)
    Response,
    /// Error response (type `error`, or any other `status`)
    Error,
}

/// One `key=value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Param {
    pub key: String<KEY_LEN>,
    pub value: String<VALUE_LEN>,
}

/// A parsed or constructed protocol message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Command family (`config`, `star`, ...) or `error`
    pub msg_type: String<TYPE_LEN>,
    /// Action inside the family
    pub command: String<COMMAND_LEN>,
    /// Parameters in insertion order, keys unique
    params: Vec<Param, MAX_PARAMS>,
}

impl Command {
    /// Create a command with no parameters
    pub fn new(msg_type: &str, command: &str) -> Result<Self, CommandError> {
        Ok(Self {
            msg_type: String::try_from(msg_type).map_err(|_| CommandError::FieldTooLong)?,
            command: String::try_from(command).map_err(|_| CommandError::FieldTooLong)?,
            params: Vec::new(),
        })
    }

    /// Create an empty response mirroring a request's type and command
    pub fn response_to(request: &Command) -> Self {
        Self {
            msg_type: request.msg_type.clone(),
            command: request.command.clone(),
            params: Vec::new(),
        }
    }

    /// Create a protocol-level error response
    ///
    /// Over-long command names and messages are truncated rather than
    /// rejected, so an error can always be reported.
    pub fn error(command: &str, message: &str) -> Self {
        let mut cmd = Self {
            msg_type: truncated(ERROR_TYPE),
            command: truncated(command),
            params: Vec::new(),
        };
        let _ = cmd.set_param("status", "error");
        let _ = cmd.set_param("message", truncated::<VALUE_LEN>(message).as_str());
        cmd
    }

    /// Check the type and command fields
    pub fn is(&self, msg_type: &str, command: &str) -> bool {
        self.msg_type == msg_type && self.command == command
    }

    /// Classify this message by its type and `status` parameter
    pub fn kind(&self) -> MessageKind {
        if self.msg_type == ERROR_TYPE {
            return MessageKind::Error;
        }
        match self.param("status") {
            None => MessageKind::Request,
            Some("ok") | Some("no_change") => MessageKind::Response,
            Some(_) => MessageKind::Error,
        }
    }

    /// Set a parameter
    ///
    /// An existing key is updated in place (last write wins, original
    /// position kept); a new key is appended.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), CommandError> {
        let value: String<VALUE_LEN> =
            String::try_from(value).map_err(|_| CommandError::FieldTooLong)?;

        if let Some(existing) = self.params.iter_mut().find(|p| p.key == key) {
            existing.value = value;
            return Ok(());
        }

        let key = String::try_from(key).map_err(|_| CommandError::FieldTooLong)?;
        self.params
            .push(Param { key, value })
            .map_err(|_| CommandError::TooManyParams)
    }

    /// Set a parameter from format arguments
    pub fn set_param_fmt(&mut self, key: &str, args: fmt::Arguments<'_>) -> Result<(), CommandError> {
        let mut value: String<VALUE_LEN> = String::new();
        value
            .write_fmt(args)
            .map_err(|_| CommandError::FieldTooLong)?;
        self.set_param(key, &value)
    }

    /// Get a raw parameter value
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Get a raw parameter value, or a default if absent
    pub fn param_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.param(key).unwrap_or(default)
    }

    /// Check if a parameter key is present (even with an empty value)
    pub fn has_param(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key == key)
    }

    /// All parameters in insertion order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Remove all parameters
    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    /// Non-empty parameter value, trimmed
    fn supplied(&self, key: &str) -> Option<&str> {
        self.param(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Parse a parameter as `f32`
    ///
    /// Returns `Ok(None)` when the key is absent or its value is empty.
    pub fn param_f32(&self, key: &str) -> Result<Option<f32>, ValueError> {
        match self.supplied(key) {
            None => Ok(None),
            Some(v) => v.parse::<f32>().map(Some).map_err(|_| ValueError::Invalid),
        }
    }

    /// Parse a parameter as an integer
    pub fn param_i32(&self, key: &str) -> Result<Option<i32>, ValueError> {
        match self.supplied(key) {
            None => Ok(None),
            Some(v) => v.parse::<i32>().map(Some).map_err(|_| ValueError::Invalid),
        }
    }

    /// Parse a parameter as a boolean (`true`/`false`/`1`/`0`, any case)
    pub fn param_bool(&self, key: &str) -> Result<Option<bool>, ValueError> {
        match self.supplied(key) {
            None => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(Some(false)),
            Some(_) => Err(ValueError::Invalid),
        }
    }

    /// Parse a parameter as a hexadecimal number (`RRGGBB`, `#RRGGBB`, `0xRRGGBB`)
    pub fn param_hex(&self, key: &str) -> Result<Option<u32>, ValueError> {
        match self.supplied(key) {
            None => Ok(None),
            Some(v) => {
                let digits = v
                    .strip_prefix('#')
                    .or_else(|| v.strip_prefix("0x"))
                    .or_else(|| v.strip_prefix("0X"))
                    .unwrap_or(v);
                if digits.is_empty() || digits.len() > 8 {
                    return Err(ValueError::Invalid);
                }
                u32::from_str_radix(digits, 16)
                    .map(Some)
                    .map_err(|_| ValueError::Invalid)
            }
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CommandError> {
        let mut writer = SliceWriter { buffer, len: 0 };
        write!(writer, "{}", self).map_err(|_| CommandError::BufferTooSmall)?;
        Ok(writer.len)
    }

    /// Encode this command into a heapless String
    pub fn encode_to_string(&self) -> Result<String<MAX_FRAME_LEN>, CommandError> {
        let mut out = String::new();
        write!(out, "{}", self).map_err(|_| CommandError::BufferTooSmall)?;
        Ok(out)
    }
}

/// Wire form: `!!type:command:{k=v,...}##`
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!!{}:{}:{{", self.msg_type, self.command)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            write!(f, "{}={}", p.key, p.value)?;
        }
        f.write_str("}##")
    }
}

/// Copy as much of `s` as fits, never splitting a character
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.len + bytes.len();
        if end > self.buffer.len() {
            return Err(fmt::Error);
        }
        self.buffer[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}
