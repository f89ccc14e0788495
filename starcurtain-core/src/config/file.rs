//! Simple TOML parser for show configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `starcurtain.toml`. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - `[section]` headers: `layout`, `animation`, `color`, `idle`
//! - Key = value pairs (integer, float, boolean)
//! - Inline boolean arrays: `invert = [false, true]`
//! - Comments (# ...)
//!
//! Keys missing from the file keep their defaults.

use heapless::String;
use smart_leds::RGB8;

use crate::effects::{MAX_BOOST, MAX_DURATION_S, MAX_MULTIPLIER};

use super::layout::MAX_PANELS;
use super::sim::{limits, ShowConfig};

/// Parse error, carrying the 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection(usize),
    /// Key not known in its section
    UnknownKey(usize),
    /// Value has the wrong type or is out of range
    InvalidValue(usize),
    /// Array longer than its capacity
    TooManyItems(usize),
}

impl ConfigError {
    /// Line the error was found on
    pub fn line(&self) -> usize {
        match *self {
            ConfigError::InvalidSection(line)
            | ConfigError::UnknownKey(line)
            | ConfigError::InvalidValue(line)
            | ConfigError::TooManyItems(line) => line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Layout,
    Animation,
    Color,
    Idle,
}

/// Parse a configuration file into a [`ShowConfig`]
pub fn parse_config(input: &str) -> Result<ShowConfig, ConfigError> {
    let mut config = ShowConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = match line[1..line.len() - 1].trim() {
                "layout" => Section::Layout,
                "animation" => Section::Animation,
                "color" => Section::Color,
                "idle" => Section::Idle,
                _ => return Err(ConfigError::InvalidSection(line_no)),
            };
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or(ConfigError::InvalidValue(line_no))?;

        let value = Value { raw: value, line: line_no };
        match section {
            Section::Root => return Err(ConfigError::UnknownKey(line_no)),
            Section::Layout => apply_layout(&mut config, key, value)?,
            Section::Animation => apply_animation(&mut config, key, value)?,
            Section::Color => apply_color(&mut config, key, value)?,
            Section::Idle => apply_idle(&mut config, key, value)?,
        }
    }

    Ok(config)
}

fn apply_layout(config: &mut ShowConfig, key: &str, value: Value<'_>) -> Result<(), ConfigError> {
    let layout = &mut config.layout;
    match key {
        "panels" => layout.panels = value.usize_in(1, MAX_PANELS)?,
        "width" => layout.width = value.usize_in(1, u16::MAX as usize)?,
        "height" => layout.height = value.usize_in(1, u16::MAX as usize)?,
        "serpentine" => layout.serpentine = value.bool()?,
        "invert" => layout.invert = value.bool_array()?,
        _ => return Err(ConfigError::UnknownKey(value.line)),
    }
    Ok(())
}

fn apply_animation(
    config: &mut ShowConfig,
    key: &str,
    value: Value<'_>,
) -> Result<(), ConfigError> {
    match key {
        "stars" => config.initial_stars = value.int_checked(limits::star_count)? as usize,
        "min_speed" => config.sim.min_speed = value.float_checked(limits::speed)?,
        "max_speed" => config.sim.max_speed = value.float_checked(limits::speed)?,
        "fade" => config.sim.fade = value.float_checked(limits::fade)?,
        "frame_ms" => config.sim.frame_ms = value.int_checked(limits::frame_ms)? as u32,
        "random_rows" => config.sim.random_rows = value.bool()?,
        "wrap" => config.sim.wrap = value.bool()?,
        _ => return Err(ConfigError::UnknownKey(value.line)),
    }
    Ok(())
}

fn apply_color(config: &mut ShowConfig, key: &str, value: Value<'_>) -> Result<(), ConfigError> {
    let color: &mut RGB8 = &mut config.sim.color;
    let channel = value.int_checked(limits::channel)? as u8;
    match key {
        "r" => color.r = channel,
        "g" => color.g = channel,
        "b" => color.b = channel,
        _ => return Err(ConfigError::UnknownKey(value.line)),
    }
    Ok(())
}

fn apply_idle(config: &mut ShowConfig, key: &str, value: Value<'_>) -> Result<(), ConfigError> {
    let idle = &mut config.idle;
    match key {
        "enabled" => idle.enabled = value.bool()?,
        "timeout_ms" => idle.timeout_ms = value.int_checked(|v| v > 0)? as u32,
        "rest_ms" => idle.rest_ms = value.int_checked(|v| v >= 0)? as u32,
        "stars" => idle.stars = value.int_checked(limits::star_count)? as usize,
        "buildup_duration" => idle.buildup_duration_s = value.float_checked(valid_duration)?,
        "buildup_multiplier" => idle.buildup_multiplier = value.float_checked(valid_multiplier)?,
        "climax_duration" => idle.climax_duration_s = value.float_checked(valid_duration)?,
        "climax_boost" => idle.climax_boost = value.float_checked(valid_boost)?,
        _ => return Err(ConfigError::UnknownKey(value.line)),
    }
    Ok(())
}

fn valid_duration(v: f32) -> bool {
    v > 0.0 && v <= MAX_DURATION_S
}

fn valid_multiplier(v: f32) -> bool {
    v > 0.0 && v <= MAX_MULTIPLIER
}

fn valid_boost(v: f32) -> bool {
    v > 0.0 && v <= MAX_BOOST
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Raw value text with its line number for error reporting
#[derive(Clone, Copy)]
struct Value<'a> {
    raw: &'a str,
    line: usize,
}

impl Value<'_> {
    fn invalid(&self) -> ConfigError {
        ConfigError::InvalidValue(self.line)
    }

    fn bool(&self) -> Result<bool, ConfigError> {
        match self.raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.invalid()),
        }
    }

    fn int(&self) -> Result<i32, ConfigError> {
        strip_underscores(self.raw)
            .parse::<i32>()
            .map_err(|_| self.invalid())
    }

    fn int_checked(&self, check: impl Fn(i32) -> bool) -> Result<i32, ConfigError> {
        let v = self.int()?;
        if check(v) {
            Ok(v)
        } else {
            Err(self.invalid())
        }
    }

    fn usize_in(&self, min: usize, max: usize) -> Result<usize, ConfigError> {
        let v = self.int()?;
        if v < 0 || (v as usize) < min || (v as usize) > max {
            return Err(self.invalid());
        }
        Ok(v as usize)
    }

    fn float_checked(&self, check: impl Fn(f32) -> bool) -> Result<f32, ConfigError> {
        let v = self.raw.parse::<f32>().map_err(|_| self.invalid())?;
        if check(v) {
            Ok(v)
        } else {
            Err(self.invalid())
        }
    }

    fn bool_array(&self) -> Result<[bool; MAX_PANELS], ConfigError> {
        let inner = self
            .raw
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or(self.invalid())?;

        let mut out = [false; MAX_PANELS];
        let mut count = 0;
        for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if count == MAX_PANELS {
                return Err(ConfigError::TooManyItems(self.line));
            }
            out[count] = Value { raw: item, line: self.line }.bool()?;
            count += 1;
        }
        Ok(out)
    }
}

/// Drop TOML digit separators (`30_000`)
fn strip_underscores(s: &str) -> String<16> {
    let mut out = String::new();
    for c in s.chars().filter(|&c| c != '_') {
        if out.push(c).is_err() {
            out.clear();
            break;
        }
    }
    out
}
