//! Build script for starcurtain-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates starcurtain.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// LEDs the firmware is compiled for (5 panels of 20 x 26)
const COMPILED_PIXELS: i64 = 5 * 20 * 26;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate starcurtain.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=starcurtain.toml");

    let config_path = Path::new("starcurtain.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: starcurtain.toml not found!                              ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a starcurtain.toml settings file.           ║\n\
            ║  Please create one in the starcurtain-firmware directory.        ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read starcurtain.toml                          ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in starcurtain.toml                  ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_layout(&config, &mut errors);
    validate_animation(&config, &mut errors);
    validate_color(&config, &mut errors);
    validate_idle(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in starcurtain.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=starcurtain.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the four known sections, each a table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !["layout", "animation", "color", "idle"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    config.get(name).and_then(|s| s.as_table())
}

/// Integer or float field as f64
fn number(table: &toml::Table, key: &str) -> Option<f64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) => Some(*v as f64),
        Some(toml::Value::Float(v)) => Some(*v),
        _ => None,
    }
}

fn check_int(
    table: &toml::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(_) => errors.push(format!("[{}] {} must be an integer {}-{}", section, key, min, max)),
    }
}

fn check_float(
    table: &toml::Table,
    section: &str,
    key: &str,
    min_exclusive: f64,
    max: f64,
    errors: &mut Vec<String>,
) {
    if table.get(key).is_none() {
        return;
    }
    match number(table, key) {
        Some(v) if v > min_exclusive && v <= max => {}
        _ => errors.push(format!("[{}] {} must be in ({}, {}]", section, key, min_exclusive, max)),
    }
}

fn check_bool(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(value) = table.get(key) {
        if !value.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(layout) = section(config, "layout") else {
        return;
    };

    check_int(layout, "layout", "panels", 1, 8, errors);
    check_int(layout, "layout", "width", 1, 65_535, errors);
    check_int(layout, "layout", "height", 1, 65_535, errors);
    check_bool(layout, "layout", "serpentine", errors);

    match layout.get("invert") {
        None => {}
        Some(toml::Value::Array(flags)) => {
            if flags.len() > 8 {
                errors.push("[layout] invert has more than 8 entries".to_string());
            }
            if !flags.iter().all(|f| f.is_bool()) {
                errors.push("[layout] invert must be an array of booleans".to_string());
            }
        }
        Some(_) => errors.push("[layout] invert must be an array".to_string()),
    }

    let dim = |key: &str, default: i64| layout.get(key).and_then(|v| v.as_integer()).unwrap_or(default);
    let pixels = dim("panels", 5) * dim("width", 20) * dim("height", 26);
    if pixels != COMPILED_PIXELS {
        println!(
            "cargo:warning=starcurtain.toml layout has {} LEDs but the firmware is built for {}; defaults will be used",
            pixels, COMPILED_PIXELS
        );
    }
}

fn validate_animation(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(animation) = section(config, "animation") else {
        return;
    };

    check_int(animation, "animation", "stars", 0, 500, errors);
    check_float(animation, "animation", "min_speed", 0.0, f64::MAX, errors);
    check_float(animation, "animation", "max_speed", 0.0, f64::MAX, errors);
    check_int(animation, "animation", "frame_ms", 1, 999, errors);
    check_bool(animation, "animation", "random_rows", errors);
    check_bool(animation, "animation", "wrap", errors);

    if animation.get("fade").is_some() {
        match number(animation, "fade") {
            Some(v) if (0.0..=1.0).contains(&v) => {}
            _ => errors.push("[animation] fade must be in [0, 1]".to_string()),
        }
    }
}

fn validate_color(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(color) = section(config, "color") else {
        return;
    };
    for channel in ["r", "g", "b"] {
        check_int(color, "color", channel, 0, 255, errors);
    }
}

fn validate_idle(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(idle) = section(config, "idle") else {
        return;
    };

    check_bool(idle, "idle", "enabled", errors);
    check_int(idle, "idle", "timeout_ms", 1, i32::MAX as i64, errors);
    check_int(idle, "idle", "rest_ms", 0, i32::MAX as i64, errors);
    check_int(idle, "idle", "stars", 0, 500, errors);
    check_float(idle, "idle", "buildup_duration", 0.0, 120.0, errors);
    check_float(idle, "idle", "buildup_multiplier", 0.0, 20.0, errors);
    check_float(idle, "idle", "climax_duration", 0.0, 120.0, errors);
    check_float(idle, "idle", "climax_boost", 0.0, 10.0, errors);
}
