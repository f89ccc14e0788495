//! Board-agnostic core logic for the Starcurtain LED star field
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Panel layout, coordinate mapping and the frame buffer
//! - Star simulation
//! - Buildup/Climax effects and the idle cycle
//! - Command handlers and the dispatch registry
//! - Configuration types and the settings file parser
//! - The LED transport trait

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod config;
pub mod effects;
pub mod render;
pub mod show;
pub mod sim;
pub mod traits;

pub use show::Show;
