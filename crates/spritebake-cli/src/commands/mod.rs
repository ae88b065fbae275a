//! Command implementations for the Spritebake CLI

pub mod crop;
pub mod inspect;
pub mod plan;
pub mod render;
mod reporting;

/// Exit status for configuration and usage errors.
pub const EXIT_CONFIG: u8 = 2;
