//! Spritebake CLI library.
//!
//! Batch orchestration, configuration loading, logging setup and the
//! command implementations behind the `spritebake` binary.

pub mod batch;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod logging;
