//! Configuration for verdant world generation.
//!
//! Settings persist to disk as RON files and cover the world parameters,
//! the biome table, both population presets, and the headless simulation.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SimulationConfig, default_biomes, default_config_dir};
pub use error::ConfigError;
