//! layered-config: layered configuration resolution with environment overlays
//!
//! A base configuration source is deep-merged with an optional
//! environment-specific override into one read-only effective configuration,
//! which then drives the logger and the database collaborators.

pub mod cli;
pub mod config;
pub mod db;
pub mod logging;

pub use config::{ConfigError, ConfigResolver, ConfigValue, EffectiveConfig};
