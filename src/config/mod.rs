//! Layered configuration resolution
//!
//! A base source is merged with an optional environment-specific override
//! (override > base) into one read-only effective configuration.

pub mod document;
pub mod effective;
pub mod error;
pub mod loader;
pub mod merge;
pub mod resolver;
pub mod settings;
pub mod value;

pub use document::ConfigDocument;
pub use effective::EffectiveConfig;
pub use error::{ConfigError, ConfigResult};
pub use resolver::{ConfigResolver, DEFAULT_ENVIRONMENT};
pub use settings::{AppSettings, DatabaseSettings, LogLevel, LoggerSettings};
pub use value::{ConfigValue, Mapping, OpaqueKind, OpaqueRef};
