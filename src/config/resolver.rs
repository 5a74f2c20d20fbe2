//! Base + environment override resolution.

use super::document::ConfigDocument;
use super::effective::EffectiveConfig;
use super::error::{ConfigError, ConfigResult};
use super::loader::{discover_source, load_document};
use super::merge::merge_documents;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const BASE_SOURCE_STEM: &str = "config";

/// Resolves the effective configuration for one environment.
///
/// The base source is `<dir>/config.{toml,yaml,yml}`; the override for
/// environment `env` is `<dir>/<env>.{toml,yaml,yml}` and may be absent.
///
/// # Example
///
/// ```no_run
/// use layered_config::config::ConfigResolver;
///
/// let resolver = ConfigResolver::new("config", "prod")?;
/// let config = resolver.resolve()?;
/// let pool_size = config.require_int("database.pool_size")?;
/// # Ok::<(), layered_config::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config_dir: PathBuf,
    environment: String,
    base_stem: String,
}

impl ConfigResolver {
    pub fn new(config_dir: impl Into<PathBuf>, environment: impl Into<String>) -> ConfigResult<Self> {
        let environment = environment.into();
        validate_environment(&environment)?;
        Ok(Self { config_dir: config_dir.into(), environment, base_stem: BASE_SOURCE_STEM.to_string() })
    }

    /// Use a different file stem for the base source.
    pub fn with_base_stem(mut self, stem: impl Into<String>) -> Self {
        self.base_stem = stem.into();
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn environment_name(&self) -> &str {
        &self.environment
    }

    pub fn load_base(&self) -> ConfigResult<ConfigDocument> {
        let path = self.base_source().ok_or_else(|| {
            ConfigError::SourceNotFound { dir: self.config_dir.clone(), stem: self.base_stem.clone() }
        })?;
        tracing::debug!("Loading base config from {}", path.display());
        load_document(&path)
    }

    /// Path of the base source, if one exists.
    pub fn base_source(&self) -> Option<PathBuf> {
        discover_source(&self.config_dir, &self.base_stem)
    }

    pub fn override_source_exists(&self, env: &str) -> bool {
        self.override_source(env).is_some()
    }

    /// Parse the override for `env`, or an empty document if there is none.
    pub fn load_override(&self, env: &str) -> ConfigResult<ConfigDocument> {
        match self.override_source(env) {
            Some(path) => {
                tracing::debug!("Loading {} override from {}", env, path.display());
                load_document(&path)
            }
            None => {
                tracing::debug!("No override for environment '{}' in {}", env, self.config_dir.display());
                Ok(ConfigDocument::new())
            }
        }
    }

    pub fn resolve(&self) -> ConfigResult<EffectiveConfig> {
        let base = self.load_base()?;
        let overlay = self.load_override(&self.environment)?;
        let merged = merge_documents(&base, &overlay);

        tracing::info!(
            "Resolved configuration for '{}': {} namespace(s), override {}",
            self.environment,
            merged.len(),
            if overlay.origin().is_some() { "applied" } else { "absent" }
        );
        Ok(EffectiveConfig::new(self.environment.clone(), merged))
    }

    /// Path of the override source for `env`, if one exists.
    pub fn override_source(&self, env: &str) -> Option<PathBuf> {
        // The base stem is never an override, and names that could leave the directory never match.
        if env == self.base_stem || validate_environment(env).is_err() {
            return None;
        }
        discover_source(&self.config_dir, env)
    }
}

fn validate_environment(env: &str) -> ConfigResult<()> {
    let valid = !env.is_empty()
        && env.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvironment(env.to_string()))
    }
}
