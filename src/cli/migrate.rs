//! Migrate command implementation

use anyhow::{Context, Result};

use crate::config::{AppSettings, ConfigResolver};
use crate::db::{self, SAMPLE_MIGRATIONS};
use crate::logging::LogHandle;

pub fn run(resolver: &ConfigResolver, log: &LogHandle) -> Result<()> {
    // Nothing touches the database until the whole configuration is valid.
    let config = resolver.resolve()?.install()?;
    let settings = AppSettings::from_config(config)?;
    log.apply(settings.logger.level);

    let mut conn = db::connect(&settings.database)?;
    let latest = db::migrate(&mut conn, SAMPLE_MIGRATIONS)
        .with_context(|| format!("Migrating {}", settings.database.path.display()))?;

    println!("Database: {}", settings.database.path.display());
    match latest {
        Some(version) => println!("Schema version: {}", version),
        None => println!("Schema version: none"),
    }
    Ok(())
}
