//! Check command implementation

use anyhow::Result;

use crate::config::{AppSettings, ConfigResolver};

pub fn run(resolver: &ConfigResolver) -> Result<()> {
    let env = resolver.environment_name();
    let config = resolver.resolve()?;
    let settings = AppSettings::from_config(&config)?;

    println!("Environment: {}", env);
    if let Some(base) = resolver.base_source() {
        println!("Base: {}", base.display());
    }
    match resolver.override_source(env) {
        Some(path) => println!("Override: {}", path.display()),
        None => println!("Override: none"),
    }
    println!("Namespaces: {}", config.namespaces().collect::<Vec<_>>().join(", "));
    println!("  database.path: {}", settings.database.path.display());
    println!("  database.pool_size: {}", settings.database.pool_size);
    println!("  database.stacktrace: {}", settings.database.stacktrace);
    println!("  logger.level: {}", settings.logger.level);
    println!("Configuration OK");

    Ok(())
}
