//! Get command implementation

use anyhow::Result;
use clap::Args;

use crate::config::ConfigResolver;

#[derive(Args)]
pub struct GetArgs {
    /// Dotted key, namespace first (e.g. database.pool_size)
    #[arg(value_name = "KEY")]
    pub key: String,
}

pub fn run(resolver: &ConfigResolver, args: GetArgs) -> Result<()> {
    let config = resolver.resolve()?;
    println!("{}", config.require(&args.key)?);
    Ok(())
}
