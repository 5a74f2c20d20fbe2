//! Show command implementation

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::config::{ConfigError, ConfigResolver};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only print this namespace
    #[arg(short, long, value_name = "NAME")]
    pub namespace: Option<String>,
}

pub fn run(resolver: &ConfigResolver, args: ShowArgs) -> Result<()> {
    let config = resolver.resolve()?;

    let rendered = match &args.namespace {
        Some(name) => {
            let section = config
                .namespace(name)
                .ok_or_else(|| ConfigError::MissingRequiredKey { key: name.clone() })?;
            render(section, args.format)?
        }
        None => render(&config, args.format)?,
    };

    println!("{}", rendered.trim_end());
    Ok(())
}

fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}
