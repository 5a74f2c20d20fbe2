//! Configuration errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse {}{}: {message}", source_path.display(), format_location(*line, *column))]
    Parse { source_path: PathBuf, line: Option<usize>, column: Option<usize>, message: String },

    #[error("No base configuration found in {}: expected {stem}.toml, {stem}.yaml or {stem}.yml", dir.display())]
    SourceNotFound { dir: PathBuf, stem: String },

    #[error("Failed reading config file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required configuration key: {key}")]
    MissingRequiredKey { key: String },

    #[error("Invalid value for {key}: expected {expected}, found {found}")]
    TypeMismatch { key: String, expected: String, found: String },

    #[error("Invalid environment name '{0}': use only letters, digits, '-' and '_'")]
    InvalidEnvironment(String),

    #[error("Effective configuration is already installed")]
    AlreadyInstalled,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn format_location(line: Option<usize>, column: Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_source_and_location() {
        let err = ConfigError::Parse {
            source_path: PathBuf::from("config/prod.toml"),
            line: Some(3),
            column: Some(7),
            message: "expected `=`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config/prod.toml at line 3, column 7: expected `=`"
        );
    }

    #[test]
    fn parse_error_without_location() {
        let err = ConfigError::Parse {
            source_path: PathBuf::from("config/config.yaml"),
            line: None,
            column: None,
            message: "top-level entry 'port' must be a mapping".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config/config.yaml: top-level entry 'port' must be a mapping"
        );
    }
}
