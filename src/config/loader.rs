//! Config source discovery and parsing

use super::document::ConfigDocument;
use super::error::{ConfigError, ConfigResult};
use super::value::{ConfigValue, Mapping, OpaqueKind, OpaqueRef};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions tried for every source stem, in priority order.
pub const SOURCE_EXTENSIONS: &[&str] = &["toml", "yaml", "yml"];

/// Find `<stem>.<ext>` in `dir`, first supported extension wins.
pub fn discover_source(dir: &Path, stem: &str) -> Option<PathBuf> {
    let mut found = SOURCE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .filter(|path| path.is_file());

    let first = found.next()?;
    for shadowed in found {
        tracing::warn!(
            "Ignoring {} because {} takes precedence",
            shadowed.display(),
            first.display()
        );
    }
    Some(first)
}

/// Read and parse one source file into a document.
pub fn load_document(path: &Path) -> ConfigResult<ConfigDocument> {
    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let origin = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let namespaces = match ext.as_str() {
        "toml" => parse_toml(&content, path, &origin)?,
        "yaml" | "yml" => parse_yaml(&content, path, &origin)?,
        other => {
            return Err(parse_error(
                path,
                None,
                format!("unsupported config extension '.{other}'"),
            ))
        }
    };

    let mut doc = ConfigDocument::from_origin(origin);
    for (name, value) in namespaces {
        match value {
            ConfigValue::Mapping(entries) => doc.set_namespace(name, entries),
            // `name: ~` or a namespace whose children are all commented out.
            ConfigValue::Null => doc.clear_namespace(name),
            other => {
                return Err(parse_error(
                    path,
                    None,
                    format!("top-level entry '{name}' must be a mapping, found {}", other.kind()),
                ))
            }
        }
    }

    tracing::debug!(
        "Loaded {} namespace(s) from {}",
        doc.namespace_names().count(),
        path.display()
    );
    Ok(doc)
}

fn parse_error(path: &Path, location: Option<(usize, usize)>, message: String) -> ConfigError {
    ConfigError::Parse {
        source_path: path.to_path_buf(),
        line: location.map(|(line, _)| line),
        column: location.map(|(_, column)| column),
        message,
    }
}

fn parse_toml(content: &str, path: &Path, origin: &Path) -> ConfigResult<Mapping> {
    let table: toml::Table = toml::from_str(content).map_err(|e| {
        let location = e.span().map(|span| line_column(content, span.start));
        parse_error(path, location, e.message().to_string())
    })?;

    Ok(table.into_iter().map(|(k, v)| (k, from_toml(v, origin))).collect())
}

fn from_toml(value: toml::Value, origin: &Path) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            ConfigValue::Sequence(items.into_iter().map(|v| from_toml(v, origin)).collect())
        }
        toml::Value::Table(table) => {
            if table.len() == 1 {
                if let Some((marker, toml::Value::String(target))) = table.iter().next() {
                    if let Some(kind) = OpaqueKind::from_marker(marker) {
                        return opaque(kind, target.clone(), origin);
                    }
                }
            }
            ConfigValue::Mapping(table.into_iter().map(|(k, v)| (k, from_toml(v, origin))).collect())
        }
    }
}

fn parse_yaml(content: &str, path: &Path, origin: &Path) -> ConfigResult<Mapping> {
    let mut raw: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| yaml_error(path, &e))?;
    raw.apply_merge().map_err(|e| yaml_error(path, &e))?;

    match from_yaml(raw, origin) {
        // An empty YAML file is an empty document.
        ConfigValue::Null => Ok(Mapping::new()),
        ConfigValue::Mapping(m) => Ok(m),
        other => Err(parse_error(
            path,
            None,
            format!("document root must be a mapping, found {}", other.kind()),
        )),
    }
}

/// serde_yaml renders its own " at line L column C"; the structured location replaces it.
fn yaml_error(path: &Path, err: &serde_yaml::Error) -> ConfigError {
    let message = err.to_string();
    match err.location() {
        Some(loc) => {
            let suffix = format!(" at line {} column {}", loc.line(), loc.column());
            parse_error(path, Some((loc.line(), loc.column())), message.replacen(&suffix, "", 1))
        }
        None => parse_error(path, None, message),
    }
}

fn from_yaml(value: serde_yaml::Value, origin: &Path) -> ConfigValue {
    match value {
        serde_yaml::Value::Null => ConfigValue::Null,
        serde_yaml::Value::Bool(b) => ConfigValue::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Integer(i),
            None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => ConfigValue::String(s),
        serde_yaml::Value::Sequence(items) => {
            ConfigValue::Sequence(items.into_iter().map(|v| from_yaml(v, origin)).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            if map.len() == 1 {
                if let Some((serde_yaml::Value::String(marker), serde_yaml::Value::String(target))) =
                    map.iter().next()
                {
                    if let Some(kind) = OpaqueKind::from_marker(marker) {
                        return opaque(kind, target.clone(), origin);
                    }
                }
            }
            ConfigValue::Mapping(
                map.into_iter().map(|(k, v)| (yaml_key(k), from_yaml(v, origin))).collect(),
            )
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value, origin),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other).unwrap_or_default().trim_end().to_string(),
    }
}

fn opaque(kind: OpaqueKind, target: String, origin: &Path) -> ConfigValue {
    ConfigValue::Opaque(OpaqueRef { kind, target, origin: Some(origin.to_path_buf()) })
}

/// 1-based line and column of a byte offset.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let prefix = &content[..offset.min(content.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discover_prefers_toml() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.yaml"), "logger:\n  level: info\n").expect("write");
        fs::write(tmp.path().join("config.toml"), "[logger]\nlevel = \"debug\"\n").expect("write");

        let found = discover_source(tmp.path(), "config").expect("source");
        assert_eq!(found, tmp.path().join("config.toml"));
    }

    #[test]
    fn discover_returns_none_when_missing() {
        let tmp = TempDir::new().expect("tmp");
        assert!(discover_source(tmp.path(), "prod").is_none());
    }

    #[test]
    fn toml_preserves_key_order() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[logger]\nlevel = \"debug\"\n\n[database]\npool_size = 5\npath = \"a.db\"\n")
            .expect("write");

        let doc = load_document(&path).expect("parse");
        assert_eq!(doc.namespace_names().collect::<Vec<_>>(), vec!["logger", "database"]);
        let db = doc.namespace("database").expect("database");
        assert_eq!(db.keys().collect::<Vec<_>>(), vec!["pool_size", "path"]);
    }

    #[test]
    fn toml_markers_become_opaque_refs() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "[database]\npath = { \"$path\" = \"../priv/sample.db\" }\n\n[endpoint]\nrender_errors = { view = { \"$fn\" = \"Sample.ErrorView\" } }\n",
        )
        .expect("write");

        let doc = load_document(&path).expect("parse");
        match doc.get("database.path") {
            Some(ConfigValue::Opaque(r)) => {
                assert_eq!(r.kind, OpaqueKind::Path);
                assert_eq!(r.target, "../priv/sample.db");
                assert_eq!(r.origin.as_deref(), Some(tmp.path()));
            }
            other => panic!("expected path reference, got {other:?}"),
        }
        match doc.get("endpoint.render_errors.view") {
            Some(ConfigValue::Opaque(r)) => assert_eq!(r.kind, OpaqueKind::Function),
            other => panic!("expected function reference, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_reports_location() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[database]\npool_size = = 5\n").expect("write");

        match load_document(&path) {
            Err(ConfigError::Parse { source_path, line, .. }) => {
                assert_eq!(source_path, path);
                assert_eq!(line, Some(2));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn yaml_null_and_markers() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("prod.yml");
        fs::write(&path, "database:\n  stacktrace: ~\n  path:\n    $path: /var/lib/sample.db\n")
            .expect("write");

        let doc = load_document(&path).expect("parse");
        assert_eq!(doc.get("database.stacktrace"), Some(&ConfigValue::Null));
        assert!(matches!(doc.get("database.path"), Some(ConfigValue::Opaque(_))));
    }

    #[test]
    fn empty_yaml_is_empty_document() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("test.yaml");
        fs::write(&path, "").expect("write");

        let doc = load_document(&path).expect("parse");
        assert!(doc.is_empty());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "database:\n  pool_size: [1, 2\n").expect("write");

        assert!(matches!(load_document(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "port = 4000\n").expect("write");

        let err = load_document(&path).expect_err("scalar namespace");
        assert!(err.to_string().contains("top-level entry 'port' must be a mapping"));
    }

    #[test]
    fn line_column_is_one_based() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn null_namespace_is_kept_as_null() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("prod.yaml");
        fs::write(&path, "database: ~
logger:
  # level: info
").expect("write");

        let doc = load_document(&path).expect("parse");
        assert_eq!(doc.namespace_names().collect::<Vec<_>>(), vec!["database", "logger"]);
        assert_eq!(doc.get("database"), Some(&ConfigValue::Null));
        assert_eq!(doc.get("logger"), Some(&ConfigValue::Null));
    }

    #[test]
    fn yaml_error_reports_location_once() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "database:\n  pool_size: [1, 2\n").expect("write");

        let err = load_document(&path).expect_err("malformed");
        let (line, column) = match &err {
            ConfigError::Parse { line: Some(line), column: Some(column), .. } => (*line, *column),
            other => panic!("expected located parse error, got {other:?}"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains(&format!("at line {line}, column {column}")));
        assert!(!rendered.contains(&format!("at line {line} column {column}")));
    }

    #[test]
    fn yaml_merge_keys_are_applied() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("prod.yaml");
        fs::write(
            &path,
            "shared: &db\n  pool_size: 5\n  stacktrace: true\ndatabase:\n  <<: *db\n  pool_size: 20\n",
        )
        .expect("write");

        let doc = load_document(&path).expect("parse");
        let db = doc.namespace("database").expect("database");
        assert!(!db.contains_key("<<"));
        assert_eq!(db.get("pool_size"), Some(&ConfigValue::Integer(20)));
        assert_eq!(db.get("stacktrace"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn scalar_merge_key_is_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("prod.yaml");
        fs::write(&path, "database:\n  <<: 5\n").expect("write");

        assert!(matches!(load_document(&path), Err(ConfigError::Parse { .. })));
    }
}
