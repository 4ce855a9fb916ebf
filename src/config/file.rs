//! File-based section loader.

use std::path::Path;

use serde_json::{Map, Number, Value};

use super::source::SectionLoader;
use super::ConfigError;

/// On-disk format of section files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Toml,
    Json,
}

impl Format {
    /// File extension used to locate a section file.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Loads `<dir>/<section>.<ext>` from disk.
///
/// A missing file means the section does not exist in `dir`. Any other
/// read failure, or content that fails to parse, is an error.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    format: Format,
}

impl FileLoader {
    /// Creates a loader for TOML section files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader for JSON section files.
    pub fn json() -> Self {
        Self::with_format(Format::Json)
    }

    pub fn with_format(format: Format) -> Self {
        Self { format }
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl SectionLoader for FileLoader {
    fn load(&self, dir: &Path, section: &str) -> Result<Option<Value>, ConfigError> {
        let path = dir.join(format!("{section}.{}", self.format.extension()));

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::ReadError { path, source: e }),
        };

        let value = match self.format {
            Format::Toml => {
                let table: toml::Table = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError {
                        path: path.clone(),
                        source: e,
                    })?;
                toml_to_json(toml::Value::Table(table))
            }
            Format::Json => serde_json::from_str(&contents)
                .map_err(|e| ConfigError::JsonParseError { path, source: e })?,
        };

        Ok(Some(value))
    }
}

/// Converts a TOML value into the container's tree.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_file_loader_loads_toml() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "database.toml",
            r#"
            default = "sqlite"
            ratio = 0.5
            started = 1979-05-27T07:32:00Z

            [connections.sqlite]
            file = "app.db"
            pool = [1, 2]
            "#,
        );

        let value = FileLoader::new()
            .load(dir.path(), "database")
            .unwrap()
            .unwrap();

        assert_eq!(value["default"], json!("sqlite"));
        assert_eq!(value["ratio"], json!(0.5));
        assert_eq!(value["started"], json!("1979-05-27T07:32:00Z"));
        assert_eq!(value["connections"]["sqlite"]["file"], json!("app.db"));
        assert_eq!(value["connections"]["sqlite"]["pool"], json!([1, 2]));
    }

    #[test]
    fn test_file_loader_loads_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.json", r#"{ "name": "demo", "debug": null }"#);

        let value = FileLoader::json().load(dir.path(), "app").unwrap().unwrap();

        assert_eq!(value, json!({ "name": "demo", "debug": null }));
    }

    #[test]
    fn test_file_loader_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = FileLoader::new().load(dir.path(), "absent").unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_file_loader_ignores_other_format() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.json", r#"{ "name": "demo" }"#);

        assert!(FileLoader::new().load(dir.path(), "app").unwrap().is_none());
    }

    #[test]
    fn test_file_loader_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.toml", "key = ");

        let result = FileLoader::new().load(dir.path(), "broken");

        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_file_loader_json_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.json", "{ \"key\": ");

        let result = FileLoader::json().load(dir.path(), "broken");

        assert!(matches!(result, Err(ConfigError::JsonParseError { .. })));
    }

    #[test]
    fn test_file_loader_formats() {
        assert_eq!(FileLoader::new().format(), Format::Toml);
        assert_eq!(FileLoader::json().format(), Format::Json);
        assert_eq!(FileLoader::with_format(Format::Json).format().extension(), "json");
    }
}
