//! Lazy dot-path access to sectioned configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::builder::ContainerBuilder;
use super::file::FileLoader;
use super::source::{deep_merge, lookup, segments, write_at_path, SectionLoader};
use super::ConfigError;

/// Configuration store addressed by dotted paths.
///
/// The first segment of a path names a *section*, backed by one file under
/// the base path. `database.connections.sqlite` loads `database` on first
/// access and then walks `connections` and `sqlite` inside it.
///
/// When an environment is set, `<base>/<environment>/<section>` is merged
/// over the base file: mappings merge recursively, anything else in the
/// override replaces the base value.
///
/// ## Resolved-path cache
///
/// Lookups take `&mut self` because [`exists`](Self::exists) memoizes every
/// multi-segment path it resolves. The memo holds a copy of the value, and
/// [`set`](Self::set) only drops the entry for the exact path written.
/// A path cached before one of its ancestors or descendants is rewritten
/// keeps returning the old value until [`clear_resolved`](Self::clear_resolved)
/// or a reset.
///
/// ## Example
///
/// ```no_run
/// use dotpath_config::DotPathContainer;
///
/// let mut config = DotPathContainer::new("config", Some("production"));
///
/// if config.exists("database.connections.sqlite") {
///     let sqlite = config.get("database.connections.sqlite");
///     println!("{sqlite:?}");
/// }
///
/// config.set("app.debug", false);
/// let name = config.get_or("app.name", "demo");
/// # let _ = name;
/// ```
#[derive(Debug)]
pub struct DotPathContainer {
    base_path: PathBuf,
    environment: Option<String>,
    loader: Box<dyn SectionLoader>,
    sections: Map<String, Value>,
    resolved: HashMap<String, Value>,
}

impl DotPathContainer {
    /// Creates an empty container reading TOML files from `base_path`.
    pub fn new(base_path: impl AsRef<Path>, environment: Option<&str>) -> Self {
        let builder = Self::builder(base_path);
        match environment {
            Some(name) => builder.environment(name).build(),
            None => builder.build(),
        }
    }

    /// Creates a builder for a container rooted at `base_path`.
    pub fn builder(base_path: impl AsRef<Path>) -> ContainerBuilder {
        ContainerBuilder::new(base_path)
    }

    pub(super) fn from_parts(
        base_path: PathBuf,
        environment: Option<String>,
        loader: Option<Box<dyn SectionLoader>>,
    ) -> Self {
        Self {
            base_path,
            environment: normalize_environment(environment),
            loader: loader.unwrap_or_else(|| Box::new(FileLoader::new())),
            sections: Map::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Returns `true` if `section` is present without triggering a load.
    pub fn is_loaded(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Points the container at a new base path and environment, dropping
    /// every loaded section and cached path. The loader is kept.
    pub fn reinit(&mut self, base_path: impl AsRef<Path>, environment: Option<&str>) {
        self.base_path = base_path.as_ref().to_path_buf();
        self.environment = normalize_environment(environment.map(str::to_string));
        self.sections.clear();
        self.resolved.clear();
    }

    /// Returns `true` if `path` resolves to a value, which may be `null`.
    ///
    /// Loads the path's section if it is not present yet, and caches the
    /// resolved value of multi-segment paths. Cache keys are the path with
    /// empty segments removed.
    pub fn exists(&mut self, path: &str) -> bool {
        if self.sections.contains_key(path) {
            return true;
        }

        let segments = segments(path);
        let key = segments.join(".");
        if self.resolved.contains_key(&key) {
            tracing::trace!(path, "resolved-path cache hit");
            return true;
        }

        let Some((section, rest)) = segments.split_first() else {
            return false;
        };

        if !self.sections.contains_key(*section) && !self.try_load(section) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        let Some(value) = self.sections.get(*section).and_then(|root| lookup(root, rest)) else {
            return false;
        };
        let value = value.clone();
        tracing::trace!(path, "caching resolved path");
        self.resolved.insert(key, value);
        true
    }

    /// Returns the value at `path`, or `None` if it does not resolve.
    pub fn get(&mut self, path: &str) -> Option<&Value> {
        if !self.exists(path) {
            return None;
        }
        self.peek(path)
    }

    /// Returns the value at `path`, or `default` when the value is absent
    /// or falsy (`null`, `false`, zero, `""`, `"0"`, `[]`, `{}`).
    ///
    /// Use [`get_present_or`](Self::get_present_or) to keep falsy values.
    pub fn get_or(&mut self, path: &str, default: impl Into<Value>) -> Value {
        match self.get(path) {
            Some(value) if !is_falsy(value) => value.clone(),
            _ => default.into(),
        }
    }

    /// Returns the value at `path`, or `default` only when it is absent.
    pub fn get_present_or(&mut self, path: &str, default: impl Into<Value>) -> Value {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    /// Deserializes the value at `path` into `T`.
    ///
    /// Returns `Ok(None)` if the path does not resolve.
    pub fn get_as<T: DeserializeOwned>(&mut self, path: &str) -> Result<Option<T>, ConfigError> {
        self.get(path)
            .map(|value| {
                T::deserialize(value).map_err(|e| ConfigError::DeserializeError {
                    path: path.to_string(),
                    source: e,
                })
            })
            .transpose()
    }

    /// Writes `value` at `path`, creating intermediate mappings.
    ///
    /// Intermediates holding a non-mapping value are silently replaced.
    /// A section that has not been loaded yet is loaded first, so the write
    /// lands on top of its file contents. If that load fails the write is
    /// dropped, leaving the section unloaded so a later access retries it.
    /// An empty path is ignored.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments = segments(path);
        let Some(section) = segments.first() else {
            return;
        };

        if segments.len() > 1 && !self.sections.contains_key(*section) {
            if let Err(e) = self.load_section(section) {
                tracing::warn!(section, path, error = %e, "failed to load section, write dropped");
                return;
            }
        }

        self.resolved.remove(&segments.join("."));
        write_at_path(&mut self.sections, &segments, value.into());
    }

    /// Applies each `(path, value)` pair with [`set`](Self::set).
    pub fn set_many<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (path, value) in entries {
            self.set(path.as_ref(), value);
        }
    }

    /// Replaces every section with `sections` and empties the cache.
    pub fn replace_all(&mut self, sections: Map<String, Value>) {
        self.sections = sections;
        self.resolved.clear();
    }

    /// Sets the value at `path` to `null`. The key stays present.
    pub fn unset(&mut self, path: &str) {
        self.set(path, Value::Null);
    }

    /// Indexed-access name for [`get`](Self::get).
    pub fn read(&mut self, path: &str) -> Option<&Value> {
        self.get(path)
    }

    /// Indexed-access name for [`set`](Self::set).
    pub fn write(&mut self, path: &str, value: impl Into<Value>) {
        self.set(path, value);
    }

    /// Indexed-access name for [`unset`](Self::unset).
    pub fn delete(&mut self, path: &str) {
        self.unset(path);
    }

    /// Empties the resolved-path cache. Loaded sections are kept.
    pub fn clear_resolved(&mut self) {
        self.resolved.clear();
    }

    /// Loads `section` if it is not present, surfacing base-file errors.
    ///
    /// Returns `Ok(false)` when the base file does not exist. An environment
    /// override that fails to load is skipped and the base value kept.
    pub fn load_section(&mut self, section: &str) -> Result<bool, ConfigError> {
        if self.sections.contains_key(section) {
            return Ok(true);
        }

        let Some(mut value) = self.loader.load(&self.base_path, section)? else {
            tracing::debug!(section, base_path = %self.base_path.display(), "section not found");
            return Ok(false);
        };

        if let Some(environment) = self.environment.as_deref() {
            let dir = self.base_path.join(environment);
            match self.loader.load(&dir, section) {
                Ok(Some(overlay)) => {
                    tracing::debug!(section, environment, "merging environment overlay");
                    deep_merge(&mut value, overlay);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(section, environment, error = %e, "skipping environment overlay");
                }
            }
        }

        tracing::debug!(section, "loaded section");
        self.sections.insert(section.to_string(), value);
        Ok(true)
    }

    fn try_load(&mut self, section: &str) -> bool {
        match self.load_section(section) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(section, error = %e, "failed to load section");
                false
            }
        }
    }

    fn peek(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.sections.get(path) {
            return Some(value);
        }

        let segments = segments(path);
        if let Some(value) = self.resolved.get(&segments.join(".")) {
            return Some(value);
        }
        let (section, rest) = segments.split_first()?;
        lookup(self.sections.get(*section)?, rest)
    }
}

fn normalize_environment(environment: Option<String>) -> Option<String> {
    environment.filter(|name| !name.is_empty())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(table) => table.is_empty(),
    }
}
