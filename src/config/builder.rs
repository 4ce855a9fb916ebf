use std::path::{Path, PathBuf};

use super::container::DotPathContainer;
use super::source::SectionLoader;

/// Builder for a [`DotPathContainer`].
///
/// Sections are read with a TOML [`FileLoader`](super::FileLoader) unless
/// another loader is supplied.
///
/// ## Example
///
/// ```no_run
/// use dotpath_config::{DotPathContainer, FileLoader};
///
/// let mut config = DotPathContainer::builder("config")
///     .environment("production")
///     .loader(FileLoader::json())
///     .build();
///
/// let sqlite = config.get("database.connections.sqlite");
/// # let _ = sqlite;
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ContainerBuilder {
    base_path: PathBuf,
    environment: Option<String>,
    loader: Option<Box<dyn SectionLoader>>,
}

impl ContainerBuilder {
    pub(super) fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            environment: None,
            loader: None,
        }
    }

    /// Sets the environment whose directory overrides base section files.
    ///
    /// An empty name disables the overlay.
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Replaces the loader used to read section files.
    pub fn loader(mut self, loader: impl SectionLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Builds an empty container. Nothing is read until a path is accessed.
    pub fn build(self) -> DotPathContainer {
        DotPathContainer::from_parts(self.base_path, self.environment, self.loader)
    }
}
