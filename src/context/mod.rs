//! Application-wide access to a single configuration container.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{DotPathContainer, Error};

/// Holder for the application's one [`DotPathContainer`].
///
/// The registry is an ordinary value owned by the composition root and
/// passed to whatever needs configuration. It starts uninitialized; every
/// accessor fails with [`Error::NotInitialized`] until [`init`](Self::init)
/// or [`install`](Self::install) is called.
///
/// Wrap it in a `Mutex` to share it between threads.
///
/// ## Example
///
/// ```no_run
/// use dotpath_config::Registry;
///
/// let mut registry = Registry::new();
/// registry.init("config", Some("production"));
///
/// registry.set("app.debug", true)?;
/// let driver = registry.get_or("database.default", "sqlite")?;
/// # let _ = driver;
/// # Ok::<(), dotpath_config::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    container: Option<DotPathContainer>,
}

impl Registry {
    /// Creates an uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the registry, or resets it if already initialized.
    ///
    /// The first call creates the container. Later calls keep the same
    /// container, point it at the new base path and environment, and drop
    /// everything loaded or set so far.
    pub fn init(
        &mut self,
        base_path: impl AsRef<Path>,
        environment: Option<&str>,
    ) -> &mut DotPathContainer {
        let container = match self.container.take() {
            Some(mut container) => {
                tracing::debug!(base_path = %base_path.as_ref().display(), "resetting registry");
                container.reinit(base_path, environment);
                container
            }
            None => DotPathContainer::new(base_path, environment),
        };
        self.container.insert(container)
    }

    /// Installs a pre-built container, replacing any existing one.
    pub fn install(&mut self, container: DotPathContainer) -> &mut DotPathContainer {
        self.container.insert(container)
    }

    pub fn is_initialized(&self) -> bool {
        self.container.is_some()
    }

    /// Returns the container.
    pub fn container(&mut self) -> Result<&mut DotPathContainer, Error> {
        self.container.as_mut().ok_or(Error::NotInitialized)
    }

    /// See [`DotPathContainer::get`].
    pub fn get(&mut self, path: &str) -> Result<Option<&Value>, Error> {
        Ok(self.container()?.get(path))
    }

    /// See [`DotPathContainer::get_or`].
    pub fn get_or(&mut self, path: &str, default: impl Into<Value>) -> Result<Value, Error> {
        Ok(self.container()?.get_or(path, default))
    }

    /// See [`DotPathContainer::get_as`].
    pub fn get_as<T: DeserializeOwned>(&mut self, path: &str) -> Result<Option<T>, Error> {
        Ok(self.container()?.get_as(path)?)
    }

    /// See [`DotPathContainer::set`].
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.container()?.set(path, value);
        Ok(())
    }

    /// See [`DotPathContainer::set_many`].
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.container()?.set_many(entries);
        Ok(())
    }
}
