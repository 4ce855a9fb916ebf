//! Lazy-loading configuration accessed by dotted paths.
//!
//! A path such as `database.connections.sqlite` names a section
//! (`database`), loaded from its file on first use, and the keys to walk
//! inside it. An optional environment directory overrides base files.

pub mod config;
pub mod context;
mod error;

pub use config::{
    ConfigError, ContainerBuilder, DotPathContainer, FileLoader, Format, SectionLoader,
};
pub use context::Registry;
pub use error::Error;
pub use serde_json::Value;
