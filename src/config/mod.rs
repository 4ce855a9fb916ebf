//! Lazy-loading configuration sections with dot-path access.

mod builder;
mod container;
mod error;
mod file;
mod source;

pub use builder::ContainerBuilder;
pub use container::DotPathContainer;
pub use error::ConfigError;
pub use file::{FileLoader, Format};
pub use source::SectionLoader;
