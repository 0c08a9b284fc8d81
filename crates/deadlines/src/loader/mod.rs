//! Deadlines file loader.
//!
//! Reads the configured file, decodes it as YAML or JSON, applies field
//! defaults and produces a [`DeadlineSet`](crate::schema::DeadlineSet).
//! Optionally watches the file and signals a `tokio::sync::Notify` on change.

mod core;
mod error;
mod watcher;


pub use self::core::{decode, DeadlineLoader, DeadlineSource, SourceFormat};
pub use self::error::{LoadError, Result};
