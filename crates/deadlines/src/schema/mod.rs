//! Deadline schema types with serde deserialization.
//!
//! - `DeadlinesFile` / `DeadlineEntry`: the decoded file shape (kebab-case keys)
//! - `DeadlineRecord`: defaults applied, threshold unit canonicalised
//! - `DeadlineSet`: the unit of atomic replacement on reload

mod record;
mod unit;

pub use record::*;
pub use unit::*;
