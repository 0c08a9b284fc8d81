//! Deadline evaluation engine for the countdown exporter.
//!
//! This crate provides:
//! - A time-format registry that resolves symbolic layout names and parses
//!   deadline timestamps
//! - The validated, defaulted deadline record model
//! - Threshold and expiration evaluators (calendar-aware vs fixed-duration offsets)
//! - A YAML/JSON deadlines file loader with optional filesystem watching

pub mod evaluator;
pub mod formats;
pub mod loader;
pub mod schema;

pub use evaluator::{evaluate, is_expired, is_within_threshold, DeadlineState};
pub use loader::{DeadlineLoader, DeadlineSource, LoadError, SourceFormat};
pub use schema::{DeadlineEntry, DeadlineRecord, DeadlineSet, ThresholdUnit};
