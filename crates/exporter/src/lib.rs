//! Countdown exporter: publishes deadline state as Prometheus gauges.
//!
//! The binary wires these modules together; they are exposed as a library so
//! the reload path and HTTP surface can be exercised from integration tests.

pub mod config;
pub mod coordinator;
pub mod publisher;
pub mod server;
pub mod tasks;

pub use config::{Cli, ConfigError, ExporterConfig};
pub use coordinator::{ReloadCoordinator, ReloadError};
pub use publisher::{MetricsError, MetricsPublisher, PublishSummary};
