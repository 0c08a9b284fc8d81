//! Core [`DeadlineLoader`]: file-backed deadline decoding with optional watching.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::schema::{DeadlineRecord, DeadlineSet, DeadlinesFile};

use super::error::{LoadError, Result};
use super::watcher::handle_fs_event;

/// Serialization of a deadlines file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Yaml => write!(f, "yaml"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = LoadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            "json" => Ok(SourceFormat::Json),
            _ => Err(LoadError::UnknownFormat(s.to_string())),
        }
    }
}

/// Location and serialization of the deadlines file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineSource {
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl DeadlineSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Read and decode the file.
    pub fn load(&self) -> Result<DeadlineSet> {
        let contents = fs::read_to_string(&self.path)?;
        decode(&contents, self.format)
    }
}

/// Decode deadlines from file contents and apply field defaults.
///
/// Every record is validated; an unknown threshold type fails the whole
/// decode so a bad edit never half-applies. Duplicate names are logged but
/// kept.
pub fn decode(contents: &str, format: SourceFormat) -> Result<DeadlineSet> {
    let file: DeadlinesFile = match format {
        SourceFormat::Yaml => serde_yaml::from_str(contents)?,
        SourceFormat::Json => serde_json::from_str(contents)?,
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(file.deadlines.len());
    for entry in file.deadlines {
        let name = entry.name.clone();
        let record = DeadlineRecord::try_from(entry)
            .map_err(|e| LoadError::Validation(format!("deadline '{}': {}", name, e)))?;
        if !seen.insert(record.name.clone()) {
            warn!(name = %record.name, "duplicate deadline name, both entries will be exported");
        }
        records.push(record);
    }

    Ok(DeadlineSet::new(records))
}

/// File-backed deadline loader with optional change watching.
pub struct DeadlineLoader {
    source: DeadlineSource,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl DeadlineLoader {
    pub fn new(source: DeadlineSource) -> Self {
        Self {
            source,
            _watcher: None,
        }
    }

    pub fn source(&self) -> &DeadlineSource {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    /// Read and decode the deadlines file.
    pub fn load(&self) -> Result<DeadlineSet> {
        let set = self.source.load()?;
        info!(
            path = %self.source.path.display(),
            format = %self.source.format,
            deadlines = set.len(),
            "loaded deadlines"
        );
        for record in &set {
            debug!(
                name = %record.name,
                deadline = %record.deadline_time,
                format = %record.deadline_time_format,
                threshold = record.threshold,
                unit = %record.unit,
                "deadline"
            );
        }
        Ok(set)
    }

    /// Watch the deadlines file and signal `changed` when it is written.
    ///
    /// The parent directory is watched so that editors which replace the file
    /// via rename are still noticed. Callers are expected to debounce.
    pub fn watch(&mut self, changed: Arc<Notify>) -> Result<()> {
        let target = self.source.path.clone();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let watch_target = target.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if handle_fs_event(&event, &watch_target) {
                        changed.notify_one();
                    }
                }
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!(path = %target.display(), "watching deadlines file for changes");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Whether a filesystem watcher is active.
    pub fn is_watching(&self) -> bool {
        self._watcher.is_some()
    }
}
