//! Deadline entries as decoded from the deadlines file, and their validated form.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::formats::DEFAULT_FORMAT;

use super::unit::{ThresholdUnit, UnitError, DEFAULT_THRESHOLD_TYPE};

/// Threshold magnitude applied when a deadline sets none (or zero).
pub const DEFAULT_THRESHOLD: i64 = 7;

/// Top-level shape of a deadlines file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlinesFile {
    #[serde(default)]
    pub deadlines: Vec<DeadlineEntry>,
}

/// One deadline exactly as written in the deadlines file.
///
/// Every field is optional. A missing `deadline-time` decodes as empty and
/// the record is evaluated as degraded rather than failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeadlineEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline_time: String,
    #[serde(default)]
    pub deadline_time_format: String,
    #[serde(default)]
    pub threshold: i64,
    #[serde(default)]
    pub threshold_type: String,
}

/// A defaulted, validated deadline.
///
/// `deadline_time_format` and `threshold_type` keep the configured spelling
/// because they are exported verbatim as metric labels; `unit` is the
/// canonical parse of `threshold_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineRecord {
    pub name: String,
    pub description: String,
    pub deadline_time: String,
    pub deadline_time_format: String,
    pub threshold: i64,
    pub threshold_type: String,
    pub unit: ThresholdUnit,
}

impl DeadlineRecord {
    /// A record with the default format, threshold and unit.
    pub fn new(name: impl Into<String>, deadline_time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            deadline_time: deadline_time.into(),
            deadline_time_format: DEFAULT_FORMAT.to_string(),
            threshold: DEFAULT_THRESHOLD,
            threshold_type: DEFAULT_THRESHOLD_TYPE.to_string(),
            unit: ThresholdUnit::Days,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.deadline_time_format = format.into();
        self
    }

    /// Set the threshold window; the label spelling becomes the canonical unit name.
    pub fn with_threshold(mut self, threshold: i64, unit: ThresholdUnit) -> Self {
        self.threshold = threshold;
        self.threshold_type = unit.as_str().to_string();
        self.unit = unit;
        self
    }
}

impl TryFrom<DeadlineEntry> for DeadlineRecord {
    type Error = UnitError;

    /// Apply field defaults and canonicalise the threshold unit.
    fn try_from(entry: DeadlineEntry) -> Result<Self, Self::Error> {
        let deadline_time_format = if entry.deadline_time_format.is_empty() {
            DEFAULT_FORMAT.to_string()
        } else {
            entry.deadline_time_format
        };
        let threshold = if entry.threshold == 0 {
            DEFAULT_THRESHOLD
        } else {
            entry.threshold
        };
        let threshold_type = if entry.threshold_type.is_empty() {
            DEFAULT_THRESHOLD_TYPE.to_string()
        } else {
            entry.threshold_type
        };
        let unit = threshold_type.parse()?;

        Ok(Self {
            name: entry.name,
            description: entry.description,
            deadline_time: entry.deadline_time,
            deadline_time_format,
            threshold,
            threshold_type,
            unit,
        })
    }
}

/// The active, ordered set of deadlines.
///
/// Cloning is cheap; a set is replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadlineSet {
    records: Arc<Vec<DeadlineRecord>>,
}

impl DeadlineSet {
    pub fn new(records: Vec<DeadlineRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn records(&self) -> &[DeadlineRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeadlineRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DeadlineRecord> for DeadlineSet {
    fn from_iter<I: IntoIterator<Item = DeadlineRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DeadlineSet {
    type Item = &'a DeadlineRecord;
    type IntoIter = std::slice::Iter<'a, DeadlineRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
