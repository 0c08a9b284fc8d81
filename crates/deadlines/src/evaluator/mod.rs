//! Threshold and expiration evaluators.
//!
//! Both predicates are evaluated against an explicit `now` so the driver
//! supplies wall-clock time and tests supply fixed instants. A deadline that
//! does not match its layout is logged and evaluated against the unset
//! instant (0001-01-01T00:00:00Z) rather than aborting evaluation.

mod offset;

#[cfg(test)]
mod tests;

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::formats::{parse_deadline, unset_instant};
use crate::schema::{DeadlineRecord, ThresholdUnit};

pub use self::offset::project;

/// Outcome of evaluating one deadline at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineState {
    /// `now + threshold` is strictly after the deadline.
    pub threshold_tripped: bool,
    /// `now` is strictly after the deadline.
    pub expired: bool,
    /// Set when the deadline failed to parse and the unset instant was used.
    pub parse_error: Option<String>,
}

/// The four combinations of the two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Past the deadline and inside the window.
    Overdue,
    /// Inside the window, not yet due.
    Warning,
    /// Past the deadline but outside a zero or negative window.
    ExpiredOutsideWindow,
    /// Neither.
    Clear,
}

impl DeadlineState {
    pub fn condition(&self) -> Condition {
        match (self.threshold_tripped, self.expired) {
            (true, true) => Condition::Overdue,
            (true, false) => Condition::Warning,
            (false, true) => Condition::ExpiredOutsideWindow,
            (false, false) => Condition::Clear,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.parse_error.is_some()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Overdue => write!(f, "overdue"),
            Condition::Warning => write!(f, "warning"),
            Condition::ExpiredOutsideWindow => write!(f, "expired-outside-window"),
            Condition::Clear => write!(f, "clear"),
        }
    }
}

/// Whether `now + threshold` has passed the deadline.
pub fn is_within_threshold(
    deadline_time: &str,
    deadline_format: &str,
    threshold: i64,
    unit: ThresholdUnit,
    now: DateTime<Utc>,
) -> bool {
    let (deadline, _) = deadline_or_unset(deadline_time, deadline_format);
    project(now, threshold, unit) > deadline
}

/// Whether `now` has passed the deadline. Equal instants are not expired.
pub fn is_expired(deadline_time: &str, deadline_format: &str, now: DateTime<Utc>) -> bool {
    let (deadline, _) = deadline_or_unset(deadline_time, deadline_format);
    now > deadline
}

/// Evaluate both predicates for a record, parsing its deadline once.
pub fn evaluate(record: &DeadlineRecord, now: DateTime<Utc>) -> DeadlineState {
    let (deadline, parse_error) = deadline_or_unset(&record.deadline_time, &record.deadline_time_format);
    DeadlineState {
        threshold_tripped: project(now, record.threshold, record.unit) > deadline,
        expired: now > deadline,
        parse_error,
    }
}

fn deadline_or_unset(deadline_time: &str, deadline_format: &str) -> (DateTime<Utc>, Option<String>) {
    match parse_deadline(deadline_time, deadline_format) {
        Ok(deadline) => (deadline, None),
        Err(e) => {
            warn!(
                deadline = %deadline_time,
                format = %deadline_format,
                error = %e,
                "failed to parse deadline timestamp, evaluating against unset instant"
            );
            (unset_instant(), Some(e.to_string()))
        }
    }
}
