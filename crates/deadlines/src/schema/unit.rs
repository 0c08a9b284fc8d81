//! Threshold unit enum with canonicalising alias parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a deadline's threshold window.
///
/// Years, months and days are calendar units; hours, minutes and seconds
/// are fixed durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// Unit applied when a deadline does not name one.
pub const DEFAULT_THRESHOLD_TYPE: &str = "days";

/// An unrecognised threshold unit string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown threshold type '{0}' (expected years, months, days, hours, minutes or seconds)")]
pub struct UnitError(pub String);

impl ThresholdUnit {
    /// Whether offsets in this unit use calendar arithmetic.
    pub fn is_calendar(self) -> bool {
        matches!(self, ThresholdUnit::Years | ThresholdUnit::Months | ThresholdUnit::Days)
    }

    /// Canonical plural name.
    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdUnit::Years => "years",
            ThresholdUnit::Months => "months",
            ThresholdUnit::Days => "days",
            ThresholdUnit::Hours => "hours",
            ThresholdUnit::Minutes => "minutes",
            ThresholdUnit::Seconds => "seconds",
        }
    }
}

impl fmt::Display for ThresholdUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "year" | "years" => Ok(ThresholdUnit::Years),
            "mo" | "month" | "months" => Ok(ThresholdUnit::Months),
            "d" | "day" | "days" => Ok(ThresholdUnit::Days),
            "h" | "hour" | "hours" => Ok(ThresholdUnit::Hours),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(ThresholdUnit::Minutes),
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(ThresholdUnit::Seconds),
            _ => Err(UnitError(s.to_string())),
        }
    }
}
