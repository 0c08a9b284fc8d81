//! Threshold offset projection: calendar units vs fixed durations.

use chrono::{DateTime, Days, Months, TimeDelta, Utc};

use crate::schema::ThresholdUnit;

/// Project `now` forward (or backward, for negative thresholds) by the threshold.
///
/// Years, months and days use calendar arithmetic: month ends clamp
/// (January 31 + 1 month is the last day of February) and leap years are
/// respected. Hours, minutes and seconds add exact multiples of the unit.
/// Results outside chrono's range saturate at the corresponding bound.
pub fn project(now: DateTime<Utc>, threshold: i64, unit: ThresholdUnit) -> DateTime<Utc> {
    let projected = match unit {
        ThresholdUnit::Years => threshold.checked_mul(12).and_then(|months| shift_months(now, months)),
        ThresholdUnit::Months => shift_months(now, threshold),
        ThresholdUnit::Days => shift_days(now, threshold),
        ThresholdUnit::Hours => TimeDelta::try_hours(threshold).and_then(|d| now.checked_add_signed(d)),
        ThresholdUnit::Minutes => TimeDelta::try_minutes(threshold).and_then(|d| now.checked_add_signed(d)),
        ThresholdUnit::Seconds => TimeDelta::try_seconds(threshold).and_then(|d| now.checked_add_signed(d)),
    };
    projected.unwrap_or_else(|| saturate(threshold))
}

fn shift_months(now: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        now.checked_add_months(magnitude)
    } else {
        now.checked_sub_months(magnitude)
    }
}

fn shift_days(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        now.checked_add_days(magnitude)
    } else {
        now.checked_sub_days(magnitude)
    }
}

fn saturate(direction: i64) -> DateTime<Utc> {
    if direction >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    }
}
