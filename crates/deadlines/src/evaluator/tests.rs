//! Tests for the evaluator module.

use chrono::{DateTime, Datelike, TimeZone, Utc};

use super::*;
use crate::schema::{DeadlineRecord, ThresholdUnit};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn cert() -> DeadlineRecord {
    DeadlineRecord::new("cert", "2099-01-08").with_threshold(7, ThresholdUnit::Days)
}

// -- project: calendar units ----------------------------------------------

#[test]
fn month_addition_clamps_to_month_end() {
    let jan31 = at(2099, 1, 31, 9, 0, 0);
    assert_eq!(project(jan31, 1, ThresholdUnit::Months), at(2099, 2, 28, 9, 0, 0));

    let leap = at(2028, 1, 31, 9, 0, 0);
    assert_eq!(project(leap, 1, ThresholdUnit::Months), at(2028, 2, 29, 9, 0, 0));
}

#[test]
fn year_addition_respects_leap_day() {
    let leap_day = at(2028, 2, 29, 0, 0, 0);
    assert_eq!(project(leap_day, 1, ThresholdUnit::Years), at(2029, 2, 28, 0, 0, 0));
    assert_eq!(project(leap_day, 4, ThresholdUnit::Years), at(2032, 2, 29, 0, 0, 0));
}

#[test]
fn day_addition_crosses_month_and_year() {
    assert_eq!(project(at(2099, 12, 30, 6, 0, 0), 3, ThresholdUnit::Days), at(2100, 1, 2, 6, 0, 0));
    assert_eq!(project(at(2099, 3, 1, 6, 0, 0), -1, ThresholdUnit::Days), at(2099, 2, 28, 6, 0, 0));
}

#[test]
fn negative_months_move_backwards() {
    assert_eq!(project(at(2099, 3, 31, 0, 0, 0), -1, ThresholdUnit::Months), at(2099, 2, 28, 0, 0, 0));
}

// -- project: fixed durations ---------------------------------------------

#[test]
fn duration_units_are_exact_multiples() {
    let now = at(2099, 1, 31, 23, 0, 0);
    assert_eq!(project(now, 2, ThresholdUnit::Hours), at(2099, 2, 1, 1, 0, 0));
    assert_eq!(project(now, 90, ThresholdUnit::Minutes), at(2099, 2, 1, 0, 30, 0));
    assert_eq!(project(now, -30, ThresholdUnit::Seconds), at(2099, 1, 31, 22, 59, 30));
    assert_eq!(project(now, 24 * 31, ThresholdUnit::Hours), at(2099, 3, 3, 23, 0, 0));
}

#[test]
fn projection_saturates_instead_of_overflowing() {
    let now = at(2099, 1, 1, 0, 0, 0);
    assert_eq!(project(now, i64::MAX, ThresholdUnit::Years), DateTime::<Utc>::MAX_UTC);
    assert_eq!(project(now, i64::MIN, ThresholdUnit::Seconds), DateTime::<Utc>::MIN_UTC);
}

// -- is_expired -----------------------------------------------------------

#[test]
fn expired_only_strictly_after_deadline() {
    let deadline = at(2099, 1, 8, 0, 0, 0);
    assert!(!is_expired("2099-01-08", "DateOnly", deadline));
    assert!(is_expired("2099-01-08", "DateOnly", deadline + chrono::TimeDelta::seconds(1)));
    assert!(!is_expired("2099-01-08", "DateOnly", deadline - chrono::TimeDelta::seconds(1)));
}

// -- is_within_threshold --------------------------------------------------

#[test]
fn threshold_trips_once_inside_window() {
    // 7 days before the deadline exactly: projection equals the deadline.
    assert!(!is_within_threshold("2099-01-08", "DateOnly", 7, ThresholdUnit::Days, at(2099, 1, 1, 0, 0, 0)));
    assert!(is_within_threshold("2099-01-08", "DateOnly", 7, ThresholdUnit::Days, at(2099, 1, 1, 0, 0, 1)));
    assert!(!is_within_threshold("2099-01-08", "DateOnly", 7, ThresholdUnit::Days, at(2098, 12, 31, 23, 59, 59)));
}

#[test]
fn threshold_in_hours_uses_fixed_offset() {
    let deadline = "2099-01-08 12:00:00";
    assert!(is_within_threshold(deadline, "DateTime", 6, ThresholdUnit::Hours, at(2099, 1, 8, 6, 0, 1)));
    assert!(!is_within_threshold(deadline, "DateTime", 6, ThresholdUnit::Hours, at(2099, 1, 8, 5, 59, 59)));
}

#[test]
fn unknown_format_name_is_used_as_literal_layout() {
    assert!(is_expired("08.01.2099", "%d.%m.%Y", at(2099, 1, 8, 0, 0, 1)));
    assert!(is_expired("08.01.2099", "02.01.2006", at(2099, 1, 8, 0, 0, 1)));
    assert!(!is_expired("08.01.2099", "02.01.2006", at(2099, 1, 7, 0, 0, 0)));
}

// -- evaluate: scenarios --------------------------------------------------

#[test]
fn scenario_far_before_deadline() {
    let state = evaluate(&cert(), at(2026, 10, 17, 12, 0, 0));
    assert!(!state.threshold_tripped);
    assert!(!state.expired);
    assert_eq!(state.condition(), Condition::Clear);
}

#[test]
fn scenario_inside_window() {
    let state = evaluate(&cert(), at(2099, 1, 1, 12, 0, 0));
    assert!(state.threshold_tripped);
    assert!(!state.expired);
    assert_eq!(state.condition(), Condition::Warning);
}

#[test]
fn scenario_past_deadline() {
    let state = evaluate(&cert(), at(2099, 1, 9, 12, 0, 0));
    assert!(state.threshold_tripped);
    assert!(state.expired);
    assert_eq!(state.condition(), Condition::Overdue);
}

#[test]
fn scenario_negative_threshold_expired_outside_window() {
    let today = at(2099, 1, 9, 0, 0, 0);
    let yesterday = today - chrono::Days::new(1);
    let record = DeadlineRecord::new("yesterday", yesterday.format("%Y-%m-%d").to_string())
        .with_threshold(-1, ThresholdUnit::Days);

    let state = evaluate(&record, today);
    assert!(state.expired);
    assert!(!state.threshold_tripped);
    assert_eq!(state.condition(), Condition::ExpiredOutsideWindow);
}

#[test]
fn evaluate_matches_individual_predicates() {
    let record = DeadlineRecord::new("renewal", "2099-06-30 17:00:00")
        .with_format("DateTime")
        .with_threshold(2, ThresholdUnit::Months);
    for now in [at(2099, 4, 1, 0, 0, 0), at(2099, 5, 1, 0, 0, 0), at(2099, 7, 1, 0, 0, 0)] {
        let state = evaluate(&record, now);
        assert_eq!(
            state.threshold_tripped,
            is_within_threshold(&record.deadline_time, &record.deadline_time_format, 2, ThresholdUnit::Months, now)
        );
        assert_eq!(state.expired, is_expired(&record.deadline_time, &record.deadline_time_format, now));
    }
}

// -- degraded parse -------------------------------------------------------

#[test]
fn unparseable_deadline_degrades_to_unset_instant() {
    let record = DeadlineRecord::new("broken", "next tuesday");
    let now = at(2026, 10, 17, 0, 0, 0);

    let state = evaluate(&record, now);
    assert!(state.is_degraded());
    assert!(state.expired);
    assert!(state.threshold_tripped);
    assert!(state.parse_error.as_deref().unwrap_or_default().contains("next tuesday"));
}

#[test]
fn unparseable_deadline_with_large_negative_threshold() {
    // Projection lands before year 1, so the degraded deadline is not tripped.
    let now = at(2026, 10, 17, 0, 0, 0);
    assert!(!is_within_threshold("garbage", "DateOnly", -3000, ThresholdUnit::Years, now));
    assert!(project(now, -3000, ThresholdUnit::Years).year() < 1);
}
