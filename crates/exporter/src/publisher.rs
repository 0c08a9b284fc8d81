//! Prometheus gauge publishing for deadline state.
//!
//! # Metric families
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `countdown_timers` | Gauge | `countdown`, `description`, `expired`, `deadline`, `deadline_time_format`, `threshold`, `threshold_type`, `threshold_tripped` |
//! | `countdown_timer_parse_errors` | Gauge | `countdown`, `deadline`, `deadline_time_format` |
//!
//! Every published series has value `1`; the state lives in the labels.

use chrono::{DateTime, Utc};
use prometheus::core::Collector;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

use countdown_deadlines::{evaluate, DeadlineRecord};

pub const COUNTDOWN_METRIC: &str = "countdown_timers";
const COUNTDOWN_HELP: &str = "Countdowns have exceeded threshold";
pub const COUNTDOWN_LABELS: [&str; 8] = [
    "countdown",
    "description",
    "expired",
    "deadline",
    "deadline_time_format",
    "threshold",
    "threshold_type",
    "threshold_tripped",
];

pub const PARSE_ERROR_METRIC: &str = "countdown_timer_parse_errors";
const PARSE_ERROR_HELP: &str = "Countdowns whose deadline could not be parsed with its format";
const PARSE_ERROR_LABELS: [&str; 3] = ["countdown", "deadline", "deadline_time_format"];

/// Errors from metric registration and exposition.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to register or unregister a metric family.
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),

    /// Failed to encode metrics output.
    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Counts from one publish pass, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: usize,
    pub tripped: usize,
    pub expired: usize,
    pub degraded: usize,
}

/// Owns the metric families that expose deadline state.
///
/// Constructed once at startup and shared by the periodic evaluator and the
/// reload path; callers serialise `clear`/`republish` against scrapes.
pub struct MetricsPublisher {
    registry: Registry,
    countdowns: GaugeVec,
    parse_errors: GaugeVec,
}

impl MetricsPublisher {
    /// Create a publisher with its own registry.
    pub fn new() -> MetricsResult<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create a publisher registering into an existing registry.
    pub fn with_registry(registry: Registry) -> MetricsResult<Self> {
        let countdowns = countdown_family()?;
        let parse_errors = parse_error_family()?;
        registry.register(Box::new(countdowns.clone()))?;
        registry.register(Box::new(parse_errors.clone()))?;
        Ok(Self {
            registry,
            countdowns,
            parse_errors,
        })
    }

    /// Evaluate every record at `now` and set its gauge to 1.
    ///
    /// Records are evaluated independently. Series for records absent from
    /// `records` are left in place; only [`clear`](Self::clear) removes them.
    pub fn publish<'a, I>(&self, records: I, now: DateTime<Utc>) -> PublishSummary
    where
        I: IntoIterator<Item = &'a DeadlineRecord>,
    {
        let mut summary = PublishSummary::default();

        for record in records {
            let state = evaluate(record, now);
            let threshold = record.threshold.to_string();
            let expired = state.expired.to_string();
            let tripped = state.threshold_tripped.to_string();

            self.countdowns
                .with_label_values(&[
                    record.name.as_str(),
                    record.description.as_str(),
                    expired.as_str(),
                    record.deadline_time.as_str(),
                    record.deadline_time_format.as_str(),
                    threshold.as_str(),
                    record.threshold_type.as_str(),
                    tripped.as_str(),
                ])
                .set(1.0);

            if state.is_degraded() {
                self.parse_errors
                    .with_label_values(&[
                        record.name.as_str(),
                        record.deadline_time.as_str(),
                        record.deadline_time_format.as_str(),
                    ])
                    .set(1.0);
                summary.degraded += 1;
            }

            debug!(
                name = %record.name,
                condition = %state.condition(),
                expired = state.expired,
                threshold_tripped = state.threshold_tripped,
                "published deadline state"
            );

            summary.published += 1;
            summary.tripped += usize::from(state.threshold_tripped);
            summary.expired += usize::from(state.expired);
        }

        summary
    }

    /// Unregister both families and register fresh, empty ones under the same names.
    pub fn clear(&mut self) -> MetricsResult<()> {
        self.registry.unregister(Box::new(self.countdowns.clone()))?;
        self.registry.unregister(Box::new(self.parse_errors.clone()))?;

        let countdowns = countdown_family()?;
        let parse_errors = parse_error_family()?;
        self.registry.register(Box::new(countdowns.clone()))?;
        self.registry.register(Box::new(parse_errors.clone()))?;

        self.countdowns = countdowns;
        self.parse_errors = parse_errors;
        Ok(())
    }

    /// Clear, then publish `records`.
    pub fn republish<'a, I>(&mut self, records: I, now: DateTime<Utc>) -> MetricsResult<PublishSummary>
    where
        I: IntoIterator<Item = &'a DeadlineRecord>,
    {
        self.clear()?;
        Ok(self.publish(records, now))
    }

    /// Number of label sets currently exposed in `countdown_timers`.
    pub fn series_count(&self) -> usize {
        self.countdowns
            .collect()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// Encode all registered metrics in the Prometheus text format.
    pub fn encode_text(&self) -> MetricsResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    /// The registry the families are registered in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn countdown_family() -> MetricsResult<GaugeVec> {
    Ok(GaugeVec::new(Opts::new(COUNTDOWN_METRIC, COUNTDOWN_HELP), &COUNTDOWN_LABELS)?)
}

fn parse_error_family() -> MetricsResult<GaugeVec> {
    Ok(GaugeVec::new(Opts::new(PARSE_ERROR_METRIC, PARSE_ERROR_HELP), &PARSE_ERROR_LABELS)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use countdown_deadlines::ThresholdUnit;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn cert() -> DeadlineRecord {
        DeadlineRecord::new("cert", "2099-01-08")
            .with_description("TLS certificate")
            .with_threshold(7, ThresholdUnit::Days)
    }

    #[test]
    fn publish_exports_full_label_tuple() {
        let publisher = MetricsPublisher::new().unwrap();
        publisher.publish(&[cert()], at(2099, 1, 1, 12));

        let output = publisher.encode_text().unwrap();
        assert!(output.contains("# HELP countdown_timers Countdowns have exceeded threshold"));
        assert!(output.contains("# TYPE countdown_timers gauge"));
        assert!(output.contains(r#"countdown="cert""#));
        assert!(output.contains(r#"description="TLS certificate""#));
        assert!(output.contains(r#"expired="false""#));
        assert!(output.contains(r#"deadline="2099-01-08""#));
        assert!(output.contains(r#"deadline_time_format="DateOnly""#));
        assert!(output.contains(r#"threshold="7""#));
        assert!(output.contains(r#"threshold_type="days""#));
        assert!(output.contains(r#"threshold_tripped="true""#));
    }

    #[test]
    fn publish_summary_counts_states() {
        let publisher = MetricsPublisher::new().unwrap();
        let records = vec![
            cert(),
            DeadlineRecord::new("past", "2000-01-01"),
            DeadlineRecord::new("broken", "soon"),
        ];

        let summary = publisher.publish(&records, at(2099, 1, 1, 12));
        assert_eq!(summary.published, 3);
        assert_eq!(summary.tripped, 3);
        assert_eq!(summary.expired, 2);
        assert_eq!(summary.degraded, 1);
    }

    #[test]
    fn state_change_adds_a_new_series_until_cleared() {
        let mut publisher = MetricsPublisher::new().unwrap();
        let records = [cert()];

        publisher.publish(&records, at(2026, 10, 18, 12));
        publisher.publish(&records, at(2026, 10, 18, 13));
        assert_eq!(publisher.series_count(), 1);

        // Entering the window changes a label value and therefore the series.
        publisher.publish(&records, at(2099, 1, 1, 12));
        assert_eq!(publisher.series_count(), 2);

        publisher.republish(&records, at(2099, 1, 1, 12)).unwrap();
        assert_eq!(publisher.series_count(), 1);
    }

    #[test]
    fn clear_leaves_families_registered_and_empty() {
        let mut publisher = MetricsPublisher::new().unwrap();
        publisher.publish(&[cert()], at(2099, 1, 1, 12));
        publisher.clear().unwrap();

        assert_eq!(publisher.series_count(), 0);
        assert!(!publisher.encode_text().unwrap().contains("cert"));

        // Publishing after a clear goes to the fresh family.
        publisher.publish(&[cert()], at(2099, 1, 1, 12));
        assert_eq!(publisher.series_count(), 1);
    }

    #[test]
    fn parse_errors_are_exposed_separately() {
        let publisher = MetricsPublisher::new().unwrap();
        publisher.publish(&[DeadlineRecord::new("broken", "soon"), cert()], at(2026, 10, 18, 12));

        let output = publisher.encode_text().unwrap();
        assert!(output.contains(r#"countdown_timer_parse_errors{countdown="broken",deadline="soon",deadline_time_format="DateOnly"} 1"#));
        assert!(!output.contains(r#"countdown_timer_parse_errors{countdown="cert""#));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let publisher = MetricsPublisher::new().unwrap();
        let result = MetricsPublisher::with_registry(publisher.registry().clone());
        assert!(matches!(result, Err(MetricsError::Registration(_))));
    }
}
