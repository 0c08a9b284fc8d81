//! Time-format registry and deadline timestamp parsing.
//!
//! Deadlines name their layout either symbolically (`DateOnly`, `RFC3339`, ...)
//! or literally. A literal layout containing `%` is a chrono strftime pattern;
//! anything else is read in reference-date notation (`2006-01-02 15:04`) and
//! translated to strftime before parsing.

use std::borrow::Cow;

use chrono::format::{self, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Symbolic format applied when a deadline does not name one.
pub const DEFAULT_FORMAT: &str = "DateOnly";

/// Registered symbolic layout names and their strftime patterns.
const REGISTRY: &[(&str, &str)] = &[
    ("ANSIC", "%a %b %e %H:%M:%S %Y"),
    ("UnixDate", "%a %b %e %H:%M:%S %Z %Y"),
    ("RubyDate", "%a %b %d %H:%M:%S %z %Y"),
    ("RFC822", "%d %b %y %H:%M %Z"),
    ("RFC822Z", "%d %b %y %H:%M %z"),
    ("RFC850", "%A, %d-%b-%y %H:%M:%S %Z"),
    ("RFC1123", "%a, %d %b %Y %H:%M:%S %Z"),
    ("RFC1123Z", "%a, %d %b %Y %H:%M:%S %z"),
    ("RFC3339", "%+"),
    ("RFC3339Nano", "%+"),
    ("Stamp", "%b %e %H:%M:%S"),
    ("DateTime", "%Y-%m-%d %H:%M:%S"),
    ("DateOnly", "%Y-%m-%d"),
    ("TimeOnly", "%H:%M:%S"),
];

/// Reference-date tokens. Longer tokens sharing a prefix come first.
const REFERENCE_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("_2006", "_%Y"),
    ("2006", "%Y"),
    ("002", "%j"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("_2", "%e"),
    ("Z07:00", "%#z"),
    ("Z0700", "%#z"),
    ("Z07", "%#z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("-07", "%#z"),
    ("PM", "%p"),
    ("pm", "%p"),
    ("1", "%m"),
    ("2", "%d"),
    ("3", "%I"),
    ("4", "%M"),
    ("5", "%S"),
    ("%", "%%"),
];

/// Name tokens that only match when not followed by a lowercase letter
/// (`Month` is literal text, not `Mon` + `th`).
const WORD_TOKENS: &[&str] = &["Jan", "Mon"];

/// A deadline timestamp that does not match its resolved layout.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("cannot parse '{value}' with layout '{layout}': {source}")]
    Parse {
        value: String,
        layout: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("'{value}' is outside the representable time range")]
    OutOfRange { value: String },
}

/// Look up a registered symbolic name.
pub fn lookup(name: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, pattern)| *pattern)
}

/// All registered symbolic names, in registry order.
pub fn registered_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Resolve a symbolic format name to its layout pattern.
///
/// Unknown names are returned unchanged and treated as literal layouts.
pub fn resolve_layout(name_or_pattern: &str) -> &str {
    lookup(name_or_pattern).unwrap_or(name_or_pattern)
}

/// Convert a resolved layout to a strftime pattern.
pub fn to_strftime(layout: &str) -> Cow<'_, str> {
    if layout.contains('%') {
        Cow::Borrowed(layout)
    } else {
        Cow::Owned(translate_reference_layout(layout))
    }
}

/// Translate a reference-date layout (`Mon Jan _2 15:04:05 2006`) into strftime.
///
/// Characters that are not reference tokens are copied through literally.
pub fn translate_reference_layout(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;

    'scan: while let Some(c) = rest.chars().next() {
        if let Some(len) = fractional_len(rest) {
            out.push_str("%.f");
            rest = &rest[len..];
            continue;
        }

        for (token, pattern) in REFERENCE_TOKENS {
            let Some(tail) = rest.strip_prefix(token) else {
                continue;
            };
            if WORD_TOKENS.contains(token) && tail.starts_with(|t: char| t.is_ascii_lowercase()) {
                continue;
            }
            out.push_str(pattern);
            rest = tail;
            continue 'scan;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Byte length of a fractional-seconds token such as `.000` or `.999999`.
fn fractional_len(s: &str) -> Option<usize> {
    let digits = s.strip_prefix('.')?;
    let first = digits.chars().next().filter(|c| *c == '0' || *c == '9')?;
    let run = digits.chars().take_while(|c| *c == first).count();
    if digits[run..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(1 + run)
}

/// The degraded instant used when a deadline cannot be parsed: 0001-01-01T00:00:00Z.
pub fn unset_instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse a deadline timestamp using a symbolic format name or literal layout.
///
/// Components the layout does not carry are defaulted: no zone means UTC,
/// no year means year 0, no date means 0000-01-01, no time means midnight.
/// Zone abbreviations are accepted and read as UTC.
pub fn parse_deadline(deadline_time: &str, format_name: &str) -> Result<DateTime<Utc>, FormatError> {
    let layout = to_strftime(resolve_layout(format_name));
    let value = deadline_time.trim();
    let fail = |source: chrono::ParseError| FormatError::Parse {
        value: deadline_time.to_string(),
        layout: format_name.to_string(),
        source,
    };

    let mut parsed = Parsed::new();
    format::parse(&mut parsed, value, StrftimeItems::new(&layout)).map_err(fail)?;
    pin_two_digit_century(&mut parsed).map_err(fail)?;
    let parsed = without_weekday(parsed).map_err(fail)?;

    if let Ok(dt) = parsed.to_datetime() {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = match parsed.to_naive_date() {
        Ok(date) => date,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => yearless_date(&parsed, e).map_err(fail)?,
        Err(e) => return Err(fail(e)),
    };
    let time = match parsed.to_naive_time() {
        Ok(time) => time,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveTime::default(),
        Err(e) => return Err(fail(e)),
    };
    let offset = parsed
        .to_fixed_offset()
        .ok()
        .or_else(|| FixedOffset::east_opt(0))
        .ok_or_else(|| FormatError::OutOfRange {
            value: deadline_time.to_string(),
        })?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| FormatError::OutOfRange {
            value: deadline_time.to_string(),
        })
}

/// Two-digit years 69 through 99 are 19xx, 00 through 68 are 20xx.
fn pin_two_digit_century(parsed: &mut Parsed) -> Result<(), chrono::ParseError> {
    let two_digit_only = parsed.year().is_none() && parsed.year_div_100().is_none();
    match parsed.year_mod_100() {
        Some(yy) if two_digit_only && yy >= 69 => parsed.set_year_div_100(19),
        _ => Ok(()),
    }
}

/// Drop a parsed weekday when month and day (or day of year) fix the date.
///
/// The weekday is only checked for syntax; a name that disagrees with the
/// date does not make the timestamp invalid.
fn without_weekday(parsed: Parsed) -> Result<Parsed, chrono::ParseError> {
    let date_fixed = (parsed.month().is_some() && parsed.day().is_some()) || parsed.ordinal().is_some();
    if parsed.weekday().is_none() || !date_fixed {
        return Ok(parsed);
    }

    let mut out = Parsed::new();
    if let Some(year) = parsed.year() {
        out.set_year(i64::from(year))?;
    }
    if let Some(century) = parsed.year_div_100() {
        out.set_year_div_100(i64::from(century))?;
    }
    if let Some(yy) = parsed.year_mod_100() {
        out.set_year_mod_100(i64::from(yy))?;
    }
    if let Some(month) = parsed.month() {
        out.set_month(i64::from(month))?;
    }
    if let Some(day) = parsed.day() {
        out.set_day(i64::from(day))?;
    }
    if let Some(ordinal) = parsed.ordinal() {
        out.set_ordinal(i64::from(ordinal))?;
    }
    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (Some(half), Some(hour)) => out.set_hour(i64::from(half * 12 + hour))?,
        (Some(half), None) => out.set_ampm(half == 1)?,
        (None, Some(0)) => out.set_hour12(12)?,
        (None, Some(hour)) => out.set_hour12(i64::from(hour))?,
        (None, None) => {}
    }
    if let Some(minute) = parsed.minute() {
        out.set_minute(i64::from(minute))?;
    }
    if let Some(second) = parsed.second() {
        out.set_second(i64::from(second))?;
    }
    if let Some(nanosecond) = parsed.nanosecond() {
        out.set_nanosecond(i64::from(nanosecond))?;
    }
    if let Some(offset) = parsed.offset() {
        out.set_offset(i64::from(offset))?;
    }
    if let Some(timestamp) = parsed.timestamp() {
        out.set_timestamp(timestamp)?;
    }
    Ok(out)
}

/// Fill in year 0 (and January 1st when no day is present either).
fn yearless_date(parsed: &Parsed, not_enough: chrono::ParseError) -> Result<NaiveDate, chrono::ParseError> {
    let mut yearless = parsed.clone();
    if yearless.set_year(0).is_err() {
        return Err(not_enough);
    }
    match yearless.to_naive_date() {
        Ok(date) => Ok(date),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::from_ymd_opt(0, 1, 1).ok_or(e),
        Err(e) => Err(e),
    }
}
