//! Conversion of incoming timestamps into a single `DateTime<Utc>`.
//!
//! Clients may send an RFC 3339 string, a local date or date-time string,
//! epoch milliseconds, or a `{ seconds, nanoseconds }` timestamp object.
//! Each shape is normalised once here; nothing downstream sees anything
//! but `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Wrapper {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    Millis(i64),
    Text(String),
}

/// Naive strings are read as wall-clock time in `tz`.
pub fn normalize_in<Tz: TimeZone>(raw: &RawTimestamp, tz: &Tz) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Wrapper {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(*seconds, *nanoseconds),
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(*millis),
        RawTimestamp::Text(text) => parse_text(text.trim(), tz),
    }
}

fn parse_text<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return local_to_utc(naive, tz);
        }
    }

    parse_day(text).and_then(|day| start_of_day(day, tz))
}

/// Combines the separate date and time inputs of an HTML form.
pub fn from_form_in<Tz: TimeZone>(date: &str, time: Option<&str>, tz: &Tz) -> Option<DateTime<Utc>> {
    let day = parse_day(date)?;
    let time = match time.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()?,
        None => NaiveTime::MIN,
    };
    local_to_utc(day.and_time(time), tz)
}

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Calendar day of `instant` as seen in `tz`.
pub fn day_key<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    local_to_utc(day.and_time(NaiveTime::MIN), tz)
}

/// First instant after `day` in `tz`; exclusive upper bound for the day.
pub fn start_of_next_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    start_of_day(day.succ_opt()?, tz)
}

// A skipped wall-clock time (DST gap) has no instant; an ambiguous one
// resolves to the earlier instant.
fn local_to_utc<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}
