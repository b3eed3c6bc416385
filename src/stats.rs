use crate::models::{ActivityEvent, ChartPoint, DayBucket, PainReading};
use crate::timestamp::day_key;
use chrono::{Local, NaiveDate, TimeZone};
use std::collections::{BTreeMap, HashMap};

/// Daily pain series for the trend chart, bucketed by local calendar day.
pub fn build_chart(readings: &[PainReading], events: &[ActivityEvent]) -> Vec<ChartPoint> {
    build_chart_in(readings, events, &Local)
}

/// One point per day with at least one reading, ascending by day.
/// Days that only have activity events produce nothing.
pub fn build_chart_in<Tz: TimeZone>(
    readings: &[PainReading],
    events: &[ActivityEvent],
    tz: &Tz,
) -> Vec<ChartPoint> {
    if readings.is_empty() {
        return Vec::new();
    }

    let mut event_days = summarize_events(events, tz);

    bucket_readings(readings, tz)
        .into_values()
        .map(|bucket| {
            let summary = event_days.remove(&bucket.day);
            ChartPoint {
                date: bucket.day,
                avg: bucket.average(),
                min: bucket.min,
                max: bucket.max,
                has_event: summary.is_some(),
                events_summary: summary,
            }
        })
        .collect()
}

pub fn bucket_readings<Tz: TimeZone>(
    readings: &[PainReading],
    tz: &Tz,
) -> BTreeMap<NaiveDate, DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for reading in readings {
        let day = day_key(&reading.timestamp, tz);
        buckets
            .entry(day)
            .and_modify(|bucket| bucket.record(reading.score))
            .or_insert_with(|| DayBucket::first(day, reading.score));
    }
    buckets
}

// Comma-joined activity types per day, in input order, duplicates kept.
fn summarize_events<Tz: TimeZone>(events: &[ActivityEvent], tz: &Tz) -> HashMap<NaiveDate, String> {
    let mut days: HashMap<NaiveDate, String> = HashMap::new();
    for event in events {
        let label = event.kind.as_str();
        days.entry(day_key(&event.timestamp, tz))
            .and_modify(|summary| {
                summary.push_str(", ");
                summary.push_str(label);
            })
            .or_insert_with(|| label.to_string());
    }
    days
}

impl DayBucket {
    fn first(day: NaiveDate, score: u8) -> Self {
        Self {
            day,
            count: 1,
            sum: u32::from(score),
            min: score,
            max: score,
        }
    }

    fn record(&mut self, score: u8) {
        self.count += 1;
        self.sum = self.sum.saturating_add(u32::from(score));
        self.min = self.min.min(score);
        self.max = self.max.max(score);
    }

    pub fn average(&self) -> f64 {
        f64::from(self.sum) / f64::from(self.count)
    }
}
