use crate::errors::AppError;
use crate::models::{ActivityEvent, ActivityType, PainReading, RangeParams};
use crate::timestamp::{parse_day, start_of_day, start_of_next_day};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Last7Days,
    Last30Days,
    Last90Days,
    All,
}

impl RangePreset {
    pub const ALL: [RangePreset; 4] = [
        RangePreset::Last7Days,
        RangePreset::Last30Days,
        RangePreset::Last90Days,
        RangePreset::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangePreset::Last7Days => "7d",
            RangePreset::Last30Days => "30d",
            RangePreset::Last90Days => "90d",
            RangePreset::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::Last7Days => "7 days",
            RangePreset::Last30Days => "30 days",
            RangePreset::Last90Days => "90 days",
            RangePreset::All => "All time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|preset| preset.as_str() == value)
    }

    fn days(&self) -> Option<i64> {
        match self {
            RangePreset::Last7Days => Some(7),
            RangePreset::Last30Days => Some(30),
            RangePreset::Last90Days => Some(90),
            RangePreset::All => None,
        }
    }
}

/// Instant bounds: `from` inclusive, `until` exclusive. `None` leaves that
/// side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The preset supplies both bounds; explicit days override either side.
    pub fn resolve_in<Tz: TimeZone>(
        preset: RangePreset,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let mut range = match preset.days() {
            Some(days) => DateRange {
                from: start_of_day(today - Duration::days(days - 1), tz),
                until: start_of_next_day(today, tz),
            },
            None => DateRange::unbounded(),
        };

        if let Some(day) = from {
            range.from = start_of_day(day, tz);
        }
        if let Some(day) = to {
            range.until = start_of_next_day(day, tz);
        }
        range
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *instant >= from) && self.until.is_none_or(|until| *instant < until)
    }
}

/// Range selection as requested by a client, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelection {
    pub preset: RangePreset,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeSelection {
    pub fn from_params(params: &RangeParams, default: RangePreset) -> Result<Self, AppError> {
        let preset = match non_empty(params.preset.as_deref()) {
            Some(value) => RangePreset::parse(value)
                .ok_or_else(|| AppError::invalid_field("preset", "must be 7d, 30d, 90d or all"))?,
            None => default,
        };
        let from = parse_optional_day("from", params.from.as_deref())?;
        let to = parse_optional_day("to", params.to.as_deref())?;

        Ok(Self { preset, from, to })
    }

    pub fn resolve_in<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> DateRange {
        DateRange::resolve_in(self.preset, self.from, self.to, today, tz)
    }
}

fn parse_optional_day(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match non_empty(value) {
        Some(value) => parse_day(value)
            .map(Some)
            .ok_or_else(|| AppError::invalid_field(field, "expected YYYY-MM-DD")),
        None => Ok(None),
    }
}

pub fn parse_kind_filter(value: Option<&str>) -> Result<Option<ActivityType>, AppError> {
    match non_empty(value) {
        None | Some("all") => Ok(None),
        Some(value) => ActivityType::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::invalid_field("type", format!("unknown activity type '{value}'"))),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PainQuery {
    pub user_id: String,
    pub range: DateRange,
    pub limit: Option<usize>,
}

impl PainQuery {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            range: DateRange::unbounded(),
            limit: None,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// A zero limit means no limit.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&limit| limit > 0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub user_id: String,
    pub range: DateRange,
    pub kind: Option<ActivityType>,
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            range: DateRange::unbounded(),
            kind: None,
            limit: None,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_kind(mut self, kind: Option<ActivityType>) -> Self {
        self.kind = kind;
        self
    }

    /// A zero limit means no limit.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&limit| limit > 0);
        self
    }
}

/// Read access to the current state of both record collections.
///
/// Every call returns an owned snapshot, newest first, so callers can
/// release the store before doing any further work with the records.
pub trait RecordSource {
    fn query_pain_logs(&self, query: &PainQuery) -> Vec<PainReading>;
    fn query_activity_events(&self, query: &EventQuery) -> Vec<ActivityEvent>;
}
