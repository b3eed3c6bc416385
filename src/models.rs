use crate::timestamp::RawTimestamp;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainQuality {
    Sharp,
    Dull,
    Aching,
    Stiff,
    Burning,
    Other,
}

impl PainQuality {
    pub const ALL: [PainQuality; 6] = [
        PainQuality::Sharp,
        PainQuality::Dull,
        PainQuality::Aching,
        PainQuality::Stiff,
        PainQuality::Burning,
        PainQuality::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PainQuality::Sharp => "sharp",
            PainQuality::Dull => "dull",
            PainQuality::Aching => "aching",
            PainQuality::Stiff => "stiff",
            PainQuality::Burning => "burning",
            PainQuality::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|quality| quality.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Pt,
    Run,
    Elliptical,
    LongDrive,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Pt,
        ActivityType::Run,
        ActivityType::Elliptical,
        ActivityType::LongDrive,
        ActivityType::Other,
    ];

    /// Stored label; also what the chart's events summary lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Pt => "pt",
            ActivityType::Run => "run",
            ActivityType::Elliptical => "elliptical",
            ActivityType::LongDrive => "long_drive",
            ActivityType::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityType::Pt => "Physical therapy",
            ActivityType::Run => "Run",
            ActivityType::Elliptical => "Elliptical",
            ActivityType::LongDrive => "Long drive",
            ActivityType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pt" | "physical_therapy" => Some(ActivityType::Pt),
            "run" => Some(ActivityType::Run),
            "elliptical" => Some(ActivityType::Elliptical),
            "long_drive" => Some(ActivityType::LongDrive),
            "other" => Some(ActivityType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Easy,
    Moderate,
    Hard,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Easy, Intensity::Moderate, Intensity::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Easy => "easy",
            Intensity::Moderate => "moderate",
            Intensity::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|intensity| intensity.as_str() == value)
    }
}

/// Display band for a pain score or a daily average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    pub fn from_score(score: u8) -> Self {
        Self::from_average(f64::from(score))
    }

    pub fn from_average(value: f64) -> Self {
        if value <= 2.0 {
            Severity::Mild
        } else if value <= 4.0 {
            Severity::Moderate
        } else if value <= 7.0 {
            Severity::Severe
        } else {
            Severity::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
            Severity::Extreme => "Extreme",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Mild => "#10b981",
            Severity::Moderate => "#3b82f6",
            Severity::Severe => "#f59e0b",
            Severity::Extreme => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainReading {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<PainQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything the store persists.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppData {
    pub next_id: u64,
    pub pain_logs: Vec<PainReading>,
    pub activity_events: Vec<ActivityEvent>,
}

/// A validated pain reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPainLog {
    pub timestamp: DateTime<Utc>,
    pub score: u8,
    pub location: Option<String>,
    pub quality: Option<PainQuality>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// Validated partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PainLogUpdate {
    pub timestamp: Option<DateTime<Utc>>,
    pub score: Option<u8>,
    pub location: Option<Option<String>>,
    pub quality: Option<Option<PainQuality>>,
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityType,
    pub duration_minutes: Option<u32>,
    pub intensity: Option<Intensity>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityEventUpdate {
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: Option<ActivityType>,
    pub duration_minutes: Option<Option<u32>>,
    pub intensity: Option<Option<Intensity>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PainLogRequest {
    pub timestamp: Option<RawTimestamp>,
    pub score: i64,
    pub location: Option<String>,
    pub quality: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PainLogUpdateRequest {
    pub timestamp: Option<RawTimestamp>,
    pub score: Option<i64>,
    pub location: Option<String>,
    pub quality: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityEventRequest {
    pub timestamp: Option<RawTimestamp>,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration_minutes: Option<i64>,
    pub intensity: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ActivityEventUpdateRequest {
    pub timestamp: Option<RawTimestamp>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub duration_minutes: Option<i64>,
    pub intensity: Option<String>,
    pub notes: Option<String>,
}

/// HTML form post from the pain entry form.
#[derive(Debug, Deserialize)]
pub struct PainForm {
    pub score: String,
    pub date: String,
    pub time: Option<String>,
    pub location: Option<String>,
    pub quality: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityEventForm {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub time: Option<String>,
    pub duration_minutes: Option<String>,
    pub intensity: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteForm {
    pub next: Option<String>,
}

/// Query string shared by list, chart and log-page endpoints.
#[derive(Debug, Deserialize, Default)]
pub struct RangeParams {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
}

/// Per-day pain statistics, rebuilt on every aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub count: u32,
    pub sum: u32,
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub avg: f64,
    pub min: u8,
    pub max: u8,
    pub has_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_summary: Option<String>,
}
