//! Turns client payloads into validated records.
//!
//! Everything that reaches the store and the aggregator has passed
//! through here: scores are in range, enum labels are known and every
//! timestamp is a normalised `DateTime<Utc>`.

use crate::errors::AppError;
use crate::models::{
    ActivityEventForm, ActivityEventRequest, ActivityEventUpdate, ActivityEventUpdateRequest,
    ActivityType, Intensity, NewActivityEvent, NewPainLog, PainForm, PainLogRequest,
    PainLogUpdate, PainLogUpdateRequest, PainQuality,
};
use crate::timestamp::{RawTimestamp, from_form_in, normalize_in};
use chrono::{DateTime, TimeZone, Utc};

pub const MAX_SCORE: i64 = 10;

pub fn validate_score(score: i64) -> Result<u8, AppError> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(AppError::invalid_field(
            "score",
            format!("must be between 0 and {MAX_SCORE}, got {score}"),
        ));
    }
    Ok(score as u8)
}

pub fn validate_duration(minutes: i64) -> Result<u32, AppError> {
    u32::try_from(minutes)
        .map_err(|_| AppError::invalid_field("duration_minutes", "must be a non-negative whole number"))
}

/// Trimmed text, or `None` when nothing is left.
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn clean_tags(tags: Option<Vec<String>>) -> Vec<String> {
    tags.unwrap_or_default()
        .into_iter()
        .filter_map(|tag| clean_text(Some(tag)))
        .collect()
}

fn parse_quality(value: Option<String>) -> Result<Option<PainQuality>, AppError> {
    match clean_text(value) {
        Some(value) => PainQuality::parse(&value)
            .map(Some)
            .ok_or_else(|| AppError::invalid_field("quality", format!("unknown quality '{value}'"))),
        None => Ok(None),
    }
}

fn parse_intensity(value: Option<String>) -> Result<Option<Intensity>, AppError> {
    match clean_text(value) {
        Some(value) => Intensity::parse(&value)
            .map(Some)
            .ok_or_else(|| AppError::invalid_field("intensity", format!("unknown intensity '{value}'"))),
        None => Ok(None),
    }
}

fn parse_kind(value: &str) -> Result<ActivityType, AppError> {
    ActivityType::parse(value)
        .ok_or_else(|| AppError::invalid_field("type", format!("unknown activity type '{}'", value.trim())))
}

fn resolve_timestamp<Tz: TimeZone>(raw: &RawTimestamp, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    normalize_in(raw, tz).ok_or_else(|| AppError::invalid_field("timestamp", "unrecognised timestamp"))
}

fn timestamp_or_now<Tz: TimeZone>(
    raw: Option<&RawTimestamp>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateTime<Utc>, AppError> {
    match raw {
        Some(raw) => resolve_timestamp(raw, tz),
        None => Ok(now),
    }
}

fn form_timestamp<Tz: TimeZone>(date: &str, time: Option<&str>, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    from_form_in(date, time, tz)
        .ok_or_else(|| AppError::invalid_field("date", "expected YYYY-MM-DD with an optional HH:MM time"))
}

pub fn new_pain_log<Tz: TimeZone>(
    request: PainLogRequest,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<NewPainLog, AppError> {
    Ok(NewPainLog {
        timestamp: timestamp_or_now(request.timestamp.as_ref(), now, tz)?,
        score: validate_score(request.score)?,
        location: clean_text(request.location),
        quality: parse_quality(request.quality)?,
        notes: clean_text(request.notes),
        tags: clean_tags(request.tags),
    })
}

/// Absent fields stay untouched; empty strings clear optional ones.
pub fn pain_log_update<Tz: TimeZone>(
    request: PainLogUpdateRequest,
    tz: &Tz,
) -> Result<PainLogUpdate, AppError> {
    Ok(PainLogUpdate {
        timestamp: request
            .timestamp
            .as_ref()
            .map(|raw| resolve_timestamp(raw, tz))
            .transpose()?,
        score: request.score.map(validate_score).transpose()?,
        location: request.location.map(|value| clean_text(Some(value))),
        quality: match request.quality {
            Some(value) => Some(parse_quality(Some(value))?),
            None => None,
        },
        notes: request.notes.map(|value| clean_text(Some(value))),
        tags: request.tags.map(|tags| clean_tags(Some(tags))),
    })
}

pub fn pain_log_from_form<Tz: TimeZone>(form: PainForm, tz: &Tz) -> Result<NewPainLog, AppError> {
    let score = form
        .score
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::invalid_field("score", "must be a whole number"))?;

    Ok(NewPainLog {
        timestamp: form_timestamp(&form.date, form.time.as_deref(), tz)?,
        score: validate_score(score)?,
        location: clean_text(form.location),
        quality: parse_quality(form.quality)?,
        notes: clean_text(form.notes),
        tags: Vec::new(),
    })
}

pub fn new_activity_event<Tz: TimeZone>(
    request: ActivityEventRequest,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<NewActivityEvent, AppError> {
    Ok(NewActivityEvent {
        timestamp: timestamp_or_now(request.timestamp.as_ref(), now, tz)?,
        kind: parse_kind(&request.kind)?,
        duration_minutes: request.duration_minutes.map(validate_duration).transpose()?,
        intensity: parse_intensity(request.intensity)?,
        notes: clean_text(request.notes),
    })
}

pub fn activity_event_update<Tz: TimeZone>(
    request: ActivityEventUpdateRequest,
    tz: &Tz,
) -> Result<ActivityEventUpdate, AppError> {
    Ok(ActivityEventUpdate {
        timestamp: request
            .timestamp
            .as_ref()
            .map(|raw| resolve_timestamp(raw, tz))
            .transpose()?,
        kind: request.kind.as_deref().map(parse_kind).transpose()?,
        duration_minutes: request
            .duration_minutes
            .map(|minutes| validate_duration(minutes).map(Some))
            .transpose()?,
        intensity: match request.intensity {
            Some(value) => Some(parse_intensity(Some(value))?),
            None => None,
        },
        notes: request.notes.map(|value| clean_text(Some(value))),
    })
}

pub fn activity_event_from_form<Tz: TimeZone>(
    form: ActivityEventForm,
    tz: &Tz,
) -> Result<NewActivityEvent, AppError> {
    let duration_minutes = match clean_text(form.duration_minutes) {
        Some(value) => {
            let minutes = value
                .parse::<i64>()
                .map_err(|_| AppError::invalid_field("duration_minutes", "must be a whole number"))?;
            Some(validate_duration(minutes)?)
        }
        None => None,
    };

    Ok(NewActivityEvent {
        timestamp: form_timestamp(&form.date, form.time.as_deref(), tz)?,
        kind: parse_kind(&form.kind)?,
        duration_minutes,
        intensity: parse_intensity(form.intensity)?,
        notes: clean_text(form.notes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn score_bounds() {
        assert_eq!(validate_score(0).unwrap(), 0);
        assert_eq!(validate_score(10).unwrap(), 10);
        let err = validate_score(11).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(validate_score(-1).is_err());
    }

    #[test]
    fn pain_request_defaults_timestamp_and_drops_blanks() {
        let now = utc("2024-05-01T10:00:00Z");
        let request = PainLogRequest {
            timestamp: None,
            score: 4,
            location: Some("  ".to_string()),
            quality: Some("Aching".to_string()),
            notes: Some(" after walk ".to_string()),
            tags: Some(vec!["".to_string(), "knee".to_string()]),
        };
        let new = new_pain_log(request, now, &Utc).unwrap();
        assert_eq!(new.timestamp, now);
        assert_eq!(new.location, None);
        assert_eq!(new.quality, Some(PainQuality::Aching));
        assert_eq!(new.notes.as_deref(), Some("after walk"));
        assert_eq!(new.tags, vec!["knee".to_string()]);
    }

    #[test]
    fn unknown_quality_is_rejected() {
        let request = PainLogRequest {
            timestamp: None,
            score: 4,
            location: None,
            quality: Some("tingly".to_string()),
            notes: None,
            tags: None,
        };
        assert!(new_pain_log(request, Utc::now(), &Utc).is_err());
    }

    #[test]
    fn update_distinguishes_clear_from_absent() {
        let request = PainLogUpdateRequest {
            notes: Some(String::new()),
            quality: Some(String::new()),
            ..PainLogUpdateRequest::default()
        };
        let update = pain_log_update(request, &Utc).unwrap();
        assert_eq!(update.notes, Some(None));
        assert_eq!(update.quality, Some(None));
        assert_eq!(update.location, None);
        assert_eq!(update.score, None);
    }

    #[test]
    fn event_request_validates_duration_and_kind() {
        let request = ActivityEventRequest {
            timestamp: Some(RawTimestamp::Text("2024-01-01T08:00:00Z".to_string())),
            kind: "long-drive".to_string(),
            duration_minutes: Some(90),
            intensity: Some("hard".to_string()),
            notes: None,
        };
        let new = new_activity_event(request, Utc::now(), &Utc).unwrap();
        assert_eq!(new.kind, ActivityType::LongDrive);
        assert_eq!(new.duration_minutes, Some(90));
        assert_eq!(new.intensity, Some(Intensity::Hard));
        assert_eq!(new.timestamp, utc("2024-01-01T08:00:00Z"));

        let negative = ActivityEventRequest {
            timestamp: None,
            kind: "run".to_string(),
            duration_minutes: Some(-5),
            intensity: None,
            notes: None,
        };
        assert!(new_activity_event(negative, Utc::now(), &Utc).is_err());
    }

    #[test]
    fn event_form_allows_blank_optionals() {
        let form = ActivityEventForm {
            kind: "pt".to_string(),
            date: "2024-01-02".to_string(),
            time: Some("07:30".to_string()),
            duration_minutes: Some(String::new()),
            intensity: Some(String::new()),
            notes: None,
        };
        let new = activity_event_from_form(form, &Utc).unwrap();
        assert_eq!(new.timestamp, utc("2024-01-02T07:30:00Z"));
        assert_eq!(new.duration_minutes, None);
        assert_eq!(new.intensity, None);
    }

    #[test]
    fn pain_form_rejects_bad_date() {
        let form = PainForm {
            score: "3".to_string(),
            date: "tomorrow".to_string(),
            time: None,
            location: None,
            quality: None,
            notes: None,
        };
        assert!(pain_log_from_form(form, &Utc).is_err());
    }
}
