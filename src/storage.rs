use crate::errors::AppError;
use crate::models::{
    ActivityEvent, ActivityEventUpdate, AppData, NewActivityEvent, NewPainLog, PainLogUpdate,
    PainReading,
};
use crate::query::{EventQuery, PainQuery, RecordSource};
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write data file: {err}");
        AppError::internal(err)
    })?;
    Ok(())
}

impl AppData {
    fn allocate_id(&mut self) -> String {
        self.next_id = self.next_id.saturating_add(1);
        self.next_id.to_string()
    }

    pub fn add_pain_log(&mut self, user_id: &str, new: NewPainLog) -> PainReading {
        let reading = PainReading {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            timestamp: new.timestamp,
            score: new.score,
            location: new.location,
            quality: new.quality,
            notes: new.notes,
            tags: new.tags,
        };
        self.pain_logs.push(reading.clone());
        reading
    }

    pub fn update_pain_log(
        &mut self,
        user_id: &str,
        id: &str,
        update: PainLogUpdate,
    ) -> Option<PainReading> {
        let reading = self
            .pain_logs
            .iter_mut()
            .find(|reading| reading.id == id && reading.user_id == user_id)?;

        if let Some(timestamp) = update.timestamp {
            reading.timestamp = timestamp;
        }
        if let Some(score) = update.score {
            reading.score = score;
        }
        if let Some(location) = update.location {
            reading.location = location;
        }
        if let Some(quality) = update.quality {
            reading.quality = quality;
        }
        if let Some(notes) = update.notes {
            reading.notes = notes;
        }
        if let Some(tags) = update.tags {
            reading.tags = tags;
        }
        Some(reading.clone())
    }

    pub fn delete_pain_log(&mut self, user_id: &str, id: &str) -> bool {
        let before = self.pain_logs.len();
        self.pain_logs
            .retain(|reading| !(reading.id == id && reading.user_id == user_id));
        self.pain_logs.len() != before
    }

    pub fn add_activity_event(&mut self, user_id: &str, new: NewActivityEvent) -> ActivityEvent {
        let event = ActivityEvent {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            timestamp: new.timestamp,
            kind: new.kind,
            duration_minutes: new.duration_minutes,
            intensity: new.intensity,
            notes: new.notes,
        };
        self.activity_events.push(event.clone());
        event
    }

    pub fn update_activity_event(
        &mut self,
        user_id: &str,
        id: &str,
        update: ActivityEventUpdate,
    ) -> Option<ActivityEvent> {
        let event = self
            .activity_events
            .iter_mut()
            .find(|event| event.id == id && event.user_id == user_id)?;

        if let Some(timestamp) = update.timestamp {
            event.timestamp = timestamp;
        }
        if let Some(kind) = update.kind {
            event.kind = kind;
        }
        if let Some(duration) = update.duration_minutes {
            event.duration_minutes = duration;
        }
        if let Some(intensity) = update.intensity {
            event.intensity = intensity;
        }
        if let Some(notes) = update.notes {
            event.notes = notes;
        }
        Some(event.clone())
    }

    pub fn delete_activity_event(&mut self, user_id: &str, id: &str) -> bool {
        let before = self.activity_events.len();
        self.activity_events
            .retain(|event| !(event.id == id && event.user_id == user_id));
        self.activity_events.len() != before
    }
}

impl RecordSource for AppData {
    fn query_pain_logs(&self, query: &PainQuery) -> Vec<PainReading> {
        let mut readings: Vec<PainReading> = self
            .pain_logs
            .iter()
            .filter(|reading| reading.user_id == query.user_id)
            .filter(|reading| query.range.contains(&reading.timestamp))
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = query.limit {
            readings.truncate(limit);
        }
        readings
    }

    fn query_activity_events(&self, query: &EventQuery) -> Vec<ActivityEvent> {
        let mut events: Vec<ActivityEvent> = self
            .activity_events
            .iter()
            .filter(|event| event.user_id == query.user_id)
            .filter(|event| query.range.contains(&event.timestamp))
            .filter(|event| query.kind.is_none_or(|kind| event.kind == kind))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = query.limit {
            events.truncate(limit);
        }
        events
    }
}
