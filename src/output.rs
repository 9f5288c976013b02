use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use log::info;
use serde::Serialize;
use tokio::fs;

use crate::{
    calendar_emitter::{CalendarFile, unique_sessions},
    classifier::{Category, ClassifiedSession},
};

/// Writes each calendar as `<dir>/<file_name>`, creating `dir` when missing.
pub async fn write_calendars(dir: &Path, calendars: &[CalendarFile]) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for calendar in calendars {
        let path = dir.join(calendar.file_name);
        fs::write(&path, &calendar.contents)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            "Wrote {} event(s) to {}",
            calendar.event_count,
            path.display()
        );
    }
    Ok(())
}

/// One entry of the `classes.json` dump.
#[derive(Debug, Serialize)]
pub struct SessionRecord<'a> {
    pub date: NaiveDate,
    /// Day code as the portal prints it (`ב'`).
    pub day: &'static str,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub course_name: &'a str,
    pub teacher: Option<&'a str>,
    pub room: Option<&'a str>,
    pub note: Option<&'a str>,
    pub category: Category,
}

impl<'a> From<&'a ClassifiedSession> for SessionRecord<'a> {
    fn from(classified: &'a ClassifiedSession) -> Self {
        let session = &classified.session;
        Self {
            date: session.date,
            day: session.day_of_week.hebrew_code(),
            start_time: session.start_time,
            end_time: session.end_time,
            course_name: &session.course_name,
            teacher: session.teacher.as_deref(),
            room: session.room.as_deref(),
            note: session.note.as_deref(),
            category: classified.category,
        }
    }
}

/// Pretty JSON of the sessions that made it into the calendars, in calendar order.
pub fn sessions_json(sessions: &[ClassifiedSession]) -> anyhow::Result<String> {
    let records: Vec<SessionRecord> = unique_sessions(sessions)
        .into_iter()
        .map(SessionRecord::from)
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub async fn write_sessions_json(path: &Path, sessions: &[ClassifiedSession]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, sessions_json(sessions)?)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote session dump to {}", path.display());
    Ok(())
}
