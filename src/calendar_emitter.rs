use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::{Calendar, Component, Event, EventLike, Property};

use crate::{
    class_session::ClassSession,
    classifier::{Category, ClassifiedSession},
};

pub const TIMEZONE: &str = "Asia/Jerusalem";
/// Length given to sessions whose end time is missing in the source.
pub const DEFAULT_SESSION_MINUTES: i64 = 90;

const UID_DOMAIN: &str = "college-calendar";

/// One rendered `.ics` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFile {
    pub category: Category,
    pub file_name: &'static str,
    pub event_count: usize,
    pub contents: String,
}

pub struct CalendarEmitter {
    calendar_name: String,
}

impl CalendarEmitter {
    pub fn new(calendar_name: impl Into<String>) -> Self {
        Self {
            calendar_name: calendar_name.into(),
        }
    }

    /// Renders one calendar per category, in [`Category::ALL`] order.
    pub fn emit(&self, sessions: &[ClassifiedSession]) -> Vec<CalendarFile> {
        let unique = unique_sessions(sessions);
        Category::ALL
            .into_iter()
            .map(|category| {
                let events: Vec<&ClassSession> = unique
                    .iter()
                    .filter(|c| c.category == category)
                    .map(|c| &c.session)
                    .collect();
                CalendarFile {
                    category,
                    file_name: category.file_name(),
                    event_count: events.len(),
                    contents: self.render_calendar(category, &events),
                }
            })
            .collect()
    }

    pub fn render_calendar(&self, category: Category, events: &[&ClassSession]) -> String {
        let title = format!("{} - {}", self.calendar_name, category.title());
        let mut calendar = Calendar::new();
        calendar
            .append_property(Property::new("X-WR-CALNAME", title.as_str()))
            .append_property(Property::new("X-WR-TIMEZONE", TIMEZONE));
        for session in events {
            calendar.push(session_event(category, session));
        }
        calendar.to_string()
    }
}

fn session_event(category: Category, session: &ClassSession) -> Event {
    let uid = format!("{:016x}@{UID_DOMAIN}", event_uid(session));
    let color_id = category.google_color_id().to_string();

    let mut event = Event::new();
    event
        .uid(uid.as_str())
        // midnight of the class day keeps reruns byte-identical
        .timestamp(NaiveDateTime::from(session.date).and_utc())
        .starts(session.date.and_time(session.start_time))
        .ends(event_end(session))
        .summary(session.course_name.as_str())
        .add_property("CATEGORIES", category.label())
        .add_property("COLOR", category.color())
        .add_property("X-GOOGLE-CALENDAR-COLOR-ID", color_id.as_str())
        .add_property("X-GOOGLE-CALENDAR-CONTENT-COLOR", color_id.as_str());
    if let Some(description) = description(session) {
        event.description(description.as_str());
    }
    if let Some(room) = &session.room {
        event.add_property("LOCATION", room.as_str());
    }
    event
}

/// Sessions sharing a date, start time and course name collapse into one;
/// the last one wins. Ordered by date, start time, course name.
pub fn unique_sessions(sessions: &[ClassifiedSession]) -> Vec<&ClassifiedSession> {
    let mut by_key: BTreeMap<(NaiveDate, NaiveTime, &str), &ClassifiedSession> = BTreeMap::new();
    for classified in sessions {
        by_key.insert(classified.session.key(), classified);
    }
    by_key.into_values().collect()
}

pub fn event_end(session: &ClassSession) -> NaiveDateTime {
    match session.end_time {
        Some(end) => session.date.and_time(end),
        None => {
            session.date.and_time(session.start_time)
                + Duration::minutes(DEFAULT_SESSION_MINUTES)
        }
    }
}

/// Teacher line, then note line; `None` when neither is set.
pub fn description(session: &ClassSession) -> Option<String> {
    let mut parts = vec![];
    if let Some(teacher) = &session.teacher {
        parts.push(format!("מרצה: {teacher}"));
    }
    if let Some(note) = &session.note {
        parts.push(format!("הערה: {note}"));
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

/// FNV-1a over the dedup key, stable across runs and toolchains.
fn event_uid(session: &ClassSession) -> u64 {
    let (date, start, name) = session.key();
    let key = format!("{date}|{start}|{name}");
    key.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
