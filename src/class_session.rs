use chrono::{NaiveDate, NaiveTime};

use crate::day_of_week::DayOfWeek;

/// One scheduled class meeting, normalized from a grid row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSession {
    pub course_name: String,
    /// The raw course name carried the synchronous-online marker before cleaning.
    pub synchronous_online: bool,
    pub day_of_week: DayOfWeek,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub teacher: Option<String>,
    pub note: Option<String>,
}

impl ClassSession {
    /// Key under which repeated rows overwrite each other.
    pub fn key(&self) -> (NaiveDate, NaiveTime, &str) {
        (self.date, self.start_time, &self.course_name)
    }
}
