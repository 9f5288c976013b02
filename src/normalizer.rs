use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use regex::Regex;

use crate::{
    academic_year::AcademicYear,
    class_session::ClassSession,
    day_of_week::DayOfWeek,
    error::{RejectReason, RowRejected},
    row_extractor::{Column, RawRow},
    text_manipulators::{non_empty, normalize_cell_text},
};

/// Marker the portal appends to synchronous online courses.
pub const SYNC_ONLINE_MARKER: &str = "מקוון סינכרוני";

/// Decorative substrings removed from course names, applied in order.
pub const COURSE_NAME_REPLACEMENTS: [(&str, &str); 4] = [
    (" (ENG)", ""),
    ("(ENG)", ""),
    (" (מקוון סינכרוני)", ""),
    ("(מקוון סינכרוני)", ""),
];

pub fn clean_course_name(raw: &str) -> String {
    let mut name = raw.to_string();
    for (pattern, replacement) in COURSE_NAME_REPLACEMENTS {
        name = name.replace(pattern, replacement);
    }
    let name = normalize_cell_text(&name)
        .replace("( )", "")
        .replace("()", "");
    normalize_cell_text(&name)
}

fn is_midnight(time: &NaiveTime) -> bool {
    time.num_seconds_from_midnight() == 0
}

/// Turns grid rows into [`ClassSession`]s for one academic year.
pub struct RecordNormalizer {
    academic_year: AcademicYear,
    time_regex: Regex,
    date_regex: Regex,
}

impl RecordNormalizer {
    pub fn new(academic_year: AcademicYear) -> anyhow::Result<Self> {
        let time_regex = Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$")?;
        let date_regex = Regex::new(r"^(\d{1,2})[./-](\d{1,2})(?:[./-](\d{4}|\d{2}))?$")?;
        Ok(Self {
            academic_year,
            time_regex,
            date_regex,
        })
    }

    pub fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        let caps = self.time_regex.captures(text.trim())?;
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        let second = caps.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
        NaiveTime::from_hms_opt(hour, minute, second)
    }

    /// Resolves `DD/MM/YYYY`, `DD/MM/YY` or year-less `DD/MM`. A missing year
    /// comes from the academic year the run was configured with.
    pub fn resolve_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        let Some(caps) = self.date_regex.captures(text) else {
            return NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
        };
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = match caps.get(3) {
            Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
            Some(y) => y.as_str().parse().ok()?,
            None => self.academic_year.calendar_year_for_month(month),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn resolve_times(&self, row: &RawRow) -> Option<(NaiveTime, Option<NaiveTime>)> {
        let start = row
            .column(Column::StartTime)
            .and_then(|t| self.parse_time(t))
            .filter(|t| !is_midnight(t))?;

        let end_text = row.column(Column::EndTime).unwrap_or("").trim();
        let end = if end_text.is_empty() {
            None
        } else {
            Some(self.parse_time(end_text)?).filter(|t| !is_midnight(t))
        };
        match end {
            Some(end) if end <= start => None,
            _ => Some((start, end)),
        }
    }

    /// Every step runs, so a rejection lists all of a row's problems.
    pub fn normalize(&self, row: &RawRow) -> Result<ClassSession, RowRejected> {
        let mut reasons = vec![];

        let times = self.resolve_times(row);
        if times.is_none() {
            reasons.push(RejectReason::InvalidTime);
        }

        let date = row
            .column(Column::Date)
            .and_then(|text| self.resolve_date(text));
        if date.is_none() {
            reasons.push(RejectReason::InvalidDate);
        }

        let raw_name = row.column(Column::CourseName).unwrap_or("");
        let course_name = clean_course_name(raw_name);
        if course_name.is_empty() {
            reasons.push(RejectReason::EmptyCourseName);
        }

        let (Some((start_time, end_time)), Some(date), true) =
            (times, date, reasons.is_empty())
        else {
            return Err(RowRejected { reasons });
        };

        let day_of_week = row
            .column(Column::Day)
            .and_then(DayOfWeek::from_hebrew_code)
            .unwrap_or_else(|| DayOfWeek::from(date.weekday()));

        Ok(ClassSession {
            synchronous_online: raw_name.contains(SYNC_ONLINE_MARKER),
            course_name,
            day_of_week,
            date,
            start_time,
            end_time,
            room: row.column(Column::Room).and_then(non_empty),
            teacher: row.column(Column::Teacher).and_then(non_empty),
            note: row.column(Column::Note).and_then(non_empty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::new(AcademicYear::new(2026).unwrap()).unwrap()
    }

    fn row(date: &str, day: &str, start: &str, end: &str, name: &str, note: &str) -> RawRow {
        [
            (Column::Date, date),
            (Column::Day, day),
            (Column::StartTime, start),
            (Column::EndTime, end),
            (Column::CourseName, name),
            (Column::Teacher, " כהן "),
            (Column::Room, ""),
            (Column::Note, note),
        ]
        .into_iter()
        .map(|(c, v)| (c.label(), v))
        .collect()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn normalizes_a_full_row() {
        let session = normalizer()
            .normalize(&row("20/10/2025", "ב'", "08:30", "10:00", "Math (ENG)", ""))
            .unwrap();
        assert_eq!(session.course_name, "Math");
        assert!(!session.synchronous_online);
        assert_eq!(session.day_of_week, DayOfWeek::Monday);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
        assert_eq!(session.start_time, t(8, 30));
        assert_eq!(session.end_time, Some(t(10, 0)));
        assert_eq!(session.teacher.as_deref(), Some("כהן"));
        assert_eq!(session.room, None);
        assert_eq!(session.note, None);
    }

    #[test]
    fn strips_sync_marker_and_remembers_it() {
        let session = normalizer()
            .normalize(&row(
                "21/10/2025",
                "ג'",
                "12:00",
                "13:30",
                "מפילוסופיה לכיתה (מקוון סינכרוני)",
                "",
            ))
            .unwrap();
        assert_eq!(session.course_name, "מפילוסופיה לכיתה");
        assert!(session.synchronous_online);
    }

    #[test]
    fn midnight_start_is_rejected() {
        let rejected = normalizer()
            .normalize(&row("20/10/2025", "ב'", "00:00", "00:00", "Math", ""))
            .unwrap_err();
        assert_eq!(rejected.reasons, vec![RejectReason::InvalidTime]);

        let missing = normalizer()
            .normalize(&row("20/10/2025", "ב'", "", "10:00", "Math", ""))
            .unwrap_err();
        assert!(missing.has(RejectReason::InvalidTime));
    }

    #[test]
    fn end_time_rules() {
        let n = normalizer();
        let absent = n
            .normalize(&row("20/10/2025", "ב'", "08:30", "", "Math", ""))
            .unwrap();
        assert_eq!(absent.end_time, None);
        let zero = n
            .normalize(&row("20/10/2025", "ב'", "08:30", "00:00", "Math", ""))
            .unwrap();
        assert_eq!(zero.end_time, None);
        assert!(n.normalize(&row("20/10/2025", "ב'", "08:30", "8:00", "Math", "")).is_err());
        assert!(n.normalize(&row("20/10/2025", "ב'", "08:30", "soon", "Math", "")).is_err());
    }

    #[test]
    fn collects_every_reason() {
        let rejected = normalizer()
            .normalize(&row("32/13/2025", "ב'", "xx", "", "(ENG)", ""))
            .unwrap_err();
        assert_eq!(
            rejected.reasons,
            vec![
                RejectReason::InvalidTime,
                RejectReason::InvalidDate,
                RejectReason::EmptyCourseName
            ]
        );
    }

    #[test]
    fn resolves_year_less_dates_against_academic_year() {
        let n = normalizer();
        assert_eq!(n.resolve_date("20/10"), NaiveDate::from_ymd_opt(2025, 10, 20));
        assert_eq!(n.resolve_date("5.1"), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(n.resolve_date("05/01/26"), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(n.resolve_date("05-01-2024"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(n.resolve_date("2025-11-02"), NaiveDate::from_ymd_opt(2025, 11, 2));
        assert_eq!(n.resolve_date("30/02/2026"), None);
        assert_eq!(n.resolve_date("tomorrow"), None);
    }

    #[test]
    fn parses_time_shapes() {
        let n = normalizer();
        assert_eq!(n.parse_time("8:05"), Some(t(8, 5)));
        assert_eq!(n.parse_time(" 14:45:00 "), Some(t(14, 45)));
        assert_eq!(n.parse_time("25:00"), None);
        assert_eq!(n.parse_time("1430"), None);
    }

    #[test]
    fn unknown_day_code_falls_back_to_date() {
        let session = normalizer()
            .normalize(&row("22/10/2025", "?", "10:00", "11:00", "Bio", ""))
            .unwrap();
        assert_eq!(session.day_of_week, DayOfWeek::Wednesday);
    }

    #[test]
    fn cleaning_leaves_no_artifacts() {
        assert_eq!(clean_course_name("Math (ENG)"), "Math");
        assert_eq!(clean_course_name("  Intro  to (ENG)  Logic "), "Intro to Logic");
        assert_eq!(clean_course_name("סטטיסטיקה ( ) "), "סטטיסטיקה");
        assert_eq!(clean_course_name("(ENG)(מקוון סינכרוני)"), "");
    }
}
