use std::fmt;

use serde::Serialize;

use crate::{class_session::ClassSession, day_of_week::DayOfWeek};

/// Output partition a session lands in. Each category becomes one calendar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Online,
    SpecialDay,
    InPerson,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Online, Category::SpecialDay, Category::InPerson];

    /// RFC 7986 `COLOR` value.
    pub fn color(self) -> &'static str {
        match self {
            Category::Online => "blue",
            Category::SpecialDay => "yellow",
            Category::InPerson => "red",
        }
    }

    /// Google Calendar event color id (Blueberry, Banana, Tomato).
    pub fn google_color_id(self) -> u8 {
        match self {
            Category::Online => 9,
            Category::SpecialDay => 5,
            Category::InPerson => 11,
        }
    }

    /// `CATEGORIES` label on every event.
    pub fn label(self) -> &'static str {
        match self {
            Category::Online => "Blue-Zoom",
            Category::SpecialDay => "Yellow-Monday",
            Category::InPerson => "Tomato",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Online => "Online",
            Category::SpecialDay => "Monday",
            Category::InPerson => "In Person",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Category::Online => "online.ics",
            Category::SpecialDay => "special-day.ics",
            Category::InPerson => "in-person.ics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Note substrings that mark a remote session. Matched against the lowercased note.
pub const ONLINE_NOTE_MARKERS: [&str; 2] = ["זום", "zoom"];

/// Day whose in-person classes get their own calendar.
pub const SPECIAL_DAY: DayOfWeek = DayOfWeek::Monday;

/// Category for sessions no rule claims.
pub const DEFAULT_CATEGORY: Category = Category::InPerson;

pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&ClassSession) -> bool,
    pub category: Category,
}

fn is_online(session: &ClassSession) -> bool {
    let note_says_online = session.note.as_deref().is_some_and(|note| {
        let note = note.to_lowercase();
        ONLINE_NOTE_MARKERS.iter().any(|marker| note.contains(marker))
    });
    note_says_online || session.synchronous_online
}

fn is_special_day(session: &ClassSession) -> bool {
    session.day_of_week == SPECIAL_DAY
}

/// Evaluated top to bottom; the first matching rule decides.
pub static RULES: [Rule; 2] = [
    Rule {
        name: "online",
        matches: is_online,
        category: Category::Online,
    },
    Rule {
        name: "special-day",
        matches: is_special_day,
        category: Category::SpecialDay,
    },
];

pub fn classify_with(rules: &[Rule], session: &ClassSession) -> Category {
    rules
        .iter()
        .find(|rule| (rule.matches)(session))
        .map_or(DEFAULT_CATEGORY, |rule| rule.category)
}

pub fn classify(session: &ClassSession) -> Category {
    classify_with(&RULES, session)
}

/// Name of the rule that claims `session`, `None` when it falls through to the default.
pub fn matching_rule(session: &ClassSession) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| (rule.matches)(session))
        .map(|rule| rule.name)
}

/// A session tagged with the category it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSession {
    pub session: ClassSession,
    pub category: Category,
}

impl From<ClassSession> for ClassifiedSession {
    fn from(session: ClassSession) -> Self {
        let category = classify(&session);
        Self { session, category }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn session(day: DayOfWeek, note: Option<&str>, synchronous_online: bool) -> ClassSession {
        ClassSession {
            course_name: "Math".to_string(),
            synchronous_online,
            day_of_week: day,
            date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end_time: None,
            room: None,
            teacher: None,
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn online_beats_monday() {
        let monday_zoom = session(DayOfWeek::Monday, Some("זום"), false);
        assert_eq!(classify(&monday_zoom), Category::Online);
        assert_eq!(matching_rule(&monday_zoom), Some("online"));

        let monday_sync = session(DayOfWeek::Monday, None, true);
        assert_eq!(classify(&monday_sync), Category::Online);
    }

    #[test]
    fn marker_inside_longer_note() {
        let s = session(DayOfWeek::Tuesday, Some("השיעור יתקיים בזום"), false);
        assert_eq!(classify(&s), Category::Online);
        let s = session(DayOfWeek::Tuesday, Some("Link: ZOOM room 3"), false);
        assert_eq!(classify(&s), Category::Online);
    }

    #[test]
    fn monday_without_marker_is_special_day() {
        let s = session(DayOfWeek::Monday, None, false);
        assert_eq!(classify(&s), Category::SpecialDay);
        let s = session(DayOfWeek::Monday, Some("חדר הוחלף"), false);
        assert_eq!(classify(&s), Category::SpecialDay);
    }

    #[test]
    fn everything_else_is_in_person() {
        let s = session(DayOfWeek::Wednesday, None, false);
        assert_eq!(classify(&s), Category::InPerson);
        assert_eq!(matching_rule(&s), None);
    }

    #[test]
    fn exactly_one_category_for_every_combination() {
        let days = [
            DayOfWeek::Sunday,
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Saturday,
        ];
        for day in days {
            for note in [None, Some("זום"), Some("מבחן")] {
                for sync in [false, true] {
                    let s = session(day, note, sync);
                    let category = classify(&s);
                    let expected = if note == Some("זום") || sync {
                        Category::Online
                    } else if day == DayOfWeek::Monday {
                        Category::SpecialDay
                    } else {
                        Category::InPerson
                    };
                    assert_eq!(category, expected, "{day:?} {note:?} {sync}");
                    assert_eq!(Category::ALL.iter().filter(|c| **c == category).count(), 1);
                }
            }
        }
    }

    #[test]
    fn rule_order_is_what_decides() {
        let reversed = [
            Rule {
                name: "special-day",
                matches: is_special_day,
                category: Category::SpecialDay,
            },
            Rule {
                name: "online",
                matches: is_online,
                category: Category::Online,
            },
        ];
        let s = session(DayOfWeek::Monday, Some("זום"), false);
        assert_eq!(classify_with(&reversed, &s), Category::SpecialDay);
        assert_eq!(classify_with(&RULES, &s), Category::Online);
        assert_eq!(classify_with(&[], &s), DEFAULT_CATEGORY);
    }

    #[test]
    fn presentation_is_distinct_per_category() {
        assert_eq!(Category::Online.color(), "blue");
        assert_eq!(Category::SpecialDay.color(), "yellow");
        assert_eq!(Category::InPerson.color(), "red");
        let mut files: Vec<_> = Category::ALL.iter().map(|c| c.file_name()).collect();
        files.dedup();
        assert_eq!(files.len(), 3);
    }
}
