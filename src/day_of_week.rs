use std::fmt;

use chrono::Weekday;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

// Marks that follow a single-letter day code: apostrophe, geresh, gershayim, etc.
const CODE_SUFFIXES: &[char] = &['\'', '\u{05F3}', '\u{05F4}', '"', '`', '\u{2019}', '.'];

impl DayOfWeek {
    /// Resolves the portal's day code: a Hebrew letter with an optional geresh
    /// (`ב'`, `ב׳`, `ב`), optionally prefixed with `יום`, or the full day name.
    pub fn from_hebrew_code(code: &str) -> Option<DayOfWeek> {
        let code = code.trim();
        let code = code.strip_prefix("יום").map(str::trim).unwrap_or(code);
        let code = code.trim_end_matches(CODE_SUFFIXES).trim();
        let day = match code {
            "א" | "ראשון" => DayOfWeek::Sunday,
            "ב" | "שני" => DayOfWeek::Monday,
            "ג" | "שלישי" => DayOfWeek::Tuesday,
            "ד" | "רביעי" => DayOfWeek::Wednesday,
            "ה" | "חמישי" => DayOfWeek::Thursday,
            "ו" | "שישי" => DayOfWeek::Friday,
            "ש" | "שבת" => DayOfWeek::Saturday,
            _ => return None,
        };
        Some(day)
    }

    /// The single-letter code with a trailing apostrophe, as the portal prints it.
    pub fn hebrew_code(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "א'",
            DayOfWeek::Monday => "ב'",
            DayOfWeek::Tuesday => "ג'",
            DayOfWeek::Wednesday => "ד'",
            DayOfWeek::Thursday => "ה'",
            DayOfWeek::Friday => "ו'",
            DayOfWeek::Saturday => "ש'",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hebrew_code())
    }
}
