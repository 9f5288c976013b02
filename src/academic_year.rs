use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::PipelineError;

/// First month that belongs to the next academic year.
pub const ROLLOVER_MONTH: u32 = 10;

const VALID_YEARS: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Academic year label. Year `N` runs from October of `N - 1` through September of `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AcademicYear(i32);

impl AcademicYear {
    pub fn new(year: i32) -> Result<Self, PipelineError> {
        if VALID_YEARS.contains(&year) {
            Ok(Self(year))
        } else {
            Err(PipelineError::InvalidAcademicYear(year))
        }
    }

    /// The academic year `today` falls in.
    pub fn containing(today: NaiveDate) -> Result<Self, PipelineError> {
        let year = if today.month() >= ROLLOVER_MONTH {
            today.year() + 1
        } else {
            today.year()
        };
        Self::new(year)
    }

    pub fn year(self) -> i32 {
        self.0
    }

    /// Calendar year a year-less `month` of this academic year falls in.
    pub fn calendar_year_for_month(self, month: u32) -> i32 {
        if month >= ROLLOVER_MONTH {
            self.0 - 1
        } else {
            self.0
        }
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rolls_over_in_october() {
        assert_eq!(AcademicYear::containing(date(2025, 9, 30)).unwrap().year(), 2025);
        assert_eq!(AcademicYear::containing(date(2025, 10, 1)).unwrap().year(), 2026);
        assert_eq!(AcademicYear::containing(date(2026, 1, 15)).unwrap().year(), 2026);
    }

    #[test]
    fn maps_months_to_calendar_years() {
        let year = AcademicYear::new(2026).unwrap();
        assert_eq!(year.calendar_year_for_month(10), 2025);
        assert_eq!(year.calendar_year_for_month(12), 2025);
        assert_eq!(year.calendar_year_for_month(1), 2026);
        assert_eq!(year.calendar_year_for_month(9), 2026);
    }

    #[test]
    fn rejects_malformed_years() {
        assert!(matches!(
            AcademicYear::new(0),
            Err(PipelineError::InvalidAcademicYear(0))
        ));
        assert!(AcademicYear::new(20256).is_err());
    }
}
