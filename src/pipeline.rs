use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    calendar_emitter::{CalendarEmitter, CalendarFile},
    classifier::{Category, ClassifiedSession, matching_rule},
    error::PipelineError,
    normalizer::RecordNormalizer,
    page::Page,
    row_extractor::{Column, RawRow, extract_pages},
};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub pages: usize,
    pub rows_seen: usize,
    pub rows_rejected: usize,
    /// Rows that overwrote an earlier row with the same date, start time and course.
    pub duplicates: usize,
    /// Events written per category, after duplicates collapse.
    pub sessions_per_category: BTreeMap<Category, usize>,
}

impl RunReport {
    pub fn sessions(&self) -> usize {
        self.sessions_per_category.values().sum()
    }

    pub fn log(&self) {
        info!(
            "Run finished: {} page(s), {} rows seen, {} rejected, {} duplicate(s), {} session(s)",
            self.pages,
            self.rows_seen,
            self.rows_rejected,
            self.duplicates,
            self.sessions()
        );
        for (category, count) in &self.sessions_per_category {
            if *count == 0 {
                warn!("{category}: no sessions, writing an empty calendar");
            } else {
                info!("{category}: {count} session(s)");
            }
        }
    }
}

pub struct PipelineOutput {
    pub report: RunReport,
    pub sessions: Vec<ClassifiedSession>,
    pub calendars: Vec<CalendarFile>,
}

/// Normalizes and classifies rows, keeping row order. Rejected rows are
/// logged and counted, never fatal.
pub fn classify_rows(
    rows: &[RawRow],
    normalizer: &RecordNormalizer,
) -> (Vec<ClassifiedSession>, usize) {
    let results: Vec<_> = rows.par_iter().map(|row| normalizer.normalize(row)).collect();

    let mut sessions = Vec::with_capacity(results.len());
    let mut rejected = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(session) => {
                let classified = ClassifiedSession::from(session);
                debug!(
                    "Row {} ({}): {} by rule {}",
                    i + 1,
                    classified.session.course_name,
                    classified.category,
                    matching_rule(&classified.session).unwrap_or("default")
                );
                sessions.push(classified);
            }
            Err(rejection) => {
                rejected += 1;
                let course = rows[i].column(Column::CourseName).unwrap_or("");
                warn!("Row {} ({course}): {rejection}", i + 1);
            }
        }
    }
    (sessions, rejected)
}

/// Runs extraction, normalization, classification and rendering over `pages`.
///
/// Fails with [`PipelineError::ExtractionFailure`] when no page yields a
/// usable session; nothing should be written in that case.
pub fn run(
    pages: &[Page],
    normalizer: &RecordNormalizer,
    emitter: &CalendarEmitter,
) -> Result<PipelineOutput, PipelineError> {
    let rows = extract_pages(pages);
    let (sessions, rows_rejected) = classify_rows(&rows, normalizer);

    if sessions.is_empty() {
        return Err(PipelineError::ExtractionFailure {
            pages: pages.len(),
            rows_seen: rows.len(),
            rows_rejected,
        });
    }

    let calendars = emitter.emit(&sessions);
    let sessions_per_category: BTreeMap<Category, usize> = calendars
        .iter()
        .map(|calendar| (calendar.category, calendar.event_count))
        .collect();
    let written: usize = sessions_per_category.values().sum();

    let report = RunReport {
        pages: pages.len(),
        rows_seen: rows.len(),
        rows_rejected,
        duplicates: sessions.len() - written,
        sessions_per_category,
    };

    Ok(PipelineOutput {
        report,
        sessions,
        calendars,
    })
}
