use std::fmt;

use thiserror::Error;

/// Errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "no usable schedule rows across {pages} page(s) ({rows_seen} rows seen, {rows_rejected} rejected)"
    )]
    ExtractionFailure {
        pages: usize,
        rows_seen: usize,
        rows_rejected: usize,
    },
    #[error("academic year {0} is out of range")]
    InvalidAcademicYear(i32),
}

/// Why a single row could not become a class session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    InvalidTime,
    InvalidDate,
    EmptyCourseName,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::InvalidTime => "invalid time",
            RejectReason::InvalidDate => "invalid date",
            RejectReason::EmptyCourseName => "empty course name",
        };
        write!(f, "{reason}")
    }
}

/// A row dropped during normalization. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row rejected: {}", join_reasons(.reasons))]
pub struct RowRejected {
    pub reasons: Vec<RejectReason>,
}

fn join_reasons(reasons: &[RejectReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl RowRejected {
    pub fn has(&self, reason: RejectReason) -> bool {
        self.reasons.contains(&reason)
    }
}
