//! Fixed-shape per-exam views over a student's grades in a term.
//!
//! Both views only fill scores when the fetched row count is not exactly 4.
//! A complete 4-row term therefore renders as 4 empty slots. This mirrors the
//! behavior of the system these views were taken from and is pinned by tests;
//! whether the condition was meant the other way round is an open question.

use crate::error::{ServiceError, ServiceResult};
use crate::model::{ExamComparison, ExamScore, ExamSlot, Term, EXAM_SLOTS};

const FULL_TERM: usize = 4;

/// Term preceding `term`: semester 1 follows semester 2 of the year before,
/// anything else follows semester 1 of the same year.
pub fn previous_term(term: &Term) -> ServiceResult<Term> {
    if term.semester == "1" {
        let year: i64 = term.year.trim().parse().map_err(|_| {
            ServiceError::validation(format!("year must be an integer, got {:?}", term.year))
        })?;
        let prior = year.checked_sub(1).ok_or_else(|| {
            ServiceError::validation(format!("year {} has no previous year", year))
        })?;
        Ok(Term {
            year: prior.to_string(),
            semester: "2".to_string(),
        })
    } else {
        Ok(Term {
            year: term.year.clone(),
            semester: "1".to_string(),
        })
    }
}

/// Score recorded for `exam`; rows are in recording order, so the last match wins.
fn score_for(rows: &[ExamScore], exam: &str) -> Option<f64> {
    rows.iter()
        .rev()
        .find(|r| r.exam == exam)
        .and_then(|r| r.score)
}

pub fn exam_slots(rows: &[ExamScore]) -> Vec<ExamSlot> {
    let mut slots: Vec<ExamSlot> = EXAM_SLOTS
        .iter()
        .map(|exam| ExamSlot {
            exam: exam.to_string(),
            score: None,
        })
        .collect();

    if rows.len() != FULL_TERM {
        for slot in slots.iter_mut() {
            slot.score = score_for(rows, &slot.exam);
        }
    }
    slots
}

pub fn compare_slots(current: &[ExamScore], previous: &[ExamScore]) -> Vec<ExamComparison> {
    let mut slots: Vec<ExamComparison> = EXAM_SLOTS
        .iter()
        .map(|exam| ExamComparison {
            exam: exam.to_string(),
            current_score: None,
            previous_score: None,
        })
        .collect();

    if current.len() != FULL_TERM && previous.len() != FULL_TERM {
        for slot in slots.iter_mut() {
            slot.current_score = score_for(current, &slot.exam);
            slot.previous_score = score_for(previous, &slot.exam);
        }
    }
    slots
}
