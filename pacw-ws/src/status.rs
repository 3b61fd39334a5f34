//! Field Status Resolver
//!
//! Combines one answer-store entry with the corresponding autofill fill (if
//! any) into the single user-facing status per field. Precedence is fixed:
//! a clinician's explicit verification is the only way to leave needs-review,
//! and any AI-touched or manually-entered-but-unconfirmed value surfaces as
//! needing review, never as silently complete.

use pacw_common::models::{Answer, FieldFill, FieldState, FillStatus};

/// User-facing status for one questionnaire field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Missing,
    NeedsReview,
    Verified,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Missing => "Missing",
            DisplayStatus::NeedsReview => "Needs review",
            DisplayStatus::Verified => "Verified",
        }
    }
}

/// Resolve the display status for one field
///
/// 1. Answer state `verified` → Verified (manual confirmation always wins,
///    even over autofill).
/// 2. Answer state `filled`, or a fill with status `autofilled` or
///    `suggested` → Needs review.
/// 3. Otherwise → Missing.
pub fn resolve_field_status(answer: &Answer, fill: Option<&FieldFill>) -> DisplayStatus {
    if answer.state == FieldState::Verified {
        return DisplayStatus::Verified;
    }

    let fill_touched = fill
        .map(|fill| matches!(fill.status, FillStatus::Autofilled | FillStatus::Suggested))
        .unwrap_or(false);

    if answer.state == FieldState::Filled || fill_touched {
        return DisplayStatus::NeedsReview;
    }

    DisplayStatus::Missing
}

/// The stricter binary used by the requirements checklist
///
/// Complete means the answer was touched (state is not `missing`) and its
/// trimmed value is non-empty. Independent of the three-way display status.
pub fn is_requirement_met(answer: &Answer) -> bool {
    answer.state != FieldState::Missing && answer.has_value()
}
