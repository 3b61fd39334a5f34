//! Autofill overlay: machine-suggested fills with citations
//!
//! Fills are a derived overlay over the answer store, replaced wholesale on
//! each autofill run and never merged field-by-field. Running autofill never
//! touches answer state, verified answers included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reference into a source document's extracted text
///
/// `start`/`end` are character offsets used only for display and uniqueness;
/// they are never validated against the document length here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: i64,
    pub page: u32,
    pub start: usize,
    pub end: usize,
    pub excerpt: String,
}

/// Autofill fill status as stored in the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStatus {
    Autofilled,
    Suggested,
    Missing,
}

/// One machine-suggested fill for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFill {
    pub value: String,
    /// Model confidence in 0..1
    pub confidence: f64,
    pub status: FillStatus,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl FieldFill {
    /// Whether the fill carries a non-blank value and at least one citation
    pub fn is_cited(&self) -> bool {
        self.status != FillStatus::Missing
            && !self.value.trim().is_empty()
            && !self.citations.is_empty()
    }
}

/// Field id → fill; fields without a suggestion are simply absent
pub type AutofillOverlay = BTreeMap<String, FieldFill>;

/// Raw statuses models report for a confidently filled field
const AUTOFILLED_ALIASES: &[&str] = &["autofilled", "filled", "verified", "complete"];
/// Raw statuses models report for an uncertain fill
const SUGGESTED_ALIASES: &[&str] = &["suggested", "review", "partial", "uncertain", "needs_review"];

/// Confidence floor below which an autofilled status is demoted to suggested
const AUTOFILL_CONFIDENCE_FLOOR: f64 = 0.85;

/// Fold a model-reported status into the three overlay statuses
///
/// Inference backends report a variety of status spellings; anything with a
/// blank value is missing, a claimed autofill below the confidence floor is
/// demoted to suggested, and unrecognized statuses with a value default to
/// suggested.
pub fn normalize_fill_status(raw: Option<&str>, value: &str, confidence: f64) -> FillStatus {
    if value.trim().is_empty() {
        return FillStatus::Missing;
    }

    let normalized = raw.unwrap_or("").trim().to_lowercase();
    if AUTOFILLED_ALIASES.contains(&normalized.as_str()) {
        if confidence < AUTOFILL_CONFIDENCE_FLOOR {
            return FillStatus::Suggested;
        }
        return FillStatus::Autofilled;
    }
    if SUGGESTED_ALIASES.contains(&normalized.as_str()) {
        return FillStatus::Suggested;
    }
    if normalized == "missing" {
        return FillStatus::Missing;
    }

    FillStatus::Suggested
}
