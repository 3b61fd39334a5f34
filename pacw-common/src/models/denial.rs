//! Denial analysis and the tagged lookup result

use serde::{Deserialize, Serialize};

use super::autofill::Citation;

/// Per-requirement status in the gap report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    Missing,
    Resolved,
}

/// One gap report line derived from a denial letter's stated deficiencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReportItem {
    pub item: String,
    pub status: GapStatus,
}

/// Parsed denial letter analysis, produced by the document-parsing collaborator
///
/// The engine treats the content as opaque; only the presence or absence of
/// the analysis participates in appeal-export gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenialAnalysis {
    pub case_id: i64,
    pub denial_document_id: i64,
    pub reasons: Vec<String>,
    pub missing_items: Vec<String>,
    pub gap_report: Vec<GapReportItem>,
    pub reference_id: Option<String>,
    pub deadline_text: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub appeal_letter_draft: Option<String>,
}

/// Outcome of a denial analysis lookup
///
/// `Absent` is expected and non-fatal (a case with no denial); only it feeds
/// the appeal gate. `Failed` is surfaced as a visible error without affecting
/// gating.
#[derive(Debug, Clone)]
pub enum DenialLookup {
    Found(DenialAnalysis),
    Absent,
    Failed(String),
}

impl DenialLookup {
    pub fn analysis(&self) -> Option<&DenialAnalysis> {
        match self {
            DenialLookup::Found(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            DenialLookup::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
