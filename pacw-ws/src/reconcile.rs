//! Denial / Gap Reconciler
//!
//! The denial analysis is produced by an external document-parsing
//! collaborator and is exposed unmodified as the gap report. The engine's
//! only added logic is appeal-export eligibility: the analysis is present.
//! Content is irrelevant; an analysis with zero reasons or zero missing
//! items still satisfies eligibility. A failed lookup never gates anything.

use pacw_common::models::{DenialAnalysis, DenialLookup, GapReportItem, GapStatus};

/// Whether the case is eligible for an appeal export
pub fn appeal_eligible(lookup: &DenialLookup) -> bool {
    matches!(lookup, DenialLookup::Found(_))
}

/// The gap report, passed through untouched
pub fn gap_report(analysis: &DenialAnalysis) -> &[GapReportItem] {
    &analysis.gap_report
}

/// Missing / resolved counts for display layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapSummary {
    pub missing: usize,
    pub resolved: usize,
}

pub fn summarize_gaps(analysis: &DenialAnalysis) -> GapSummary {
    let resolved = analysis
        .gap_report
        .iter()
        .filter(|item| item.status == GapStatus::Resolved)
        .count();
    GapSummary {
        missing: analysis.gap_report.len() - resolved,
        resolved,
    }
}
