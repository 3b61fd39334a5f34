//! Completeness Scorer
//!
//! Aggregates required-field fill rate and citation-coverage rate into one
//! score. Pure functions of packet contents plus the required-field list, so
//! a persisted export can be re-scored for auditing without live UI state.

use std::collections::BTreeSet;

use pacw_common::models::{AnswerMap, AutofillOverlay, PacketDocument, PacketMetrics};

use crate::status::is_requirement_met;

/// Round half-up to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Required field ids whose fill carries at least one citation
///
/// A field counts only when its fill has a non-missing status, a non-blank
/// value, and one or more citations.
pub fn citation_coverage(overlay: &AutofillOverlay) -> BTreeSet<String> {
    overlay
        .iter()
        .filter(|(_, fill)| fill.is_cited())
        .map(|(field_id, _)| field_id.clone())
        .collect()
}

/// Compute packet metrics from answers and the citation-coverage set
///
/// - filled: required fields with state != missing and non-blank value
/// - cited: required fields present in the coverage set
/// - percentages are `100 * n / total` (0 when total == 0)
/// - `completeness_score` averages the two rates before rounding
pub fn compute_metrics(
    case_id: i64,
    required_field_ids: &[String],
    answers: &AnswerMap,
    cited_fields: &BTreeSet<String>,
) -> PacketMetrics {
    let total = required_field_ids.len();

    let filled = required_field_ids
        .iter()
        .filter(|field_id| {
            answers
                .get(field_id.as_str())
                .map(is_requirement_met)
                .unwrap_or(false)
        })
        .count();

    let cited = required_field_ids
        .iter()
        .filter(|field_id| cited_fields.contains(field_id.as_str()))
        .count();

    let filled_rate = if total > 0 { filled as f64 / total as f64 } else { 0.0 };
    let cited_rate = if total > 0 { cited as f64 / total as f64 } else { 0.0 };

    PacketMetrics {
        case_id,
        required_fields_total: total,
        required_fields_filled: filled,
        required_fields_with_citations: cited,
        required_fields_filled_pct: round2(filled_rate * 100.0),
        required_fields_with_citations_pct: round2(cited_rate * 100.0),
        completeness_score: round2((filled_rate + cited_rate) / 2.0 * 100.0),
    }
}

/// Re-score a persisted packet from its own contents
///
/// Uses the packet's questionnaire section and citation map only, which makes
/// the stored `metrics` independently reproducible after the fact.
pub fn score_packet(packet: &PacketDocument, required_field_ids: &[String]) -> PacketMetrics {
    let answers: AnswerMap = packet
        .questionnaire
        .iter()
        .map(|item| {
            (
                item.field_id.clone(),
                pacw_common::models::Answer {
                    value: item.value.clone(),
                    state: item.state,
                    note: item.note.clone(),
                },
            )
        })
        .collect();

    let cited: BTreeSet<String> = packet
        .citation_map
        .iter()
        .filter(|entry| {
            entry.status != pacw_common::models::FillStatus::Missing
                && entry
                    .value
                    .as_deref()
                    .map(|value| !value.trim().is_empty())
                    .unwrap_or(false)
                && !entry.citations.is_empty()
        })
        .map(|entry| entry.field_id.clone())
        .collect();

    compute_metrics(packet.case_header.case_id, required_field_ids, &answers, &cited)
}
