//! Export artifacts: packet document, metrics, record and detail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::FieldState;
use super::autofill::{Citation, FillStatus};
use super::case::CaseStatus;

/// Export packet flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Initial,
    Appeal,
}

/// Completeness and citation-coverage metrics, persisted at generation time
///
/// Reproducible from the packet contents plus the required-field list alone,
/// so an export can be audited after the fact independent of live UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketMetrics {
    pub case_id: i64,
    pub required_fields_total: usize,
    pub required_fields_filled: usize,
    pub required_fields_with_citations: usize,
    pub required_fields_filled_pct: f64,
    pub required_fields_with_citations_pct: f64,
    pub completeness_score: f64,
}

/// Case header block of a packet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketCaseHeader {
    pub case_id: i64,
    pub patient_id: String,
    pub payer_label: String,
    pub service_line_template_id: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub export_type: ExportType,
}

/// One questionnaire answer as persisted in a packet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketAnswerItem {
    pub field_id: String,
    pub value: Option<String>,
    pub state: FieldState,
    pub note: Option<String>,
}

/// One evidence document reference in a packet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketEvidenceDocument {
    pub document_id: i64,
    pub filename: String,
    pub content_type: String,
    pub document_kind: String,
    #[serde(default)]
    pub snippets: Vec<String>,
}

/// One citation-map entry: the fill backing a field, with its citations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketCitationEntry {
    pub field_id: String,
    pub value: Option<String>,
    pub status: FillStatus,
    pub confidence: f64,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Denial block included in appeal packets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketDenialBlock {
    pub reasons: Vec<String>,
    pub missing_items: Vec<String>,
    pub reference_id: Option<String>,
    pub deadline_text: Option<String>,
    pub appeal_letter_draft: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// The exportable packet: questionnaire answers, citations, and case metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketDocument {
    pub case_header: PacketCaseHeader,
    pub questionnaire: Vec<PacketAnswerItem>,
    #[serde(default)]
    pub clinical_rationale_draft: String,
    #[serde(default)]
    pub evidence_documents: Vec<PacketEvidenceDocument>,
    #[serde(default)]
    pub citation_map: Vec<PacketCitationEntry>,
    #[serde(default)]
    pub denial: Option<PacketDenialBlock>,
}

/// A generated export, as listed by the case service
///
/// Records are append-only and immutable once created; `export_id` is unique
/// and assigned by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketExportRecord {
    pub export_id: i64,
    pub case_id: i64,
    pub export_type: ExportType,
    pub metrics: PacketMetrics,
    pub created_at: DateTime<Utc>,
}

/// Full export artifact: record fields plus packet and binary rendition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketExportDetail {
    pub export_id: i64,
    pub case_id: i64,
    pub export_type: ExportType,
    pub metrics: PacketMetrics,
    pub packet: PacketDocument,
    /// PDF rendition, base64-encoded for transport
    pub pdf_base64: String,
    pub created_at: DateTime<Utc>,
}

impl PacketExportDetail {
    /// The list-level record for this export
    pub fn record(&self) -> PacketExportRecord {
        PacketExportRecord {
            export_id: self.export_id,
            case_id: self.case_id,
            export_type: self.export_type,
            metrics: self.metrics.clone(),
            created_at: self.created_at,
        }
    }
}
