//! Server-derived questionnaire aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::AnswerMap;
use super::template::{EvidenceChecklistItem, Section};

/// The case questionnaire as echoed by the case service
///
/// `missing_required_field_ids` is computed by the collaborator and is
/// authoritative; the engine mirrors it for display but never recomputes it
/// for gating. `export_enabled` is likewise a server-side fact (attestation
/// carries audit requirements outside this engine's authority).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseQuestionnaire {
    pub case_id: i64,
    pub template_id: String,
    pub required_field_ids: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub evidence_checklist: Vec<EvidenceChecklistItem>,
    pub answers: AnswerMap,
    pub missing_required_field_ids: Vec<String>,
    pub attested_at: Option<DateTime<Utc>>,
    pub attested_by_email: Option<String>,
    pub export_enabled: bool,
}
