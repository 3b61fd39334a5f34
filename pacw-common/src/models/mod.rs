//! Data models for the case workspace engine
//!
//! These are the plain data structures exchanged with the case service,
//! the template registry, and the patient snapshot service.

pub mod answers;
pub mod autofill;
pub mod case;
pub mod denial;
pub mod export;
pub mod questionnaire;
pub mod template;

pub use answers::{missing_required_fields, normalize, validate_answers, Answer, AnswerMap, FieldState};
pub use autofill::{normalize_fill_status, AutofillOverlay, Citation, FieldFill, FillStatus};
pub use case::{Actor, AuthContext, CaseDocument, CaseRecord, CaseStatus, DocumentKind, PatientSnapshot, Role};
pub use denial::{DenialAnalysis, DenialLookup, GapReportItem, GapStatus};
pub use export::{
    ExportType, PacketAnswerItem, PacketCaseHeader, PacketCitationEntry, PacketDocument,
    PacketEvidenceDocument, PacketExportDetail, PacketExportRecord, PacketMetrics,
};
pub use questionnaire::CaseQuestionnaire;
pub use template::{EvidenceChecklistItem, FieldOption, FieldType, Section, SectionItem, Template};
