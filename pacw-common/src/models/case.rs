//! Case record, actors, documents, and the patient display snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Case lifecycle status as reported by the case service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Draft,
    InReview,
    Submitted,
    Denied,
}

/// A prior-authorization case as fetched from the case service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: i64,
    pub patient_id: String,
    pub payer_label: String,
    pub service_line_template_id: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User role; only clinicians may attest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Clinician,
    Admin,
}

/// The acting user for gate checks
#[derive(Debug, Clone)]
pub struct Actor {
    pub email: String,
    pub role: Role,
}

/// Capability token passed explicitly into every case-scoped call
///
/// There is no ambient session lookup; callers construct the context once per
/// credential and hand it to each operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// The bearer token value; empty means not authenticated
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// What a stored document was uploaded as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Evidence,
    DenialLetter,
}

/// A stored case document (text extraction happens service-side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocument {
    pub id: i64,
    pub filename: String,
    pub content_type: String,
    pub document_kind: DocumentKind,
    #[serde(default)]
    pub snippets: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Clinical snapshot for display context only; never reconciled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub patient_id: String,
    /// Raw FHIR Patient resource as returned by the snapshot service
    pub patient: serde_json::Value,
}

impl PatientSnapshot {
    /// Best-effort display name from the FHIR name array
    pub fn display_name(&self) -> Option<String> {
        let name = self.patient.get("name")?.as_array()?.first()?;

        if let Some(text) = name.get("text").and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }

        let given = name
            .get("given")
            .and_then(|v| v.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let family = name
            .get("family")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let full = format!("{} {}", given.trim(), family.trim());
        let full = full.trim();
        if full.is_empty() {
            None
        } else {
            Some(full.to_string())
        }
    }
}
