//! Service-line template shape
//!
//! A template is external, immutable, and resolved by id. It is authoritative
//! for the questionnaire's shape: ordered sections of ordered field items,
//! the required-field id subset, and an informational evidence checklist.

use serde::{Deserialize, Serialize};

/// Questionnaire field input type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Date,
}

/// Option for a select-typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// One questionnaire field item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionItem {
    #[serde(rename = "fieldId")]
    pub field_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

/// Ordered group of field items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<SectionItem>,
}

/// Informational evidence checklist entry (never gates anything)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceChecklistItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Questionnaire body of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub sections: Vec<Section>,
}

/// Service-line template, loaded by id from the template registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub questionnaire: Questionnaire,
    #[serde(rename = "requiredFieldIds", default)]
    pub required_field_ids: Vec<String>,
    #[serde(rename = "evidenceChecklist", default)]
    pub evidence_checklist: Vec<EvidenceChecklistItem>,
}

impl Template {
    /// All field ids in section order
    pub fn field_ids(&self) -> Vec<&str> {
        self.questionnaire
            .sections
            .iter()
            .flat_map(|section| section.items.iter())
            .map(|item| item.field_id.as_str())
            .collect()
    }

    /// Field items in section order
    pub fn items(&self) -> impl Iterator<Item = &SectionItem> {
        self.questionnaire
            .sections
            .iter()
            .flat_map(|section| section.items.iter())
    }
}
