//! Answer store: one state per questionnaire field
//!
//! The answer map is the source of truth for what is saved. It is always
//! fully populated against the template (no extras, no omissions) and is
//! mutated only by explicit user edits or a full replace from a save echo.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::template::{FieldType, SectionItem, Template};

/// Per-field answer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Missing,
    Filled,
    Verified,
}

/// One questionnaire answer
///
/// Only `None` counts as empty; an empty string is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub value: Option<String>,
    pub state: FieldState,
    pub note: Option<String>,
}

impl Answer {
    /// The default entry for a field with no incoming answer
    pub fn missing() -> Self {
        Self {
            value: None,
            state: FieldState::Missing,
            note: None,
        }
    }

    /// Whether the answer carries a non-blank value
    pub fn has_value(&self) -> bool {
        self.value
            .as_deref()
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Field id → answer, ordered for stable iteration and serialization
pub type AnswerMap = BTreeMap<String, Answer>;

/// Produce a fully-populated answer map from a template and a partial map
///
/// For every field id in template order: copy the incoming entry verbatim if
/// present, otherwise default to `{None, missing, None}`. Field ids absent
/// from the template are dropped silently; the template is authoritative for
/// shape. Idempotent: normalizing an already-normalized map yields an
/// identical map.
pub fn normalize(template: &Template, incoming: &AnswerMap) -> AnswerMap {
    let mut normalized = AnswerMap::new();
    for field_id in template.field_ids() {
        let answer = incoming
            .get(field_id)
            .cloned()
            .unwrap_or_else(Answer::missing);
        normalized.insert(field_id.to_string(), answer);
    }
    normalized
}

/// Required field ids not yet satisfied by the answer map
///
/// A required field is missing when its entry is absent, its state is
/// `missing`, or its trimmed value is empty. This is a client-side mirror for
/// display only; the server's `missing_required_field_ids` stays
/// authoritative for gating.
pub fn missing_required_fields(template: &Template, answers: &AnswerMap) -> Vec<String> {
    template
        .required_field_ids
        .iter()
        .filter(|field_id| {
            answers
                .get(field_id.as_str())
                .map(|answer| answer.state == FieldState::Missing || !answer.has_value())
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}

/// Validate an answer map against a template before saving
///
/// Returns one message per violation: unknown field ids, a `missing` answer
/// carrying a value, a `filled`/`verified` answer without one, or a select
/// answer outside the field's declared options.
pub fn validate_answers(template: &Template, answers: &AnswerMap) -> Vec<String> {
    let mut errors = Vec::new();

    let items: BTreeMap<&str, &SectionItem> = template
        .items()
        .map(|item| (item.field_id.as_str(), item))
        .collect();
    let unknown: Vec<&str> = answers
        .keys()
        .map(|id| id.as_str())
        .filter(|id| !items.contains_key(id))
        .collect();
    if !unknown.is_empty() {
        errors.push(format!("Unknown field IDs: {}", unknown.join(", ")));
    }

    for (field_id, answer) in answers {
        if let Some(item) = items.get(field_id.as_str()) {
            if item.field_type == FieldType::Select && answer.has_value() {
                let value = answer.value.as_deref().unwrap_or("");
                if !item.options.iter().any(|option| option.value == value) {
                    errors.push(format!(
                        "Field '{}' value '{}' is not one of its options",
                        field_id, value
                    ));
                }
            }
        }

        match answer.state {
            FieldState::Missing => {
                if answer.has_value() {
                    errors.push(format!(
                        "Field '{}' is marked missing but has a value",
                        field_id
                    ));
                }
            }
            FieldState::Filled | FieldState::Verified => {
                if !answer.has_value() {
                    errors.push(format!(
                        "Field '{}' must include a value when state is '{}'",
                        field_id,
                        match answer.state {
                            FieldState::Filled => "filled",
                            _ => "verified",
                        }
                    ));
                }
            }
        }
    }

    errors
}
