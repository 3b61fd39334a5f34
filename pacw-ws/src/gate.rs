//! Case Gate state machine
//!
//! Governs draft → attestable → attested → export-enabled, plus the
//! orthogonal appeal-export gate. "Attestable" is not a stored flag but a
//! derived predicate over the collaborator-computed missing-required list.
//! `export_enabled` is the server-reported boolean, never inferred locally.
//! Attestation metadata is monotonic: once set it is never cleared by any
//! operation here.

use chrono::{DateTime, Utc};
use pacw_common::models::{Actor, CaseQuestionnaire, DenialLookup, Role};
use pacw_common::{Error, Result};

use crate::reconcile::appeal_eligible;

/// Derived gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Draft,
    Attestable,
    Attested,
}

/// Explicit, freshly-set attestation acknowledgment
///
/// Not persisted anywhere: the value is not Clone and is consumed by the
/// attest action, so it must be re-asserted each session before each attempt.
#[derive(Debug)]
pub struct AttestationAck {
    acknowledged_at: DateTime<Utc>,
}

impl AttestationAck {
    /// Assert the acknowledgment for one attestation attempt
    pub fn acknowledge() -> Self {
        Self {
            acknowledged_at: Utc::now(),
        }
    }

    pub fn acknowledged_at(&self) -> DateTime<Utc> {
        self.acknowledged_at
    }
}

/// The gate over one case's questionnaire aggregate
#[derive(Debug, Clone)]
pub struct CaseGate {
    missing_required_field_ids: Vec<String>,
    attested_at: Option<DateTime<Utc>>,
    attested_by_email: Option<String>,
    export_enabled: bool,
    denial_present: bool,
}

impl CaseGate {
    pub fn new(questionnaire: &CaseQuestionnaire, denial: &DenialLookup) -> Self {
        Self {
            missing_required_field_ids: questionnaire.missing_required_field_ids.clone(),
            attested_at: questionnaire.attested_at,
            attested_by_email: questionnaire.attested_by_email.clone(),
            export_enabled: questionnaire.export_enabled,
            denial_present: appeal_eligible(denial),
        }
    }

    pub fn state(&self) -> GateState {
        if self.attested_at.is_some() {
            GateState::Attested
        } else if self.missing_required_field_ids.is_empty() {
            GateState::Attestable
        } else {
            GateState::Draft
        }
    }

    /// The derived attestability predicate
    pub fn is_attestable(&self) -> bool {
        self.state() == GateState::Attestable
    }

    pub fn attested_at(&self) -> Option<DateTime<Utc>> {
        self.attested_at
    }

    pub fn attested_by_email(&self) -> Option<&str> {
        self.attested_by_email.as_deref()
    }

    pub fn missing_required_field_ids(&self) -> &[String] {
        &self.missing_required_field_ids
    }

    /// Check all attestation preconditions at the moment of action
    ///
    /// Requires a clinician actor, a fresh acknowledgment, the attestability
    /// predicate still true, and no prior attestation (re-attestation is not
    /// permitted; there is no un-attest).
    pub fn authorize_attestation(&self, actor: &Actor, _ack: &AttestationAck) -> Result<()> {
        if actor.role != Role::Clinician {
            return Err(Error::Validation(
                "Only clinician users can attest case packets".to_string(),
            ));
        }
        if self.attested_at.is_some() {
            return Err(Error::Validation(
                "Case is already attested; re-attestation is not permitted".to_string(),
            ));
        }
        if !self.missing_required_field_ids.is_empty() {
            return Err(Error::Validation(format!(
                "Required fields must be completed before attestation: {}",
                self.missing_required_field_ids.join(", ")
            )));
        }
        Ok(())
    }

    /// Initial export permission: exactly the server-reported flag
    pub fn initial_export_permitted(&self) -> bool {
        self.export_enabled
    }

    /// Appeal export needs the initial gate and a present denial analysis
    pub fn appeal_export_permitted(&self) -> bool {
        self.export_enabled && self.denial_present
    }

    /// Apply a fresh questionnaire echo from the server
    ///
    /// Attestation metadata only ever moves from unset to set; a snapshot
    /// with the fields cleared leaves the recorded attestation in place.
    pub fn apply_questionnaire(&mut self, questionnaire: &CaseQuestionnaire) {
        self.missing_required_field_ids = questionnaire.missing_required_field_ids.clone();
        self.export_enabled = questionnaire.export_enabled;
        if self.attested_at.is_none() {
            self.attested_at = questionnaire.attested_at;
            self.attested_by_email = questionnaire.attested_by_email.clone();
        }
    }

    /// Apply a fresh denial lookup; `Failed` leaves the gate untouched
    pub fn apply_denial(&mut self, denial: &DenialLookup) {
        match denial {
            DenialLookup::Found(_) => self.denial_present = true,
            DenialLookup::Absent => self.denial_present = false,
            DenialLookup::Failed(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacw_common::models::{AnswerMap, DenialAnalysis};

    fn questionnaire(missing: &[&str], attested: bool, export_enabled: bool) -> CaseQuestionnaire {
        CaseQuestionnaire {
            case_id: 1,
            template_id: "tpl-test".to_string(),
            required_field_ids: vec!["dx".to_string(), "duration".to_string()],
            sections: Vec::new(),
            evidence_checklist: Vec::new(),
            answers: AnswerMap::new(),
            missing_required_field_ids: missing.iter().map(|s| s.to_string()).collect(),
            attested_at: attested.then(Utc::now),
            attested_by_email: attested.then(|| "doc@clinic.example".to_string()),
            export_enabled,
        }
    }

    fn found_denial() -> DenialLookup {
        DenialLookup::Found(DenialAnalysis {
            case_id: 1,
            denial_document_id: 9,
            reasons: Vec::new(),
            missing_items: Vec::new(),
            gap_report: Vec::new(),
            reference_id: None,
            deadline_text: None,
            citations: Vec::new(),
            appeal_letter_draft: None,
        })
    }

    fn clinician() -> Actor {
        Actor {
            email: "doc@clinic.example".to_string(),
            role: Role::Clinician,
        }
    }

    #[test]
    fn state_derives_from_missing_list_and_attestation() {
        let gate = CaseGate::new(&questionnaire(&["duration"], false, false), &DenialLookup::Absent);
        assert_eq!(gate.state(), GateState::Draft);

        let gate = CaseGate::new(&questionnaire(&[], false, false), &DenialLookup::Absent);
        assert_eq!(gate.state(), GateState::Attestable);

        let gate = CaseGate::new(&questionnaire(&[], true, true), &DenialLookup::Absent);
        assert_eq!(gate.state(), GateState::Attested);
    }

    #[test]
    fn attestation_requires_clinician_role() {
        let gate = CaseGate::new(&questionnaire(&[], false, false), &DenialLookup::Absent);
        let coordinator = Actor {
            email: "coord@clinic.example".to_string(),
            role: Role::Coordinator,
        };
        let result = gate.authorize_attestation(&coordinator, &AttestationAck::acknowledge());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn attestation_blocked_while_required_fields_missing() {
        let gate = CaseGate::new(&questionnaire(&["duration"], false, false), &DenialLookup::Absent);
        let result = gate.authorize_attestation(&clinician(), &AttestationAck::acknowledge());
        match result {
            Err(Error::Validation(message)) => assert!(message.contains("duration")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn re_attestation_is_rejected() {
        let gate = CaseGate::new(&questionnaire(&[], true, true), &DenialLookup::Absent);
        let result = gate.authorize_attestation(&clinician(), &AttestationAck::acknowledge());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn attestation_passes_when_all_preconditions_hold() {
        let gate = CaseGate::new(&questionnaire(&[], false, false), &DenialLookup::Absent);
        assert!(gate
            .authorize_attestation(&clinician(), &AttestationAck::acknowledge())
            .is_ok());
    }

    #[test]
    fn export_permission_is_the_server_flag_verbatim() {
        let gate = CaseGate::new(&questionnaire(&[], true, false), &DenialLookup::Absent);
        assert!(!gate.initial_export_permitted());

        let gate = CaseGate::new(&questionnaire(&[], true, true), &DenialLookup::Absent);
        assert!(gate.initial_export_permitted());
    }

    #[test]
    fn appeal_export_needs_both_gates() {
        let gate = CaseGate::new(&questionnaire(&[], true, true), &DenialLookup::Absent);
        assert!(!gate.appeal_export_permitted());

        let gate = CaseGate::new(&questionnaire(&[], true, true), &found_denial());
        assert!(gate.appeal_export_permitted());

        // Denial present but not export-enabled: appeal stays forbidden.
        let gate = CaseGate::new(&questionnaire(&[], false, false), &found_denial());
        assert!(!gate.appeal_export_permitted());
    }

    #[test]
    fn attestation_is_never_cleared_by_later_snapshots() {
        let mut gate = CaseGate::new(&questionnaire(&[], true, true), &DenialLookup::Absent);
        let recorded = gate.attested_at().unwrap();

        gate.apply_questionnaire(&questionnaire(&["duration"], false, false));
        assert_eq!(gate.attested_at(), Some(recorded));
        assert_eq!(gate.attested_by_email(), Some("doc@clinic.example"));
    }

    #[test]
    fn failed_denial_lookup_leaves_gate_untouched() {
        let mut gate = CaseGate::new(&questionnaire(&[], true, true), &found_denial());
        gate.apply_denial(&DenialLookup::Failed("timeout".to_string()));
        assert!(gate.appeal_export_permitted());

        gate.apply_denial(&DenialLookup::Absent);
        assert!(!gate.appeal_export_permitted());
    }
}
