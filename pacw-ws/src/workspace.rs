//! Workspace loading and reconciliation
//!
//! A workspace load is a fan-out of independent fetches joined and applied
//! to local state together, never incrementally. The denial lookup is
//! isolated inside the join: its absence (or failure) never fails the load.
//! Stale loads are discarded via a generation counter: a response belonging
//! to a superseded load (or a torn-down view) is never applied.
//!
//! Answers are two-tier: `draft` holds in-memory edits, `questionnaire`
//! holds the last server echo. A successful save replaces both from the
//! echo; a failed save leaves the draft untouched for retry. All mutating
//! operations take `&mut self`, so two in-flight actions on the same
//! workspace cannot interleave in safe code.

use pacw_common::models::{
    missing_required_fields, normalize, validate_answers, Actor, Answer, AnswerMap, AuthContext,
    AutofillOverlay, CaseDocument, CaseQuestionnaire, CaseRecord, DenialAnalysis, DenialLookup,
    ExportType, PacketExportDetail, PacketMetrics, PatientSnapshot, Template,
};
use pacw_common::{Error, Result};

use crate::client::CaseServiceClient;
use crate::gate::{AttestationAck, CaseGate};
use crate::ledger::ExportLedger;
use crate::registry::TemplateRegistry;
use crate::score::{citation_coverage, compute_metrics};
use crate::status::{is_requirement_met, resolve_field_status, DisplayStatus};

/// Handle for one in-flight workspace load
///
/// Not Clone: the ticket is consumed when the load result is applied, and
/// only the most recently issued ticket can still apply.
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
}

/// Holder for the currently displayed workspace
///
/// Owns the generation counter that serializes loads: `begin_load` issues a
/// ticket, `apply_load` applies a finished load only if no newer load (or
/// teardown) has superseded it.
#[derive(Debug, Default)]
pub struct WorkspaceState {
    generation: u64,
    current: Option<CaseWorkspace>,
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding any still in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Tear the view down; any in-flight response becomes stale
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Apply a finished load; returns false (and discards) when stale
    pub fn apply_load(&mut self, ticket: LoadTicket, workspace: CaseWorkspace) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale workspace load"
            );
            return false;
        }
        self.current = Some(workspace);
        true
    }

    pub fn current(&self) -> Option<&CaseWorkspace> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CaseWorkspace> {
        self.current.as_mut()
    }
}

/// Load a case workspace as one atomic unit
///
/// The case record resolves the template (unresolvable id is terminal), then
/// the remaining fetches fan out concurrently and join. Only the joined
/// whole is returned; callers apply it in one step via
/// [`WorkspaceState::apply_load`].
pub async fn load_case_workspace(
    client: &CaseServiceClient,
    registry: &TemplateRegistry,
    ctx: &AuthContext,
    case_id: i64,
) -> Result<CaseWorkspace> {
    let case = client.get_case(ctx, case_id).await?;
    let template = registry.resolve(&case.service_line_template_id)?.clone();

    let (questionnaire, documents, overlay, export_records, denial, patient) = tokio::try_join!(
        client.get_questionnaire(ctx, case_id),
        client.list_documents(ctx, case_id),
        client.get_autofill(ctx, case_id),
        client.list_exports(ctx, case_id),
        client.get_denial(ctx, case_id),
        client.get_patient_snapshot(ctx, &case.patient_id),
    )?;

    if let Some(reason) = denial.failure() {
        tracing::warn!(case_id, reason = %reason, "Workspace loaded with failed denial lookup");
    }
    tracing::info!(
        case_id,
        template_id = %template.id,
        documents = documents.len(),
        exports = export_records.len(),
        "Case workspace loaded"
    );

    Ok(CaseWorkspace::assemble(
        case,
        template,
        questionnaire,
        documents,
        overlay,
        ExportLedger::from_records(export_records)?,
        denial,
        patient,
    ))
}

/// One case's reconciled workspace state
#[derive(Debug)]
pub struct CaseWorkspace {
    case: CaseRecord,
    template: Template,
    /// Last-confirmed-from-server questionnaire echo
    questionnaire: CaseQuestionnaire,
    /// In-memory draft edits, held until an explicit save
    draft: AnswerMap,
    overlay: AutofillOverlay,
    documents: Vec<CaseDocument>,
    denial: DenialLookup,
    exports: ExportLedger,
    patient: PatientSnapshot,
    gate: CaseGate,
}

impl CaseWorkspace {
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        case: CaseRecord,
        template: Template,
        questionnaire: CaseQuestionnaire,
        documents: Vec<CaseDocument>,
        overlay: AutofillOverlay,
        exports: ExportLedger,
        denial: DenialLookup,
        patient: PatientSnapshot,
    ) -> Self {
        let draft = normalize(&template, &questionnaire.answers);
        let gate = CaseGate::new(&questionnaire, &denial);
        Self {
            case,
            template,
            questionnaire,
            draft,
            overlay,
            documents,
            denial,
            exports,
            patient,
            gate,
        }
    }

    pub fn case(&self) -> &CaseRecord {
        &self.case
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn questionnaire(&self) -> &CaseQuestionnaire {
        &self.questionnaire
    }

    pub fn draft_answers(&self) -> &AnswerMap {
        &self.draft
    }

    pub fn overlay(&self) -> &AutofillOverlay {
        &self.overlay
    }

    pub fn documents(&self) -> &[CaseDocument] {
        &self.documents
    }

    pub fn denial(&self) -> Option<&DenialAnalysis> {
        self.denial.analysis()
    }

    /// A failed denial lookup's reason, surfaced without affecting gating
    pub fn denial_error(&self) -> Option<&str> {
        self.denial.failure()
    }

    pub fn exports(&self) -> &ExportLedger {
        &self.exports
    }

    pub fn patient(&self) -> &PatientSnapshot {
        &self.patient
    }

    pub fn gate(&self) -> &CaseGate {
        &self.gate
    }

    /// Resolved display status per field, in template order
    pub fn field_statuses(&self) -> Vec<(String, DisplayStatus)> {
        self.template
            .field_ids()
            .into_iter()
            .map(|field_id| {
                let answer = self.draft.get(field_id).cloned().unwrap_or_else(Answer::missing);
                let status = resolve_field_status(&answer, self.overlay.get(field_id));
                (field_id.to_string(), status)
            })
            .collect()
    }

    /// Requirements checklist: required field id → strictly complete
    pub fn requirements_checklist(&self) -> Vec<(String, bool)> {
        self.template
            .required_field_ids
            .iter()
            .map(|field_id| {
                let met = self
                    .draft
                    .get(field_id)
                    .map(is_requirement_met)
                    .unwrap_or(false);
                (field_id.clone(), met)
            })
            .collect()
    }

    /// Required fields the draft still leaves unsatisfied (display mirror)
    pub fn draft_missing_required(&self) -> Vec<String> {
        missing_required_fields(&self.template, &self.draft)
    }

    /// Live metrics over the draft and overlay (export metrics are the
    /// server-persisted ones; this is the preview)
    pub fn current_metrics(&self) -> PacketMetrics {
        compute_metrics(
            self.case.id,
            &self.questionnaire.required_field_ids,
            &self.draft,
            &citation_coverage(&self.overlay),
        )
    }

    /// Record a user edit in the draft tier
    pub fn edit_answer(&mut self, field_id: &str, answer: Answer) -> Result<()> {
        if !self.draft.contains_key(field_id) {
            return Err(Error::InvalidInput(format!(
                "Unknown field id '{}'",
                field_id
            )));
        }
        self.draft.insert(field_id.to_string(), answer);
        Ok(())
    }

    /// Whether the draft has diverged from the last server echo
    pub fn has_unsaved_edits(&self) -> bool {
        self.draft != normalize(&self.template, &self.questionnaire.answers)
    }

    /// Save the draft: full replace from the server echo on success
    ///
    /// On failure the draft is left untouched for retry; no optimistic merge
    /// happens in either direction.
    pub async fn save_answers(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
    ) -> Result<()> {
        let errors = validate_answers(&self.template, &self.draft);
        if !errors.is_empty() {
            return Err(Error::Validation(errors.join("; ")));
        }

        let echo = client
            .put_questionnaire(ctx, self.case.id, &self.draft)
            .await?;
        self.apply_questionnaire_echo(echo);
        Ok(())
    }

    /// Run autofill; the overlay is replaced wholesale and the answer store
    /// (verified answers included) is never touched
    pub async fn run_autofill(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
    ) -> Result<()> {
        let overlay = client.run_autofill(ctx, self.case.id).await?;
        tracing::info!(case_id = self.case.id, fills = overlay.len(), "Autofill overlay replaced");
        self.overlay = overlay;
        Ok(())
    }

    /// Attest the questionnaire
    ///
    /// The gate predicate is checked first with the actor and a fresh
    /// acknowledgment; a late server-side rejection is authoritative and is
    /// returned without retry or local mutation.
    pub async fn attest(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
        actor: &Actor,
        ack: AttestationAck,
    ) -> Result<()> {
        self.gate.authorize_attestation(actor, &ack)?;

        let echo = client.attest(ctx, self.case.id).await?;
        tracing::info!(case_id = self.case.id, actor = %actor.email, "Case attested");
        self.apply_questionnaire_echo(echo);
        Ok(())
    }

    /// Upload an evidence document and record it locally
    pub async fn upload_evidence(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<CaseDocument> {
        let document = client
            .upload_document(ctx, self.case.id, filename, bytes)
            .await?;
        self.documents.push(document.clone());
        Ok(document)
    }

    /// Upload a denial letter; the fresh analysis feeds the appeal gate
    pub async fn upload_denial_letter(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let analysis = client
            .upload_denial_letter(ctx, self.case.id, filename, bytes)
            .await?;
        self.denial = DenialLookup::Found(analysis);
        self.gate.apply_denial(&self.denial);
        Ok(())
    }

    /// Re-fetch the denial analysis; a failure surfaces without gating
    pub async fn refresh_denial(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
    ) -> Result<()> {
        let lookup = client.get_denial(ctx, self.case.id).await?;
        self.gate.apply_denial(&lookup);
        self.denial = lookup;
        Ok(())
    }

    /// Generate an export packet and append it to the ledger
    ///
    /// The gate is checked per export type before the request. Either the
    /// full record lands in the ledger or nothing does; answers and overlay
    /// are never mutated by export generation.
    pub async fn generate_export(
        &mut self,
        client: &CaseServiceClient,
        ctx: &AuthContext,
        export_type: ExportType,
    ) -> Result<PacketExportDetail> {
        match export_type {
            ExportType::Initial => {
                if !self.gate.initial_export_permitted() {
                    return Err(Error::Validation(
                        "Clinician attestation is required before export".to_string(),
                    ));
                }
            }
            ExportType::Appeal => {
                if !self.gate.appeal_export_permitted() {
                    return Err(Error::Validation(
                        "Appeal export requires an attested case and an uploaded denial letter"
                            .to_string(),
                    ));
                }
            }
        }

        let detail = client
            .generate_export(ctx, self.case.id, export_type)
            .await?;
        self.exports.record_detail(&detail)?;
        tracing::info!(
            case_id = self.case.id,
            export_id = detail.export_id,
            completeness = detail.metrics.completeness_score,
            "Export recorded"
        );
        Ok(detail)
    }

    /// Apply a save/attest echo: replace confirmed state, renormalize the
    /// draft from it, and move the gate monotonically
    fn apply_questionnaire_echo(&mut self, echo: CaseQuestionnaire) {
        self.draft = normalize(&self.template, &echo.answers);
        self.gate.apply_questionnaire(&echo);
        self.questionnaire = echo;
    }
}
