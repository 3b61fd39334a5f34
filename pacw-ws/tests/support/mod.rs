//! In-process mock case service for integration tests
//!
//! Serves the same wire shapes the engine's client expects, with knobs for
//! failing the next save and for seeding a denial analysis.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use pacw_common::models::{
    missing_required_fields, normalize, Answer, AnswerMap, CaseQuestionnaire, CaseRecord,
    CaseStatus, DenialAnalysis, ExportType, FieldOption, FieldState, FieldType, PacketAnswerItem,
    PacketCaseHeader, PacketDocument, PacketExportDetail, PacketMetrics, Template,
};
use pacw_common::models::template::{Questionnaire, Section, SectionItem};

pub struct ServerState {
    pub template: Template,
    pub case: CaseRecord,
    pub answers: AnswerMap,
    pub attested_at: Option<chrono::DateTime<Utc>>,
    pub attested_by_email: Option<String>,
    pub export_enabled: bool,
    pub autofill_fills: Option<Value>,
    pub denial: Option<DenialAnalysis>,
    pub exports: Vec<PacketExportDetail>,
    pub export_seq: i64,
    pub fail_next_save: bool,
}

pub type SharedState = Arc<Mutex<ServerState>>;

pub struct MockCaseService {
    pub state: SharedState,
    pub base_url: String,
}

pub fn test_template() -> Template {
    Template {
        id: "tpl-lumbar-mri".to_string(),
        label: "Lumbar MRI".to_string(),
        questionnaire: Questionnaire {
            sections: vec![Section {
                id: "clinical".to_string(),
                title: "Clinical".to_string(),
                description: String::new(),
                items: vec![
                    SectionItem {
                        field_id: "dx".to_string(),
                        label: "Primary diagnosis".to_string(),
                        field_type: FieldType::Text,
                        required: true,
                        placeholder: None,
                        options: Vec::new(),
                    },
                    SectionItem {
                        field_id: "duration".to_string(),
                        label: "Symptom duration (weeks)".to_string(),
                        field_type: FieldType::Text,
                        required: true,
                        placeholder: None,
                        options: Vec::new(),
                    },
                    SectionItem {
                        field_id: "neuro_deficit".to_string(),
                        label: "Neurologic deficit".to_string(),
                        field_type: FieldType::Select,
                        required: false,
                        placeholder: None,
                        options: vec![
                            FieldOption {
                                label: "Yes".to_string(),
                                value: "yes".to_string(),
                            },
                            FieldOption {
                                label: "No".to_string(),
                                value: "no".to_string(),
                            },
                        ],
                    },
                ],
            }],
        },
        required_field_ids: vec!["dx".to_string(), "duration".to_string()],
        evidence_checklist: Vec::new(),
    }
}

fn test_case() -> CaseRecord {
    CaseRecord {
        id: 42,
        patient_id: "pat-007".to_string(),
        payer_label: "Acme Health".to_string(),
        service_line_template_id: "tpl-lumbar-mri".to_string(),
        status: CaseStatus::Draft,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_denial_analysis() -> DenialAnalysis {
    DenialAnalysis {
        case_id: 42,
        denial_document_id: 9,
        reasons: vec!["Medical necessity not established".to_string()],
        missing_items: vec!["Updated clinical note".to_string()],
        gap_report: Vec::new(),
        reference_id: Some("REF-2026-113".to_string()),
        deadline_text: Some("2026-09-30".to_string()),
        citations: Vec::new(),
        appeal_letter_draft: Some("Appeal Request".to_string()),
    }
}

fn questionnaire_json(state: &ServerState) -> Value {
    let answers = normalize(&state.template, &state.answers);
    let questionnaire = CaseQuestionnaire {
        case_id: state.case.id,
        template_id: state.template.id.clone(),
        required_field_ids: state.template.required_field_ids.clone(),
        sections: state.template.questionnaire.sections.clone(),
        evidence_checklist: state.template.evidence_checklist.clone(),
        missing_required_field_ids: missing_required_fields(&state.template, &answers),
        answers,
        attested_at: state.attested_at,
        attested_by_email: state.attested_by_email.clone(),
        export_enabled: state.export_enabled,
    };
    serde_json::to_value(&questionnaire).unwrap()
}

fn error_json(detail: &str) -> Json<Value> {
    Json(json!({ "detail": detail }))
}

async fn get_case(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().await;
    Json(serde_json::to_value(&state.case).unwrap())
}

async fn get_questionnaire(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().await;
    Json(questionnaire_json(&state))
}

async fn put_questionnaire(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    if state.fail_next_save {
        state.fail_next_save = false;
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            error_json("case service unavailable"),
        ));
    }

    let incoming: AnswerMap = serde_json::from_value(body["answers"].clone())
        .map_err(|e| (StatusCode::BAD_REQUEST, error_json(&e.to_string())))?;
    state.answers = normalize(&state.template, &incoming);
    // The service clears attestation on save; the engine keeps its own
    // recorded attestation monotonic regardless.
    state.attested_at = None;
    state.attested_by_email = None;
    state.export_enabled = false;
    Ok(Json(questionnaire_json(&state)))
}

async fn attest(
    State(state): State<SharedState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    let answers = normalize(&state.template, &state.answers);
    let missing = missing_required_fields(&state.template, &answers);
    if !missing.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_json(&format!(
                "Required fields must be completed before attestation: {}",
                missing.join(", ")
            )),
        ));
    }
    state.attested_at = Some(Utc::now());
    state.attested_by_email = Some("doc@clinic.example".to_string());
    state.export_enabled = true;
    Ok(Json(questionnaire_json(&state)))
}

async fn list_documents() -> Json<Value> {
    Json(json!([]))
}

async fn get_autofill(
    State(state): State<SharedState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let state = state.lock().await;
    match &state.autofill_fills {
        Some(fills) => Ok(Json(json!({ "fills": fills }))),
        None => Err((StatusCode::NOT_FOUND, error_json("No autofill run yet"))),
    }
}

async fn run_autofill(State(state): State<SharedState>) -> Json<Value> {
    let mut state = state.lock().await;
    let fills = json!([
        {
            "field_id": "dx",
            "value": "Lumbar radiculopathy",
            "confidence": 0.92,
            "status": "autofilled",
            "citations": [
                {"doc_id": 1, "page": 1, "start": 120, "end": 160,
                 "excerpt": "primary diagnosis: lumbar radiculopathy"}
            ]
        },
        {
            "field_id": "duration",
            "value": "8",
            "confidence": 0.55,
            "status": "autofilled",
            "citations": []
        },
        {
            "field_id": "neuro_deficit",
            "value": "",
            "confidence": 0.0,
            "status": "missing",
            "citations": []
        }
    ]);
    state.autofill_fills = Some(fills.clone());
    Json(json!({ "fills": fills }))
}

async fn get_denial(
    State(state): State<SharedState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let state = state.lock().await;
    match &state.denial {
        Some(denial) => Ok(Json(serde_json::to_value(denial).unwrap())),
        None => Err((StatusCode::NOT_FOUND, error_json("No denial letter uploaded"))),
    }
}

async fn upload_denial(State(state): State<SharedState>) -> Json<Value> {
    let mut state = state.lock().await;
    let analysis = test_denial_analysis();
    state.denial = Some(analysis.clone());
    Json(serde_json::to_value(&analysis).unwrap())
}

fn packet_from_state(state: &ServerState, export_type: ExportType) -> PacketDocument {
    let answers = normalize(&state.template, &state.answers);
    PacketDocument {
        case_header: PacketCaseHeader {
            case_id: state.case.id,
            patient_id: state.case.patient_id.clone(),
            payer_label: state.case.payer_label.clone(),
            service_line_template_id: state.case.service_line_template_id.clone(),
            status: state.case.status,
            created_at: state.case.created_at,
            updated_at: state.case.updated_at,
            export_type,
        },
        questionnaire: answers
            .iter()
            .map(|(field_id, answer)| PacketAnswerItem {
                field_id: field_id.clone(),
                value: answer.value.clone(),
                state: answer.state,
                note: answer.note.clone(),
            })
            .collect(),
        clinical_rationale_draft: String::new(),
        evidence_documents: Vec::new(),
        citation_map: Vec::new(),
        denial: None,
    }
}

async fn generate_export(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    let export_type: ExportType = serde_json::from_value(body["export_type"].clone())
        .map_err(|e| (StatusCode::BAD_REQUEST, error_json(&e.to_string())))?;

    if state.attested_at.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_json("Clinician attestation is required before export"),
        ));
    }
    if export_type == ExportType::Appeal && state.denial.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_json("Appeal export requires an uploaded denial letter"),
        ));
    }

    state.export_seq += 1;
    let detail = PacketExportDetail {
        export_id: state.export_seq,
        case_id: state.case.id,
        export_type,
        metrics: PacketMetrics {
            case_id: state.case.id,
            required_fields_total: 2,
            required_fields_filled: 2,
            required_fields_with_citations: 1,
            required_fields_filled_pct: 100.0,
            required_fields_with_citations_pct: 50.0,
            completeness_score: 75.0,
        },
        packet: packet_from_state(&state, export_type),
        pdf_base64: "JVBERi0xLjQ=".to_string(),
        created_at: Utc::now(),
    };
    state.exports.push(detail.clone());
    Ok(Json(serde_json::to_value(&detail).unwrap()))
}

async fn list_exports(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().await;
    let records: Vec<Value> = state
        .exports
        .iter()
        .map(|detail| serde_json::to_value(detail.record()).unwrap())
        .collect();
    Json(Value::Array(records))
}

async fn get_export(
    State(state): State<SharedState>,
    Path((_case_id, export_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let state = state.lock().await;
    state
        .exports
        .iter()
        .find(|detail| detail.export_id == export_id)
        .map(|detail| Json(serde_json::to_value(detail).unwrap()))
        .ok_or((StatusCode::NOT_FOUND, error_json("Export not found")))
}

async fn get_snapshot() -> Json<Value> {
    Json(json!({
        "patient": {
            "resourceType": "Patient",
            "name": [{"given": ["Alex"], "family": "Rivera"}]
        }
    }))
}

async fn upload_document(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().await;
    Json(json!({
        "id": 501,
        "filename": "clinical-note.pdf",
        "content_type": "application/pdf",
        "document_kind": "evidence",
        "snippets": [],
        "created_at": state.case.created_at
    }))
}

impl MockCaseService {
    /// Start the mock on an ephemeral port
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start the mock after adjusting the seeded state
    pub async fn start_with(seed: impl FnOnce(&mut ServerState)) -> Self {
        let mut initial = ServerState {
            template: test_template(),
            case: test_case(),
            answers: AnswerMap::new(),
            attested_at: None,
            attested_by_email: None,
            export_enabled: false,
            autofill_fills: None,
            denial: None,
            exports: Vec::new(),
            export_seq: 100,
            fail_next_save: false,
        };
        seed(&mut initial);
        let state: SharedState = Arc::new(Mutex::new(initial));

        let app = Router::new()
            .route("/cases/:id", get(get_case))
            .route("/cases/:id/questionnaire", put(put_questionnaire).get(get_questionnaire))
            .route("/cases/:id/attest", post(attest))
            .route("/cases/:id/documents", get(list_documents))
            .route("/cases/:id/documents/upload", post(upload_document))
            .route("/cases/:id/autofill", get(get_autofill))
            .route("/cases/:id/autofill/run", post(run_autofill))
            .route("/cases/:id/denial", get(get_denial))
            .route("/cases/:id/denial/upload", post(upload_denial))
            .route("/cases/:id/exports", get(list_exports))
            .route("/cases/:id/exports/generate", post(generate_export))
            .route("/cases/:id/exports/:export_id", get(get_export))
            .route("/fhir/patients/:patient_id/snapshot", get(get_snapshot))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }
}

/// Convenience answer constructor
pub fn answer(value: Option<&str>, state: FieldState) -> Answer {
    Answer {
        value: value.map(String::from),
        state,
        note: None,
    }
}
