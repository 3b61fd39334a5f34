//! Case service HTTP client
//!
//! Typed request/response plumbing for the case service and the patient
//! snapshot service. Every case-scoped call takes an explicit `AuthContext`;
//! a missing credential fails locally before any request is sent. No call is
//! ever retried automatically.

use std::time::Duration;

use pacw_common::models::{
    normalize_fill_status, AuthContext, AutofillOverlay, CaseDocument, CaseQuestionnaire,
    CaseRecord, Citation, DenialAnalysis, DenialLookup, ExportType, FieldFill, PacketExportDetail,
    PacketExportRecord, PatientSnapshot,
};
use pacw_common::config::{EngineConfig, DEFAULT_MAX_UPLOAD_BYTES};
use pacw_common::models::AnswerMap;
use pacw_common::{Error, Result};
use serde::Deserialize;

const USER_AGENT: &str = concat!("PACW/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One fill as reported by the autofill collaborator
///
/// The raw status string is folded into the three overlay statuses on
/// ingestion; inference backends are not trusted to spell them consistently.
#[derive(Debug, Deserialize)]
struct WireFieldFill {
    field_id: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    citations: Vec<Citation>,
}

#[derive(Debug, Deserialize)]
struct AutofillResponse {
    fills: Vec<WireFieldFill>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    patient: serde_json::Value,
}

/// HTTP client for the case service
pub struct CaseServiceClient {
    http_client: reqwest::Client,
    base_url: String,
    max_upload_bytes: u64,
}

impl CaseServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_upload_limit(base_url, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::with_upload_limit(config.api_base_url.as_str(), config.max_upload_bytes)
    }

    fn with_upload_limit(base_url: impl Into<String>, max_upload_bytes: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_upload_bytes,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, ctx: &AuthContext) -> Result<String> {
        if !ctx.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        Ok(format!("Bearer {}", ctx.token()))
    }

    /// Map a response to the error taxonomy, or pass it through on success
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| "Request failed".to_string());

        match status.as_u16() {
            401 => Err(Error::NotAuthenticated),
            404 => Err(Error::NotFound(detail)),
            400 | 403 | 409 | 422 => Err(Error::Validation(detail)),
            code => Err(Error::Transport(format!("HTTP {}: {}", code, detail))),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &AuthContext,
        path: &str,
    ) -> Result<T> {
        let auth = self.bearer(ctx)?;
        tracing::debug!(path = %path, "GET");
        let response = self
            .http_client
            .get(self.url(path))
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid response body: {}", e)))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &AuthContext,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let auth = self.bearer(ctx)?;
        tracing::debug!(method = %method, path = %path, "request");
        let mut request = self
            .http_client
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, auth);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid response body: {}", e)))
    }

    async fn upload<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &AuthContext,
        path: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<T> {
        let auth = self.bearer(ctx)?;
        if bytes.is_empty() {
            return Err(Error::InvalidInput("Uploaded file is empty".to_string()));
        }
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(Error::InvalidInput(format!(
                "Upload exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(path = %path, filename = %filename, "upload");
        let response = self
            .http_client
            .post(self.url(path))
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid response body: {}", e)))
    }

    /// Fetch a case by id
    pub async fn get_case(&self, ctx: &AuthContext, case_id: i64) -> Result<CaseRecord> {
        self.get_json(ctx, &format!("/cases/{}", case_id)).await
    }

    /// Fetch the questionnaire aggregate for a case
    pub async fn get_questionnaire(
        &self,
        ctx: &AuthContext,
        case_id: i64,
    ) -> Result<CaseQuestionnaire> {
        self.get_json(ctx, &format!("/cases/{}/questionnaire", case_id))
            .await
    }

    /// Replace the questionnaire answers; the echo is the new local truth
    pub async fn put_questionnaire(
        &self,
        ctx: &AuthContext,
        case_id: i64,
        answers: &AnswerMap,
    ) -> Result<CaseQuestionnaire> {
        let body = serde_json::json!({ "answers": answers });
        self.send_json(
            ctx,
            reqwest::Method::PUT,
            &format!("/cases/{}/questionnaire", case_id),
            Some(&body),
        )
        .await
    }

    /// Attest the case questionnaire (server records timestamp and actor)
    pub async fn attest(&self, ctx: &AuthContext, case_id: i64) -> Result<CaseQuestionnaire> {
        self.send_json(
            ctx,
            reqwest::Method::POST,
            &format!("/cases/{}/attest", case_id),
            None,
        )
        .await
    }

    /// List a case's stored documents
    pub async fn list_documents(
        &self,
        ctx: &AuthContext,
        case_id: i64,
    ) -> Result<Vec<CaseDocument>> {
        self.get_json(ctx, &format!("/cases/{}/documents", case_id))
            .await
    }

    /// Upload an evidence document (binary + filename)
    pub async fn upload_document(
        &self,
        ctx: &AuthContext,
        case_id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<CaseDocument> {
        self.upload(
            ctx,
            &format!("/cases/{}/documents/upload", case_id),
            filename,
            bytes,
        )
        .await
    }

    /// Run autofill over the case's documents; replaces the overlay wholesale
    pub async fn run_autofill(&self, ctx: &AuthContext, case_id: i64) -> Result<AutofillOverlay> {
        let response: AutofillResponse = self
            .send_json(
                ctx,
                reqwest::Method::POST,
                &format!("/cases/{}/autofill/run", case_id),
                None,
            )
            .await?;
        Ok(Self::overlay_from_wire(response))
    }

    /// Fetch the latest autofill run; no run yet yields an empty overlay
    pub async fn get_autofill(&self, ctx: &AuthContext, case_id: i64) -> Result<AutofillOverlay> {
        match self
            .get_json::<AutofillResponse>(ctx, &format!("/cases/{}/autofill", case_id))
            .await
        {
            Ok(response) => Ok(Self::overlay_from_wire(response)),
            Err(Error::NotFound(_)) => Ok(AutofillOverlay::new()),
            Err(e) => Err(e),
        }
    }

    fn overlay_from_wire(response: AutofillResponse) -> AutofillOverlay {
        response
            .fills
            .into_iter()
            .map(|fill| {
                let status =
                    normalize_fill_status(fill.status.as_deref(), &fill.value, fill.confidence);
                (
                    fill.field_id,
                    FieldFill {
                        value: fill.value,
                        confidence: fill.confidence,
                        status,
                        citations: fill.citations,
                    },
                )
            })
            .collect()
    }

    /// Fetch the denial analysis as a tagged lookup
    ///
    /// Not-found is expected (a case without a denial letter) and comes back
    /// as `Absent`; transport failures come back as `Failed` so callers can
    /// surface them without touching the appeal gate.
    pub async fn get_denial(&self, ctx: &AuthContext, case_id: i64) -> Result<DenialLookup> {
        // Missing credentials stay a hard precondition failure.
        self.bearer(ctx)?;

        match self
            .get_json::<DenialAnalysis>(ctx, &format!("/cases/{}/denial", case_id))
            .await
        {
            Ok(analysis) => Ok(DenialLookup::Found(analysis)),
            Err(Error::NotFound(_)) => Ok(DenialLookup::Absent),
            Err(Error::Transport(reason)) => {
                tracing::warn!(case_id, reason = %reason, "Denial lookup failed");
                Ok(DenialLookup::Failed(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Upload a denial letter; the service parses it into a fresh analysis
    pub async fn upload_denial_letter(
        &self,
        ctx: &AuthContext,
        case_id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<DenialAnalysis> {
        self.upload(
            ctx,
            &format!("/cases/{}/denial/upload", case_id),
            filename,
            bytes,
        )
        .await
    }

    /// List a case's export records
    pub async fn list_exports(
        &self,
        ctx: &AuthContext,
        case_id: i64,
    ) -> Result<Vec<PacketExportRecord>> {
        self.get_json(ctx, &format!("/cases/{}/exports", case_id))
            .await
    }

    /// Generate a new export; one-shot, producing a new immutable artifact
    pub async fn generate_export(
        &self,
        ctx: &AuthContext,
        case_id: i64,
        export_type: ExportType,
    ) -> Result<PacketExportDetail> {
        let body = serde_json::json!({ "export_type": export_type });
        self.send_json(
            ctx,
            reqwest::Method::POST,
            &format!("/cases/{}/exports/generate", case_id),
            Some(&body),
        )
        .await
    }

    /// Fetch one export's full detail (packet + binary rendition)
    pub async fn get_export(
        &self,
        ctx: &AuthContext,
        case_id: i64,
        export_id: i64,
    ) -> Result<PacketExportDetail> {
        self.get_json(ctx, &format!("/cases/{}/exports/{}", case_id, export_id))
            .await
    }

    /// Fetch the clinical snapshot shown alongside the workspace
    pub async fn get_patient_snapshot(
        &self,
        ctx: &AuthContext,
        patient_id: &str,
    ) -> Result<PatientSnapshot> {
        let response: SnapshotResponse = self
            .get_json(ctx, &format!("/fhir/patients/{}/snapshot", patient_id))
            .await?;
        Ok(PatientSnapshot {
            patient_id: patient_id.to_string(),
            patient: response.patient,
        })
    }
}
