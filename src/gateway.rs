//! The network boundary: every remote operation the pipeline can issue.
//!
//! Stage logic never talks HTTP. It calls [`FormApi`], a small async trait
//! with one method per remote operation, and receives either the typed
//! payload or a [`PipelineError::RemoteOperationFailed`]. All transport
//! errors, non-2xx statuses, and `{success: false}` envelopes are collapsed
//! into that single error kind so the controller's taxonomy is the only
//! error surface stages handle. HTTP status codes are not interpreted beyond
//! success/failure.
//!
//! [`HttpGateway`] is the production implementation over reqwest. Tests
//! substitute their own `FormApi` (see `tests/pipeline.rs`) and never touch
//! the network.

use crate::config::GatewayConfig;
use crate::error::PipelineError;
use crate::form::SampleForm;
use crate::outcome::UrlFillReport;
use crate::record::FieldRecord;
use crate::session::{DocumentHandle, DocumentType};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// The remote operations the pipeline depends on.
///
/// Every method is idempotent from the caller's perspective: re-issuing an
/// identical request after a failure accumulates no partial server-side
/// effects the pipeline needs to care about.
#[async_trait]
pub trait FormApi: Send + Sync {
    /// Send the intake documents for OCR/field extraction.
    async fn extract(
        &self,
        documents: &[DocumentHandle],
        document_type: DocumentType,
    ) -> Result<FieldRecord, PipelineError>;

    /// Upload a fillable PDF; returns the server-assigned storage reference.
    async fn upload_form(&self, pdf: &Path) -> Result<String, PipelineError>;

    /// List the pre-registered sample forms.
    async fn list_sample_forms(&self) -> Result<Vec<SampleForm>, PipelineError>;

    /// Fill the referenced PDF with `record`; returns the download reference.
    async fn fill_pdf(
        &self,
        form_path: &str,
        record: &FieldRecord,
    ) -> Result<String, PipelineError>;

    /// Drive the browser automation against `url`; returns its fill report.
    async fn fill_url(
        &self,
        url: &str,
        record: &FieldRecord,
    ) -> Result<UrlFillReport, PipelineError>;
}

// ── Wire payloads ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(rename = "extractedData")]
    extracted_data: FieldRecord,
}

#[derive(Deserialize)]
struct UploadFormResponse {
    #[serde(rename = "formPath")]
    form_path: String,
}

#[derive(Deserialize)]
struct SampleFormsResponse {
    forms: Vec<SampleForm>,
}

#[derive(Deserialize)]
struct FillPdfResponse {
    #[serde(rename = "downloadUrl")]
    download_url: String,
}

// ── Envelope normalization ───────────────────────────────────────────────

/// Accept a `{success: true, …}` envelope or turn anything else into a
/// remote failure carrying the service's own wording when available.
fn unwrap_envelope(body: Value) -> Result<Value, PipelineError> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }
    let message = body
        .get("message")
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    Err(PipelineError::RemoteOperationFailed { message })
}

/// Map an error-status body to a remote failure. FastAPI-style services put
/// their message under `detail`; fall back to the bare status line.
fn status_failure(status: reqwest::StatusCode, body: Option<Value>) -> PipelineError {
    let detail = body.and_then(|v| {
        v.get("detail").map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    });
    PipelineError::RemoteOperationFailed {
        message: Some(detail.unwrap_or_else(|| format!("HTTP {status}"))),
    }
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// [`FormApi`] over HTTP, against the service at
/// [`GatewayConfig::base_url`].
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a gateway from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::remote(e.to_string()))?;
        Ok(HttpGateway { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Await a response, normalize status and envelope, return the body.
    async fn settle(&self, response: reqwest::Response) -> Result<Value, PipelineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(status_failure(status, body));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;
        unwrap_envelope(body)
    }

    fn payload<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, PipelineError> {
        serde_json::from_value(body)
            .map_err(|e| PipelineError::remote(format!("malformed service response: {e}")))
    }
}

#[async_trait]
impl FormApi for HttpGateway {
    async fn extract(
        &self,
        documents: &[DocumentHandle],
        document_type: DocumentType,
    ) -> Result<FieldRecord, PipelineError> {
        info!(
            "Extracting {} document(s) of type {}",
            documents.len(),
            document_type
        );

        let mut form = reqwest::multipart::Form::new().text("documentType", document_type.wire_name());
        for doc in documents {
            let bytes = tokio::fs::read(&doc.path)
                .await
                .map_err(|e| PipelineError::remote(format!("cannot read {}: {e}", doc.file_name)))?;
            form = form.part(
                "documents",
                reqwest::multipart::Part::bytes(bytes).file_name(doc.file_name.clone()),
            );
        }

        let response = self
            .client
            .post(self.endpoint("upload-documents"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;

        let body = self.settle(response).await?;
        let parsed: ExtractResponse = Self::payload(body)?;
        debug!(
            "Extraction returned {} provided field(s)",
            parsed.extracted_data.provided_count()
        );
        Ok(parsed.extracted_data)
    }

    async fn upload_form(&self, pdf: &Path) -> Result<String, PipelineError> {
        let file_name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "form.pdf".to_string());
        info!("Uploading form PDF {file_name}");

        let bytes = tokio::fs::read(pdf)
            .await
            .map_err(|e| PipelineError::remote(format!("cannot read {file_name}: {e}")))?;
        let form = reqwest::multipart::Form::new().part(
            "form",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );

        let response = self
            .client
            .post(self.endpoint("upload-form"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;

        let body = self.settle(response).await?;
        let parsed: UploadFormResponse = Self::payload(body)?;
        Ok(parsed.form_path)
    }

    async fn list_sample_forms(&self) -> Result<Vec<SampleForm>, PipelineError> {
        let response = self
            .client
            .get(self.endpoint("sample-forms"))
            .send()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;

        let body = self.settle(response).await?;
        let parsed: SampleFormsResponse = Self::payload(body)?;
        debug!("Catalog lists {} sample form(s)", parsed.forms.len());
        Ok(parsed.forms)
    }

    async fn fill_pdf(
        &self,
        form_path: &str,
        record: &FieldRecord,
    ) -> Result<String, PipelineError> {
        info!("Filling PDF form at {form_path}");

        let response = self
            .client
            .post(self.endpoint("fill-pdf"))
            .json(&json!({ "formPath": form_path, "data": record }))
            .send()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;

        let body = self.settle(response).await?;
        let parsed: FillPdfResponse = Self::payload(body)?;
        Ok(parsed.download_url)
    }

    async fn fill_url(
        &self,
        url: &str,
        record: &FieldRecord,
    ) -> Result<UrlFillReport, PipelineError> {
        info!("Filling online form at {url}");

        // The filler keeps its browser open for a review window before
        // responding; use the session-length timeout, not the request one.
        let response = self
            .client
            .post(self.endpoint("fill-url"))
            .timeout(Duration::from_secs(self.config.fill_timeout_secs))
            .json(&json!({ "url": url, "data": record }))
            .send()
            .await
            .map_err(|e| PipelineError::remote(e.to_string()))?;

        let body = self.settle(response).await?;
        let report: UrlFillReport = Self::payload(body)?;
        debug!(
            "URL fill: {}/{} fields, {} failed",
            report.filled_count,
            report.total_fields,
            report.failed_fields.len()
        );
        Ok(report)
    }
}
