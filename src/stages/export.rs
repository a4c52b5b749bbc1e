//! Export: fill the chosen form with the confirmed record.
//!
//! Branches on the descriptor. The two PDF-backed cases call the fill-pdf
//! operation and end with a download reference; the URL case drives the
//! remote browser automation and ends with the service's fill report,
//! surfaced unmodified. Failure leaves the stage retryable without
//! re-running anything upstream; the request is re-issued identically.
//!
//! Export is terminal: both outcomes end the session pending a `reset` or a
//! `retreat`.

use crate::error::PipelineError;
use crate::form::FormDescriptor;
use crate::gateway::FormApi;
use crate::outcome::ExportOutcome;
use crate::record::FieldRecord;
use tracing::info;

/// Sub-state of the export stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportState {
    /// Nothing attempted yet, or a retry is about to be issued.
    Idle,
    /// The fill succeeded.
    Done(ExportOutcome),
    /// The fill failed; retry is available.
    Failed { message: String },
}

/// Working state of the export stage.
#[derive(Debug, Default)]
pub struct ExportStage {
    state: ExportState,
}

impl Default for ExportState {
    fn default() -> Self {
        ExportState::Idle
    }
}

impl ExportStage {
    pub fn new() -> Self {
        ExportStage::default()
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn outcome(&self) -> Option<&ExportOutcome> {
        match &self.state {
            ExportState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Issue the fill call for `descriptor` and settle this stage with the
    /// result. The driver wraps this in a controller ticket; on a stale
    /// ticket it drops the whole stage value instead of settling it.
    pub async fn run(
        &mut self,
        api: &dyn FormApi,
        descriptor: &FormDescriptor,
        record: &FieldRecord,
    ) -> Result<ExportOutcome, PipelineError> {
        self.state = ExportState::Idle;

        let result = match descriptor {
            FormDescriptor::Sample { path, .. } => api
                .fill_pdf(path, record)
                .await
                .map(|download_url| ExportOutcome::PdfReady { download_url }),
            FormDescriptor::Uploaded { form_path, .. } => api
                .fill_pdf(form_path, record)
                .await
                .map(|download_url| ExportOutcome::PdfReady { download_url }),
            FormDescriptor::Url { url, .. } => api
                .fill_url(url, record)
                .await
                .map(ExportOutcome::UrlFilled),
        };

        match result {
            Ok(outcome) => {
                info!("Export complete for '{}'", descriptor.display_name());
                self.state = ExportState::Done(outcome.clone());
                Ok(outcome)
            }
            Err(err) => {
                self.state = ExportState::Failed {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }
}
