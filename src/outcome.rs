//! Results of the terminal export stage.
//!
//! The two export paths finish differently: PDF filling hands back a
//! download reference, URL automation hands back a field-by-field report.
//! The report is surfaced to the caller exactly as the service sent it;
//! counts, message, and failed keys are never reinterpreted here.

use serde::{Deserialize, Serialize};

/// What the export stage produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportOutcome {
    /// A filled PDF is ready for download.
    PdfReady { download_url: String },
    /// The online form was filled in a remote browser; the user reviews and
    /// submits it there. The automation leaves the page open for a fixed
    /// review window and never presses submit.
    UrlFilled(UrlFillReport),
}

/// The URL filler's own account of what it managed to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFillReport {
    /// Human-readable status from the service, verbatim.
    pub message: String,
    /// Fields the automation filled successfully.
    #[serde(default)]
    pub filled_count: usize,
    /// Fields it attempted.
    #[serde(default)]
    pub total_fields: usize,
    /// Wire names of the fields it could not place on the page.
    #[serde(default)]
    pub failed_fields: Vec<String>,
}
