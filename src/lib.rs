//! # formfill
//!
//! Turn scanned identity documents into a completed form: a downloadable
//! filled PDF, or an auto-filled online form left open for review.
//!
//! ## Why this crate?
//!
//! Copying the same eleven personal-data fields from an Aadhaar card or
//! passport scan into yet another application form is slow and error-prone.
//! formfill sequences the whole job as a six-stage pipeline over a remote
//! extraction/filling service, with one canonical record threaded through
//! every stage so nothing the user typed is ever lost to navigation.
//!
//! ## Pipeline Overview
//!
//! ```text
//! documents
//!  │
//!  ├─ 1. Intake         collect scans + pick the document type
//!  ├─ 2. Extraction     remote OCR, then fix the result in place
//!  ├─ 3. FormSelection  sample catalog / upload a PDF / type a URL
//!  ├─ 4. FieldMapping   adjust any of the eleven fields (local)
//!  ├─ 5. Review         final confirmation (local)
//!  └─ 6. Export         fill-pdf → download link, or fill-url → report
//! ```
//!
//! The [`controller::PipelineController`] owns the session and is the only
//! thing allowed to mutate it: stages hand it typed outputs, it applies the
//! stage's replace-style merge and moves the stage pointer. Backward jumps
//! never discard data, and the record at export is always exactly the last
//! record a stage produced, never a merge of old and new values.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formfill::{
//!     DocumentHandle, DocumentType, FormDescriptor, GatewayConfig, HttpGateway,
//!     PipelineController, StageOutput,
//! };
//! use formfill::gateway::FormApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpGateway::new(GatewayConfig::default())?;
//!     let mut pipeline = PipelineController::new();
//!
//!     let documents = vec![DocumentHandle::from_path("aadhaar-front.jpg")?];
//!     pipeline.advance(StageOutput::Intake {
//!         documents,
//!         document_type: DocumentType::Aadhaar,
//!     })?;
//!
//!     let ticket = pipeline.begin_remote()?;
//!     let extracted = api
//!         .extract(pipeline.session().documents(), DocumentType::Aadhaar)
//!         .await;
//!     if pipeline.settle_remote(&ticket) {
//!         pipeline.advance(StageOutput::Extraction(extracted?))?;
//!     }
//!
//!     pipeline.advance(StageOutput::FormSelection(FormDescriptor::url(
//!         "https://example.com/apply",
//!     )?))?;
//!     // ... FieldMapping, Review, then stages::export::ExportStage::run
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod gateway;
pub mod outcome;
pub mod record;
pub mod session;
pub mod stages;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use controller::{OperationTicket, PipelineController, StageOutput};
pub use error::PipelineError;
pub use form::{FormDescriptor, SampleForm};
pub use gateway::{FormApi, HttpGateway};
pub use outcome::{ExportOutcome, UrlFillReport};
pub use record::{FieldKey, FieldRecord, InputKind};
pub use session::{DocumentHandle, DocumentType, Session, Stage};
