//! The stage pipeline controller: the only mutator of session state.
//!
//! Stage views are pure transformers: each reads the session, builds its
//! typed [`StageOutput`], and hands it to [`PipelineController::advance`].
//! The controller validates the output against the active stage, applies the
//! stage-specific merge rule, and moves the stage pointer. Back-navigation
//! ([`PipelineController::retreat`]) moves the pointer only; record,
//! descriptor, and documents are untouched, which is what makes backward
//! jumps lossless.
//!
//! ## Replace, don't patch
//!
//! Every stage that can touch the record returns the full next version, not
//! a delta. Wholesale replacement is what lets a user blank a field on
//! purpose: a merge would silently resurrect the old value.
//!
//! ## One remote operation at a time
//!
//! A stage with a network call in flight registers it via
//! [`PipelineController::begin_remote`]; until it settles, `advance` and
//! further `begin_remote` calls fail with `OperationPending`. `retreat` and
//! `reset` are never blocked; they abandon the operation instead, and the
//! abandoned response is detected by [`PipelineController::settle_remote`]
//! returning `false`, at which point the caller must discard it. A stale
//! response can therefore never mutate a session that has moved on.

use crate::error::PipelineError;
use crate::form::FormDescriptor;
use crate::record::FieldRecord;
use crate::session::{DocumentHandle, DocumentType, Session, Stage};
use tracing::{debug, info};

/// The typed output each stage hands to [`PipelineController::advance`].
///
/// Export is terminal and produces no output; there is no variant for it.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Intake: the collected documents and the batch's document type.
    Intake {
        documents: Vec<DocumentHandle>,
        document_type: DocumentType,
    },
    /// Extraction: the user-edited record seeded from the service response.
    Extraction(FieldRecord),
    /// Form selection: the chosen target form.
    FormSelection(FormDescriptor),
    /// Field mapping: the full edited record.
    FieldMapping(FieldRecord),
    /// Review: the confirmed (possibly re-edited) record.
    Review(FieldRecord),
}

impl StageOutput {
    /// The stage that produces this output type.
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::Intake { .. } => Stage::Intake,
            StageOutput::Extraction(_) => Stage::Extraction,
            StageOutput::FormSelection(_) => Stage::FormSelection,
            StageOutput::FieldMapping(_) => Stage::FieldMapping,
            StageOutput::Review(_) => Stage::Review,
        }
    }
}

/// Proof that a remote operation was registered with the controller.
///
/// Hold it across the `await`, then present it to
/// [`PipelineController::settle_remote`]; a `false` answer means the session
/// retreated or reset in the meantime and the response must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTicket {
    stage: Stage,
    generation: u64,
}

/// Owns the [`Session`] and enforces the stage contracts.
#[derive(Debug, Default)]
pub struct PipelineController {
    session: Session,
    pending: Option<Stage>,
    generation: u64,
}

impl PipelineController {
    /// A controller over a fresh, empty session at intake.
    pub fn new() -> Self {
        PipelineController::default()
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The currently active stage.
    pub fn stage(&self) -> Stage {
        self.session.stage
    }

    /// Whether a remote operation for the current stage is outstanding.
    pub fn has_pending_operation(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the active stage's output and move to the next stage.
    ///
    /// # Errors
    /// * [`PipelineError::OperationPending`] — a remote call for the current
    ///   stage has not settled.
    /// * [`PipelineError::InvalidTransition`] — `output` belongs to a
    ///   different stage than the active one (always the case at Export).
    /// * [`PipelineError::MissingPrerequisite`] — required upstream state is
    ///   absent (no documents, no document type, no descriptor).
    pub fn advance(&mut self, output: StageOutput) -> Result<Stage, PipelineError> {
        let stage = self.session.stage;

        if let Some(pending) = self.pending {
            return Err(PipelineError::OperationPending { stage: pending });
        }
        if output.stage() != stage {
            return Err(PipelineError::InvalidTransition {
                stage,
                output: output.stage(),
            });
        }

        match output {
            StageOutput::Intake {
                documents,
                document_type,
            } => {
                if documents.is_empty() {
                    return Err(PipelineError::MissingPrerequisite {
                        stage,
                        detail: "at least one document must be provided".to_string(),
                    });
                }
                self.session.documents = documents;
                self.session.document_type = Some(document_type);
            }
            StageOutput::Extraction(record) => {
                if self.session.documents.is_empty() {
                    return Err(PipelineError::MissingPrerequisite {
                        stage,
                        detail: "no documents were taken in before extraction".to_string(),
                    });
                }
                self.session.record = record;
            }
            StageOutput::FormSelection(descriptor) => {
                self.session.descriptor = Some(descriptor);
            }
            StageOutput::FieldMapping(record) => {
                self.session.record = record;
            }
            StageOutput::Review(record) => {
                if self.session.descriptor.is_none() {
                    return Err(PipelineError::MissingPrerequisite {
                        stage,
                        detail: "no target form selected before export".to_string(),
                    });
                }
                self.session.record = record;
            }
        }

        // Every non-terminal stage has a successor; the match above already
        // rejected outputs at Export.
        let next = stage.next().unwrap_or(stage);
        self.session.stage = next;
        info!("Stage complete: {stage} -> {next}");
        Ok(next)
    }

    /// Move back one stage without touching record, descriptor, or documents.
    ///
    /// Never blocked by a pending operation; the operation is abandoned and
    /// its eventual response will fail [`Self::settle_remote`].
    pub fn retreat(&mut self) -> Result<Stage, PipelineError> {
        let stage = self.session.stage;
        let prev = stage.prev().ok_or(PipelineError::AtInitialStage)?;
        self.abandon_pending();
        self.session.stage = prev;
        info!("Retreated: {stage} -> {prev}");
        Ok(prev)
    }

    /// Reinitialize the whole session: empty state, stage back to intake.
    /// Always succeeds; any pending operation is abandoned.
    pub fn reset(&mut self) {
        self.abandon_pending();
        self.session = Session::new();
        info!("Session reset");
    }

    /// Register a remote operation for the current stage.
    ///
    /// Fails with [`PipelineError::OperationPending`] while another one is
    /// outstanding; concurrent retries are a contract violation, not a
    /// queueing request.
    pub fn begin_remote(&mut self) -> Result<OperationTicket, PipelineError> {
        if let Some(pending) = self.pending {
            return Err(PipelineError::OperationPending { stage: pending });
        }
        let stage = self.session.stage;
        self.pending = Some(stage);
        debug!("Remote operation started for {stage}");
        Ok(OperationTicket {
            stage,
            generation: self.generation,
        })
    }

    /// Settle a previously registered operation.
    ///
    /// Returns `true` when the session is still on the stage that issued the
    /// ticket and has not retreated or reset since; the caller may then apply
    /// the response. Returns `false` for a stale ticket: the response
    /// belongs to an abandoned operation and must be discarded.
    pub fn settle_remote(&mut self, ticket: &OperationTicket) -> bool {
        let current = ticket.generation == self.generation && self.pending == Some(ticket.stage);
        if current {
            self.pending = None;
            debug!("Remote operation settled for {}", ticket.stage);
        } else {
            debug!("Discarding stale remote response for {}", ticket.stage);
        }
        current
    }

    fn abandon_pending(&mut self) {
        if let Some(stage) = self.pending.take() {
            debug!("Abandoning pending remote operation for {stage}");
        }
        self.generation += 1;
    }
}
