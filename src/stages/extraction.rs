//! Extraction: send the intake documents for OCR and let the user fix the
//! result before it becomes the session record.
//!
//! The stage enters `Loading` on arrival, settles into `Editing` or `Failed`
//! when the remote call resolves, and only ever finishes from `Editing`. The
//! record handed to the controller is the *edited* copy, not the raw service
//! response. Retry from `Failed` re-issues the identical request; the
//! extraction operation is idempotent, so any number of retries is safe.
//!
//! The network call itself is issued by the driver through
//! [`crate::gateway::FormApi::extract`] under a controller ticket; this type
//! only models the sub-state machine, so it stays a pure, synchronous unit.

use crate::controller::StageOutput;
use crate::record::{FieldKey, FieldRecord};
use tracing::warn;

/// Sub-state of the extraction stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionState {
    /// The extraction request is outstanding.
    Loading,
    /// The request failed; `message` is the service's wording when it gave
    /// one. A retry returns to `Loading`.
    Failed { message: String },
    /// The response arrived; the draft is open for in-place edits.
    Editing { draft: FieldRecord },
}

/// Working state of the extraction stage.
#[derive(Debug)]
pub struct ExtractionStage {
    state: ExtractionState,
}

impl ExtractionStage {
    /// A freshly entered stage is already loading; issuing the request is
    /// the stage's sole external side effect.
    pub fn new() -> Self {
        ExtractionStage {
            state: ExtractionState::Loading,
        }
    }

    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ExtractionState::Loading)
    }

    /// Settle the outstanding request with the gateway's result.
    ///
    /// Ignored unless the stage is `Loading`: a settlement that races a
    /// retreat/reset is dropped by the controller ticket before it ever gets
    /// here, and settling twice is a driver bug we tolerate silently.
    pub fn resolve(&mut self, result: Result<FieldRecord, crate::error::PipelineError>) {
        if !self.is_loading() {
            warn!("extraction settlement ignored in state {:?}", self.state);
            return;
        }
        self.state = match result {
            Ok(record) => ExtractionState::Editing { draft: record },
            Err(err) => ExtractionState::Failed {
                message: err.to_string(),
            },
        };
    }

    /// Go back to `Loading` so the driver can re-issue the identical request.
    /// Only meaningful from `Failed`.
    pub fn retrying(&mut self) {
        if matches!(self.state, ExtractionState::Failed { .. }) {
            self.state = ExtractionState::Loading;
        }
    }

    /// Edit one field of the draft. Only possible once the response arrived.
    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>) {
        if let ExtractionState::Editing { draft } = &mut self.state {
            draft.set(key, value);
        }
    }

    /// The editable draft, when available.
    pub fn draft(&self) -> Option<&FieldRecord> {
        match &self.state {
            ExtractionState::Editing { draft } => Some(draft),
            _ => None,
        }
    }

    /// Produce the stage output (the edited record) if editing is open.
    pub fn finish(self) -> Option<StageOutput> {
        match self.state {
            ExtractionState::Editing { draft } => Some(StageOutput::Extraction(draft)),
            _ => None,
        }
    }
}

impl Default for ExtractionStage {
    fn default() -> Self {
        ExtractionStage::new()
    }
}
