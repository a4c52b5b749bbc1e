//! Intake: collect the scanned documents and pick the document type.

use crate::controller::StageOutput;
use crate::error::PipelineError;
use crate::session::{DocumentHandle, DocumentType, Stage};

/// Working state of the intake stage: an ordered document list and the one
/// type tag that covers the whole batch.
#[derive(Debug, Default)]
pub struct IntakeStage {
    documents: Vec<DocumentHandle>,
    document_type: Option<DocumentType>,
}

impl IntakeStage {
    pub fn new() -> Self {
        IntakeStage::default()
    }

    /// Append a document; order is preserved.
    pub fn add_document(&mut self, handle: DocumentHandle) {
        self.documents.push(handle);
    }

    /// Remove the document at `index`, if any.
    pub fn remove_document(&mut self, index: usize) -> Option<DocumentHandle> {
        (index < self.documents.len()).then(|| self.documents.remove(index))
    }

    pub fn set_document_type(&mut self, document_type: DocumentType) {
        self.document_type = Some(document_type);
    }

    pub fn documents(&self) -> &[DocumentHandle] {
        &self.documents
    }

    /// Whether completion would be accepted.
    pub fn is_complete(&self) -> bool {
        !self.documents.is_empty() && self.document_type.is_some()
    }

    /// Produce the stage output.
    ///
    /// Refuses while the document list is empty or no type was chosen; the
    /// controller re-checks the same precondition on `advance`.
    pub fn finish(self) -> Result<StageOutput, PipelineError> {
        if self.documents.is_empty() {
            return Err(PipelineError::MissingPrerequisite {
                stage: Stage::Intake,
                detail: "at least one document must be provided".to_string(),
            });
        }
        let document_type = self.document_type.ok_or(PipelineError::MissingPrerequisite {
            stage: Stage::Intake,
            detail: "a document type must be selected".to_string(),
        })?;
        Ok(StageOutput::Intake {
            documents: self.documents,
            document_type,
        })
    }
}
