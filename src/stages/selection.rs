//! Form selection: decide which form gets filled.
//!
//! Three mutually exclusive acquisition paths, each yielding a
//! [`FormDescriptor`]: pick a sample from the server catalog, upload a PDF
//! (the driver runs [`crate::gateway::FormApi::upload_form`] and records the
//! storage reference here), or type a URL (syntactic validation only, no
//! network). Running any path replaces a previous choice; completion is
//! blocked until exactly one path has produced a descriptor.

use crate::controller::StageOutput;
use crate::error::PipelineError;
use crate::form::{FormDescriptor, SampleForm};
use crate::session::Stage;

/// Working state of the form-selection stage.
#[derive(Debug, Default)]
pub struct FormSelectionStage {
    choice: Option<FormDescriptor>,
}

impl FormSelectionStage {
    pub fn new() -> Self {
        FormSelectionStage::default()
    }

    /// Path 1: choose a pre-registered form from the catalog.
    pub fn choose_sample(&mut self, form: SampleForm) {
        self.choice = Some(form.into_descriptor());
    }

    /// Path 2: record the storage reference of a just-uploaded PDF.
    pub fn attach_upload(&mut self, name: impl Into<String>, form_path: impl Into<String>) {
        self.choice = Some(FormDescriptor::Uploaded {
            name: name.into(),
            form_path: form_path.into(),
        });
    }

    /// Path 3: target an online form by address. Fails on a malformed URL
    /// and leaves any previous choice in place.
    pub fn set_url(&mut self, url: impl Into<String>) -> Result<(), PipelineError> {
        self.choice = Some(FormDescriptor::url(url)?);
        Ok(())
    }

    /// The current choice, if one path has produced a descriptor.
    pub fn choice(&self) -> Option<&FormDescriptor> {
        self.choice.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.choice.is_some()
    }

    /// Produce the stage output; refuses until a descriptor exists.
    pub fn finish(self) -> Result<StageOutput, PipelineError> {
        let descriptor = self.choice.ok_or(PipelineError::MissingPrerequisite {
            stage: Stage::FormSelection,
            detail: "no target form has been selected".to_string(),
        })?;
        Ok(StageOutput::FormSelection(descriptor))
    }
}
