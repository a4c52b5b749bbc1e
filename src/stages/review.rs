//! Review: the last look at the record before export.
//!
//! Same editable-record contract as field mapping, positioned as a final
//! confirmation step. Purely local; no network calls.

use crate::controller::StageOutput;
use crate::record::{FieldKey, FieldRecord};

/// Working state of the review stage.
#[derive(Debug)]
pub struct ReviewStage {
    draft: FieldRecord,
}

impl ReviewStage {
    pub fn new(incoming: &FieldRecord) -> Self {
        ReviewStage {
            draft: incoming.clone(),
        }
    }

    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>) {
        self.draft.set(key, value);
    }

    pub fn draft(&self) -> &FieldRecord {
        &self.draft
    }

    /// How many fields will actually be filled into the form.
    pub fn ready_count(&self) -> usize {
        self.draft.provided_count()
    }

    pub fn finish(self) -> StageOutput {
        StageOutput::Review(self.draft)
    }
}
