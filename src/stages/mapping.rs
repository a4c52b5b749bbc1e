//! Field mapping: adjust every field before the final review.
//!
//! A pure, local transform. The working copy is seeded from the incoming
//! session record; the stage exposes the full field catalog (label and
//! input kind per key) and accepts edits to any value. It can always finish
//! (empty fields are permitted) and produces the full edited record.

use crate::controller::StageOutput;
use crate::record::{FieldKey, FieldRecord, InputKind};

/// One row of the mapping form: a key with its presentation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub kind: InputKind,
}

/// The full catalog, in canonical display order.
pub fn field_catalog() -> Vec<FieldSpec> {
    FieldKey::ALL
        .iter()
        .map(|&key| FieldSpec {
            key,
            label: key.label(),
            kind: key.input_kind(),
        })
        .collect()
}

/// Working state of the field-mapping stage.
#[derive(Debug)]
pub struct FieldMappingStage {
    draft: FieldRecord,
}

impl FieldMappingStage {
    /// Seed the working copy from the incoming record.
    pub fn new(incoming: &FieldRecord) -> Self {
        FieldMappingStage {
            draft: incoming.clone(),
        }
    }

    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>) {
        self.draft.set(key, value);
    }

    pub fn clear_field(&mut self, key: FieldKey) {
        self.draft.clear(key);
    }

    pub fn draft(&self) -> &FieldRecord {
        &self.draft
    }

    pub fn provided_count(&self) -> usize {
        self.draft.provided_count()
    }

    /// Always able to complete; empty fields are allowed.
    pub fn finish(self) -> StageOutput {
        StageOutput::FieldMapping(self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_all_eleven_fields_in_order() {
        let catalog = field_catalog();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog[0].key, FieldKey::Name);
        assert_eq!(catalog[0].label, "Full Name");
        assert_eq!(catalog[10].key, FieldKey::IdNumber);

        let gender = catalog.iter().find(|s| s.key == FieldKey::Gender).unwrap();
        assert!(matches!(gender.kind, InputKind::Select(_)));
    }

    #[test]
    fn seeds_from_the_incoming_record() {
        let mut incoming = FieldRecord::new();
        incoming.set(FieldKey::Name, "A Sharma");

        let stage = FieldMappingStage::new(&incoming);
        assert_eq!(stage.draft().provided(FieldKey::Name), Some("A Sharma"));
        assert_eq!(stage.provided_count(), 1);
    }

    #[test]
    fn finishes_with_blanks_allowed() {
        let stage = FieldMappingStage::new(&FieldRecord::new());
        match stage.finish() {
            StageOutput::FieldMapping(record) => assert!(record.is_empty()),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn edits_land_in_the_draft_not_the_source() {
        let mut incoming = FieldRecord::new();
        incoming.set(FieldKey::City, "Kochi");

        let mut stage = FieldMappingStage::new(&incoming);
        stage.set_field(FieldKey::City, "Chennai");
        stage.clear_field(FieldKey::City);
        stage.set_field(FieldKey::State, "Tamil Nadu");

        assert_eq!(incoming.provided(FieldKey::City), Some("Kochi"));
        assert!(!stage.draft().is_provided(FieldKey::City));
        assert_eq!(stage.draft().provided(FieldKey::State), Some("Tamil Nadu"));
    }
}
