//! Session state: the six pipeline stages and everything a run owns.
//!
//! A [`Session`] is created empty at pipeline start and mutated only by the
//! [`crate::controller::PipelineController`] in response to stage completion
//! or reset. Stage views read from it and hand typed outputs back to the
//! controller; nothing else writes to it. That single mutation path is what
//! makes back-navigation lossless: retreating never touches the record,
//! descriptor, or document list.

use crate::form::FormDescriptor;
use crate::record::FieldRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One of the six ordered phases of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Intake,
    Extraction,
    FormSelection,
    FieldMapping,
    Review,
    Export,
}

impl Stage {
    /// The stages in pipeline order.
    pub const SEQUENCE: [Stage; 6] = [
        Stage::Intake,
        Stage::Extraction,
        Stage::FormSelection,
        Stage::FieldMapping,
        Stage::Review,
        Stage::Export,
    ];

    /// The stage after this one; `None` at the terminal stage.
    pub fn next(self) -> Option<Stage> {
        let idx = Stage::SEQUENCE.iter().position(|&s| s == self)?;
        Stage::SEQUENCE.get(idx + 1).copied()
    }

    /// The stage before this one; `None` at the initial stage.
    pub fn prev(self) -> Option<Stage> {
        let idx = Stage::SEQUENCE.iter().position(|&s| s == self)?;
        idx.checked_sub(1).map(|i| Stage::SEQUENCE[i])
    }

    /// No forward transition exists beyond Export except via reset.
    pub fn is_terminal(self) -> bool {
        self == Stage::Export
    }

    /// Banner title, as shown by the CLI.
    pub fn title(self) -> &'static str {
        match self {
            Stage::Intake => "Intake",
            Stage::Extraction => "Extraction",
            Stage::FormSelection => "Form Selection",
            Stage::FieldMapping => "Field Mapping",
            Stage::Review => "Review",
            Stage::Export => "Export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Intake => "intake",
            Stage::Extraction => "extraction",
            Stage::FormSelection => "form selection",
            Stage::FieldMapping => "field mapping",
            Stage::Review => "review",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// The kind of identity document the user scanned. Chosen once at intake
/// and applied to the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Aadhaar")]
    Aadhaar,
    #[serde(rename = "PAN")]
    Pan,
    #[serde(rename = "Passport")]
    Passport,
    #[serde(rename = "Driving License")]
    DrivingLicense,
    #[serde(rename = "Voter ID")]
    VoterId,
    #[serde(rename = "Other")]
    Other,
}

impl DocumentType {
    /// The tag string the extraction service expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "Aadhaar",
            DocumentType::Pan => "PAN",
            DocumentType::Passport => "Passport",
            DocumentType::DrivingLicense => "Driving License",
            DocumentType::VoterId => "Voter ID",
            DocumentType::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "aadhaar" | "aadhar" => Ok(DocumentType::Aadhaar),
            "pan" => Ok(DocumentType::Pan),
            "passport" => Ok(DocumentType::Passport),
            "driving license" | "dl" => Ok(DocumentType::DrivingLicense),
            "voter id" | "voter" => Ok(DocumentType::VoterId),
            "other" => Ok(DocumentType::Other),
            other => Err(format!(
                "unknown document type '{other}' (expected aadhaar, pan, passport, \
                 driving-license, voter-id, or other)"
            )),
        }
    }
}

/// A document the user handed to intake: where it lives and what it weighs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub file_name: String,
    pub byte_size: u64,
    pub path: PathBuf,
}

impl DocumentHandle {
    /// Build a handle from a file on disk, reading its metadata.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(DocumentHandle {
            file_name,
            byte_size: metadata.len(),
            path: path.to_path_buf(),
        })
    }
}

/// Everything one pipeline run owns.
///
/// Fields are crate-visible so the controller (the sole mutator) can apply
/// stage merges; external code reads through the accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub(crate) stage: Stage,
    pub(crate) record: FieldRecord,
    pub(crate) descriptor: Option<FormDescriptor>,
    pub(crate) documents: Vec<DocumentHandle>,
    pub(crate) document_type: Option<DocumentType>,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Intake
    }
}

impl Session {
    /// A fresh session: at intake, nothing collected yet.
    pub fn new() -> Self {
        Session::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn record(&self) -> &FieldRecord {
        &self.record
    }

    pub fn descriptor(&self) -> Option<&FormDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn documents(&self) -> &[DocumentHandle] {
        &self.documents
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        self.document_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_sequence_is_linear_and_reversible() {
        assert_eq!(Stage::Intake.next(), Some(Stage::Extraction));
        assert_eq!(Stage::Review.next(), Some(Stage::Export));
        assert_eq!(Stage::Export.next(), None);
        assert!(Stage::Export.is_terminal());

        assert_eq!(Stage::Intake.prev(), None);
        for window in Stage::SEQUENCE.windows(2) {
            assert_eq!(window[1].prev(), Some(window[0]));
            assert_eq!(window[0].next(), Some(window[1]));
        }
    }

    #[test]
    fn document_type_parses_cli_aliases() {
        assert_eq!("aadhaar".parse::<DocumentType>(), Ok(DocumentType::Aadhaar));
        assert_eq!("PAN".parse::<DocumentType>(), Ok(DocumentType::Pan));
        assert_eq!(
            "driving-license".parse::<DocumentType>(),
            Ok(DocumentType::DrivingLicense)
        );
        assert_eq!("voter_id".parse::<DocumentType>(), Ok(DocumentType::VoterId));
        assert!("ration card".parse::<DocumentType>().is_err());
    }

    #[test]
    fn document_type_serializes_to_service_tags() {
        let json = serde_json::to_string(&DocumentType::VoterId).unwrap();
        assert_eq!(json, r#""Voter ID""#);
        let back: DocumentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocumentType::VoterId);
    }

    #[test]
    fn new_session_is_empty_and_at_intake() {
        let session = Session::new();
        assert_eq!(session.stage(), Stage::Intake);
        assert!(session.record().is_empty());
        assert!(session.descriptor().is_none());
        assert!(session.documents().is_empty());
        assert!(session.document_type().is_none());
    }

    #[test]
    fn document_handle_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aadhaar-front.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let handle = DocumentHandle::from_path(&path).unwrap();
        assert_eq!(handle.file_name, "aadhaar-front.jpg");
        assert_eq!(handle.byte_size, 17);
    }
}
