//! Target-form descriptors: which form gets filled, and how it was acquired.
//!
//! A session ends up with exactly one [`FormDescriptor`], produced by the
//! form-selection stage through one of three mutually exclusive paths:
//! picking from the server catalog, uploading a PDF, or typing a web
//! address. The descriptor is immutable once selected; re-running form
//! selection replaces it wholesale.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// The form a session will fill. Exactly one case is active per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormDescriptor {
    /// A pre-registered PDF from the server catalog.
    Sample {
        id: String,
        name: String,
        /// Server-side reference to the registered PDF; consumed by fill-pdf.
        path: String,
    },
    /// A PDF the user just uploaded; `form_path` is the storage reference
    /// assigned by the upload-form operation.
    Uploaded { name: String, form_path: String },
    /// An online form reached by URL. Filled by remote browser automation;
    /// never submitted automatically.
    Url { url: String, name: String },
}

impl FormDescriptor {
    /// Build a URL descriptor after syntactic validation (no network call).
    ///
    /// Only absolute http/https addresses are accepted; anything else is the
    /// user mistyping, caught before the session commits to the descriptor.
    pub fn url(url: impl Into<String>) -> Result<Self, PipelineError> {
        let url = url.into();
        let parsed = reqwest::Url::parse(&url)
            .map_err(|_| PipelineError::InvalidFormUrl { url: url.clone() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PipelineError::InvalidFormUrl { url });
        }
        Ok(FormDescriptor::Url {
            url,
            name: "Online Form".to_string(),
        })
    }

    /// Display name shown in review and export views.
    pub fn display_name(&self) -> &str {
        match self {
            FormDescriptor::Sample { name, .. }
            | FormDescriptor::Uploaded { name, .. }
            | FormDescriptor::Url { name, .. } => name,
        }
    }

    /// Whether the export stage will go down the URL-automation path.
    pub fn is_url(&self) -> bool {
        matches!(self, FormDescriptor::Url { .. })
    }

    /// The fill-pdf storage reference, for the two PDF-backed cases.
    pub fn pdf_reference(&self) -> Option<&str> {
        match self {
            FormDescriptor::Sample { path, .. } => Some(path),
            FormDescriptor::Uploaded { form_path, .. } => Some(form_path),
            FormDescriptor::Url { .. } => None,
        }
    }
}

/// One entry of the sample-form catalog, as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleForm {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

impl SampleForm {
    /// Promote a catalog entry into the session's descriptor.
    pub fn into_descriptor(self) -> FormDescriptor {
        FormDescriptor::Sample {
            id: self.id,
            name: self.name,
            path: self.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_http_urls() {
        let descriptor = FormDescriptor::url("https://example.com/form?id=7").unwrap();
        assert!(descriptor.is_url());
        assert_eq!(descriptor.display_name(), "Online Form");
        assert_eq!(descriptor.pdf_reference(), None);
    }

    #[test]
    fn rejects_malformed_and_non_http_urls() {
        for bad in ["not a url", "ftp://example.com/form", "example.com/form", ""] {
            assert!(
                matches!(
                    FormDescriptor::url(bad),
                    Err(PipelineError::InvalidFormUrl { .. })
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn sample_entry_keeps_its_storage_path() {
        let descriptor = SampleForm {
            id: "passport-application".into(),
            name: "Passport Application".into(),
            kind: "PDF".into(),
            path: "sample-forms/passport-application.pdf".into(),
        }
        .into_descriptor();

        assert_eq!(
            descriptor.pdf_reference(),
            Some("sample-forms/passport-application.pdf")
        );
        assert_eq!(descriptor.display_name(), "Passport Application");
    }

    #[test]
    fn descriptor_serializes_with_a_type_tag() {
        let json = serde_json::to_value(FormDescriptor::Uploaded {
            name: "lease.pdf".into(),
            form_path: "uploads/forms/lease.pdf".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "uploaded");
        assert_eq!(json["form_path"], "uploads/forms/lease.pdf");
    }
}
