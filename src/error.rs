//! Error types for the formfill library.
//!
//! Two distinct failure families share one enum:
//!
//! * **Contract violations** — [`PipelineError::InvalidTransition`],
//!   [`PipelineError::MissingPrerequisite`], [`PipelineError::AtInitialStage`]
//!   and [`PipelineError::OperationPending`]. These mean a stage driver called
//!   the controller out of order. They are programming errors: stage
//!   implementations must prevent them (disable the action, re-check the
//!   precondition) rather than show them to a user.
//!
//! * **Remote failures** — [`PipelineError::RemoteOperationFailed`]. The only
//!   user-facing kind. The detail message from the service is surfaced
//!   verbatim when present; the caller always gets a retry path that
//!   re-issues the identical request (no server-side partial effects
//!   accumulate between attempts).

use crate::session::Stage;
use thiserror::Error;

/// All errors returned by the formfill library.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    // ── Controller contract violations ───────────────────────────────────
    /// A stage output was submitted while a different stage is active.
    #[error("output for the {output} stage submitted while the pipeline is at {stage}")]
    InvalidTransition {
        /// The stage the pipeline is actually at.
        stage: Stage,
        /// The stage whose output type was submitted.
        output: Stage,
    },

    /// Required upstream state is absent for the attempted transition.
    #[error("missing prerequisite at {stage}: {detail}")]
    MissingPrerequisite { stage: Stage, detail: String },

    /// `retreat()` was called while already at the first stage.
    #[error("already at the initial stage; nothing to retreat to")]
    AtInitialStage,

    /// A transition was attempted while a remote call for the current stage
    /// is still outstanding. There is no cancellation; wait for the call to
    /// settle, then retry or advance.
    #[error("a remote operation for the {stage} stage is still outstanding")]
    OperationPending { stage: Stage },

    // ── Remote failures ──────────────────────────────────────────────────
    /// A network call or the remote service failed. Carries the service's
    /// detail message when one was provided.
    #[error("{}", .message.as_deref().unwrap_or("the remote service could not complete the request"))]
    RemoteOperationFailed { message: Option<String> },

    // ── Input validation ─────────────────────────────────────────────────
    /// The string given for a URL form is not a well-formed http/https address.
    #[error("'{url}' is not a valid http/https form address")]
    InvalidFormUrl { url: String },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Construct a [`PipelineError::RemoteOperationFailed`] with a detail message.
    pub fn remote(message: impl Into<String>) -> Self {
        PipelineError::RemoteOperationFailed {
            message: Some(message.into()),
        }
    }

    /// Construct a [`PipelineError::RemoteOperationFailed`] with no detail.
    pub fn remote_opaque() -> Self {
        PipelineError::RemoteOperationFailed { message: None }
    }

    /// True for the error kinds a user is expected to see (and retry).
    pub fn is_user_facing(&self) -> bool {
        matches!(self, PipelineError::RemoteOperationFailed { .. })
    }
}
