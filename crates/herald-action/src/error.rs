//! Error types for the action engine.
//!
//! Expected validation failures are not errors: handlers report them as
//! failed [`ActionResult`](crate::types::ActionResult)s. These variants cover
//! the unexpected tier, which the dispatcher converts at its boundary.

use herald_core::error::HeraldError;

/// Errors from handler registration and handler execution.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action handler failed: {0}")]
    HandlerFailed(String),
    #[error("Invalid handler registration: {0}")]
    InvalidRegistration(String),
    #[error("Invalid action parameters: {0}")]
    InvalidParams(String),
    #[error("Collaborator failed: {0}")]
    Collaborator(String),
    #[error("Action handler panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Core(#[from] HeraldError),
}

impl ActionError {
    /// Stable tag reported in `ErrorInfo::kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::HandlerFailed(_) => "handler_failed",
            ActionError::InvalidRegistration(_) => "invalid_registration",
            ActionError::InvalidParams(_) => "invalid_params",
            ActionError::Collaborator(_) => "collaborator",
            ActionError::Panicked(_) => "panicked",
            ActionError::Core(_) => "core",
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError::InvalidParams(err.to_string())
    }
}
