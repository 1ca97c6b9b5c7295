//! Action dispatch for Herald.
//!
//! Routes named actions to pluggable handlers, gates risky actions behind
//! per-user confirmation, and reports every outcome as a structured result.

pub mod collaborator;
pub mod confirmation;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod policy;
pub mod status;
pub mod sweeper;
pub mod types;

pub use collaborator::{
    CachedResolver, DocumentFetcher, FsDocumentFetcher, ProjectResolution, ProjectResolver,
    StaticProjectRegistry,
};
pub use confirmation::{ConfirmationStore, PendingConfirmation};
pub use dispatcher::Dispatcher;
pub use error::ActionError;
pub use handler::{handler_fn, ActionHandler, ActionRegistry, BuiltinDeps};
pub use policy::ConfirmationPolicy;
pub use status::{parse_status_document, StatusParser, StatusReport, StatusSummary};
pub use sweeper::ConfirmationSweeper;
pub use types::{
    ActionContext, ActionKind, ActionParams, ActionResult, ErrorInfo, ProjectDetails,
};
