//! Core types and value objects for the action engine.
//!
//! Defines the action catalogue, the caller-supplied context, the uniform
//! result contract, and the task descriptors built-in handlers produce.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ActionError;

/// Free-form action parameters as produced by the upstream classifier.
pub type ActionParams = serde_json::Map<String, Value>;

// =============================================================================
// Enums
// =============================================================================

/// Built-in actions, keyed by the same string tag the registry uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    CreatePage,
    CreateFeature,
    ProcessReceipt,
    Deploy,
    CheckStatus,
    CreateTask,
    CodeTask,
}

impl ActionKind {
    /// All built-ins, in default registration order.
    pub const ALL: [ActionKind; 7] = [
        ActionKind::CreatePage,
        ActionKind::CreateFeature,
        ActionKind::ProcessReceipt,
        ActionKind::Deploy,
        ActionKind::CheckStatus,
        ActionKind::CreateTask,
        ActionKind::CodeTask,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreatePage => "create-page",
            ActionKind::CreateFeature => "create-feature",
            ActionKind::ProcessReceipt => "process-receipt",
            ActionKind::Deploy => "deploy",
            ActionKind::CheckStatus => "check-status",
            ActionKind::CreateTask => "create-task",
            ActionKind::CodeTask => "code-task",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown action kind: {}", s))
    }
}

// =============================================================================
// Context
// =============================================================================

/// Project metadata supplied by the intelligence provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
}

/// Caller-supplied context for one action invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionContext {
    /// Required for confirmation tracking.
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub project_details: Option<ProjectDetails>,
    pub project_repo: Option<String>,
    pub company: Option<String>,
    /// Classifier confidence in `0.0..=1.0`.
    pub confidence: Option<f64>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    /// Set internally when re-running an already-approved action.
    #[serde(skip_deserializing)]
    pub confirmed: bool,
}

impl ActionContext {
    /// Context carrying only a user id.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn stack(&self) -> Option<&str> {
        self.project_details
            .as_ref()
            .and_then(|details| details.stack.as_deref())
    }

    /// The context a confirmed re-run executes with.
    pub fn into_confirmed(self) -> Self {
        Self {
            confirmed: true,
            confidence: Some(1.0),
            ..self
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Auxiliary data describing an unexpected failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl From<&ActionError> for ErrorInfo {
    fn from(err: &ActionError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Uniform output of every handler and of the dispatcher.
///
/// Invariant: `success == false` implies `needs_confirmation == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub action: String,
    pub message: String,
    /// Task descriptor for the downstream executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub needs_confirmation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_prompt: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ActionResult {
    /// A successful result carrying a task descriptor.
    pub fn success<T: Serialize>(
        action: impl Into<String>,
        message: impl Into<String>,
        descriptor: &T,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            success: true,
            action: action.into(),
            message: message.into(),
            data: Some(serde_json::to_value(descriptor)?),
            needs_confirmation: false,
            confirmation_prompt: None,
            confirmed: false,
            error: None,
        })
    }

    /// An expected failure: validation, unknown action, absent confirmation.
    pub fn failure(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.into(),
            message: message.into(),
            data: None,
            needs_confirmation: false,
            confirmation_prompt: None,
            confirmed: false,
            error: None,
        }
    }

    /// An unexpected failure surfaced at the dispatch boundary.
    pub fn from_error(action: impl Into<String>, err: &ActionError) -> Self {
        let action = action.into();
        Self {
            message: format!("Action {} failed: {}", action, err),
            error: Some(ErrorInfo::from(err)),
            ..Self::failure(action, String::new())
        }
    }

    /// Attach a confirmation prompt, marking the result as gated when `required`.
    pub fn with_confirmation(mut self, required: bool, prompt: impl Into<String>) -> Self {
        if required && self.success {
            self.needs_confirmation = true;
            self.confirmation_prompt = Some(prompt.into());
        }
        self
    }

    /// Enforce the result invariant.
    pub(crate) fn normalized(mut self) -> Self {
        if !self.success {
            self.needs_confirmation = false;
        }
        self
    }
}

// =============================================================================
// Task descriptors
// =============================================================================

/// Descriptor for `create-page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTask {
    pub page_name: String,
    pub page_type: String,
    pub route: String,
    pub project_repo: String,
    pub stack: Option<String>,
}

/// Descriptor for `create-feature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTask {
    pub feature_name: String,
    pub description: String,
    pub project_repo: String,
    pub stack: Option<String>,
}

/// Descriptor for `process-receipt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTask {
    pub image_url: String,
    pub company: Option<String>,
    pub suggested_skill: String,
}

/// Descriptor for `deploy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployTask {
    pub project: String,
    pub path: String,
    pub environment: String,
    pub commands: Vec<String>,
}

/// Descriptor for `create-task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTask {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub repo: String,
}

/// Descriptor for `code-task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTask {
    pub task: String,
    pub description: String,
    pub files: Vec<String>,
    pub project_repo: String,
    pub stack: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================
