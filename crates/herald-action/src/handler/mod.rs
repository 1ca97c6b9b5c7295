//! Action handler registry and trait definition.
//!
//! Defines the `ActionHandler` async trait and provides the handler
//! registry for dispatching actions to the correct implementation.

pub mod check_status;
pub mod code_task;
pub mod create_feature;
pub mod create_page;
pub mod create_task;
pub mod deploy;
pub mod process_receipt;

use std::future::Future;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use herald_core::config::{DeployConfig, StatusConfig};
use serde::de::DeserializeOwned;

use crate::collaborator::{DocumentFetcher, ProjectResolver};
use crate::error::ActionError;
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionParams, ActionResult};

/// Validates one action's inputs and derives its task descriptor.
///
/// Expected validation failures are reported as `Ok` with `success == false`.
/// `Err` is reserved for unexpected failures such as collaborator I/O.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError>;
}

/// Adapter turning an async closure into an [`ActionHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(ActionParams, ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResult, ActionError>> + Send,
{
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        (self.0)(params.clone(), context.clone()).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(ActionParams, ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ActionResult, ActionError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Collaborators and settings the built-in handlers are constructed with.
#[derive(Clone)]
pub struct BuiltinDeps {
    pub policy: ConfirmationPolicy,
    pub resolver: Arc<dyn ProjectResolver>,
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub deploy: DeployConfig,
    pub status: StatusConfig,
}

/// Registry mapping action names to handlers.
///
/// Names are listed in first-registration order. Re-registering a name
/// replaces its handler in place.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: RwLock<Vec<(String, Arc<dyn ActionHandler>)>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `action`, overwriting any previous handler.
    pub fn register(
        &self,
        action: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), ActionError> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(ActionError::InvalidRegistration(
                "action name must not be empty".to_string(),
            ));
        }

        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        match handlers.iter_mut().find(|(name, _)| *name == action) {
            Some(slot) => {
                tracing::debug!(action = %action, "Replacing action handler");
                slot.1 = handler;
            }
            None => handlers.push((action, handler)),
        }
        Ok(())
    }

    pub fn get(&self, action: &str) -> Option<Arc<dyn ActionHandler>> {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers
            .iter()
            .find(|(name, _)| name == action)
            .map(|(_, handler)| Arc::clone(handler))
    }

    /// Registered action names in registration order.
    pub fn list_actions(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register the seven built-in handlers.
    ///
    /// Fails without registering anything when the policy lists contradict
    /// how the built-ins confirm.
    pub fn register_defaults(&self, deps: BuiltinDeps) -> Result<(), ActionError> {
        use crate::types::ActionKind;

        deps.policy.validate_builtins()?;
        let policy = deps.policy;
        self.register(
            ActionKind::CreatePage.as_str(),
            Arc::new(create_page::CreatePageHandler::new(policy.clone())),
        )?;
        self.register(
            ActionKind::CreateFeature.as_str(),
            Arc::new(create_feature::CreateFeatureHandler::new(policy.clone())),
        )?;
        self.register(
            ActionKind::ProcessReceipt.as_str(),
            Arc::new(process_receipt::ProcessReceiptHandler),
        )?;
        self.register(
            ActionKind::Deploy.as_str(),
            Arc::new(deploy::DeployHandler::new(deps.resolver, deps.deploy)),
        )?;
        self.register(
            ActionKind::CheckStatus.as_str(),
            Arc::new(check_status::CheckStatusHandler::new(deps.fetcher, deps.status)),
        )?;
        self.register(
            ActionKind::CreateTask.as_str(),
            Arc::new(create_task::CreateTaskHandler::new(policy.clone())),
        )?;
        self.register(
            ActionKind::CodeTask.as_str(),
            Arc::new(code_task::CodeTaskHandler::new(policy)),
        )?;
        Ok(())
    }
}

// =============================================================================
// Helpers shared by built-in handlers
// =============================================================================

/// Deserialize the free-form params into a handler's typed params.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &ActionParams) -> Result<T, ActionError> {
    Ok(serde_json::from_value(serde_json::Value::Object(
        params.clone(),
    ))?)
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn missing_field(action: &str, field: &str) -> ActionResult {
    ActionResult::failure(action, format!("Missing required field: {}", field))
}
