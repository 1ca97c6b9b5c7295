//! Action dispatcher.
//!
//! Single entry point that looks up a handler, runs it, applies the
//! confirmation policy, and records pending confirmations per user. No
//! public method returns an error: every failure is reported as a failed
//! [`ActionResult`].

use std::sync::Arc;

use herald_core::config::HeraldConfig;
use herald_core::types::Timestamp;

use crate::collaborator::{DocumentFetcher, ProjectResolver};
use crate::confirmation::{Claim, ConfirmationStore, PendingConfirmation};
use crate::error::ActionError;
use crate::handler::{ActionHandler, ActionRegistry, BuiltinDeps};
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionParams, ActionResult};

const CONFIRM: &str = "confirm";
const REJECT: &str = "reject";

/// Dispatcher owning the handler registry and the pending confirmation store.
///
/// Constructed once by the hosting service and shared behind an `Arc`.
pub struct Dispatcher {
    registry: ActionRegistry,
    confirmations: ConfirmationStore,
}

impl Dispatcher {
    pub fn new(registry: ActionRegistry, confirmations: ConfirmationStore) -> Self {
        Self {
            registry,
            confirmations,
        }
    }

    /// Build a dispatcher with the built-in handlers registered.
    pub fn with_defaults(
        config: &HeraldConfig,
        resolver: Arc<dyn ProjectResolver>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Result<Self, ActionError> {
        let registry = ActionRegistry::new();
        registry.register_defaults(BuiltinDeps {
            policy: ConfirmationPolicy::new(&config.confirmation),
            resolver,
            fetcher,
            deploy: config.deploy.clone(),
            status: config.status.clone(),
        })?;
        let confirmations = ConfirmationStore::new(config.confirmation.expiry_secs);
        Ok(Self::new(registry, confirmations))
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Register or replace the handler for `action`.
    pub fn register_handler(
        &self,
        action: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), ActionError> {
        self.registry.register(action, handler)
    }

    /// Registered action names in registration order.
    pub fn available_actions(&self) -> Vec<String> {
        self.registry.list_actions()
    }

    /// Run `action` and record a pending confirmation when the result asks for one.
    pub async fn execute(
        &self,
        action: &str,
        params: ActionParams,
        context: ActionContext,
    ) -> ActionResult {
        let result = self.invoke(action, params.clone(), context.clone()).await;

        if result.needs_confirmation {
            match context.user_id.as_deref().filter(|id| !id.is_empty()) {
                Some(user_id) => {
                    let pending = PendingConfirmation::new(
                        user_id,
                        action,
                        params,
                        context.clone(),
                        result.clone(),
                        Timestamp::now(),
                    );
                    self.confirmations.insert(pending);
                    tracing::info!(action = %action, user_id = %user_id, "Awaiting confirmation");
                }
                None => {
                    tracing::warn!(action = %action, "Confirmation requested without a user id; not tracked");
                }
            }
        } else if result.success {
            tracing::info!(action = %action, "Action dispatched");
        }

        result
    }

    /// Run an already-approved action without re-applying the confirmation policy.
    pub async fn execute_confirmed(
        &self,
        action: &str,
        params: ActionParams,
        context: ActionContext,
    ) -> ActionResult {
        let mut result = self.invoke(action, params, context).await;
        result.needs_confirmation = false;
        result.confirmation_prompt = None;
        result.confirmed = true;
        result
    }

    /// Confirm the user's pending action and re-run it.
    pub async fn confirm_pending_action(&self, user_id: &str) -> ActionResult {
        match self.confirmations.take(user_id) {
            Claim::Empty => ActionResult::failure(CONFIRM, "Nothing to confirm."),
            Claim::Expired(pending) => {
                tracing::info!(
                    action = %pending.action,
                    user_id = %user_id,
                    age_secs = pending.created_at.age_secs(),
                    "Pending confirmation expired"
                );
                ActionResult::failure(
                    pending.action.clone(),
                    format!(
                        "The {} request expired after {} minutes. Please send it again.",
                        pending.action,
                        self.confirmations.expiry_secs() / 60
                    ),
                )
            }
            Claim::Live(pending) => {
                tracing::info!(action = %pending.action, user_id = %user_id, "Action confirmed");
                let context = pending.context.into_confirmed();
                self.execute_confirmed(&pending.action, pending.params, context)
                    .await
            }
        }
    }

    /// Cancel the user's pending action without running it.
    pub fn reject_pending_action(&self, user_id: &str) -> ActionResult {
        match self.confirmations.take(user_id) {
            Claim::Empty => ActionResult::failure(REJECT, "Nothing to reject."),
            Claim::Expired(pending) | Claim::Live(pending) => {
                tracing::info!(action = %pending.action, user_id = %user_id, "Action rejected");
                ActionResult {
                    success: true,
                    message: format!("Cancelled {}.", pending.action),
                    ..ActionResult::failure(pending.action, String::new())
                }
            }
        }
    }

    /// The user's live pending confirmation, if any.
    pub fn get_pending_confirmation(&self, user_id: &str) -> Option<PendingConfirmation> {
        self.confirmations.peek(user_id)
    }

    /// Remove every expired pending confirmation.
    pub fn sweep_expired(&self) -> usize {
        self.confirmations.sweep()
    }

    pub fn pending_count(&self) -> usize {
        self.confirmations.len()
    }

    /// The underlying pending confirmation store.
    pub fn confirmations(&self) -> &ConfirmationStore {
        &self.confirmations
    }

    /// Look up and run the handler, converting every failure into a result.
    async fn invoke(
        &self,
        action: &str,
        params: ActionParams,
        context: ActionContext,
    ) -> ActionResult {
        let Some(handler) = self.registry.get(action) else {
            tracing::warn!(action = %action, "Unknown action");
            return ActionResult::failure(
                action,
                format!(
                    "Unknown action: {}. Available actions: {}",
                    action,
                    self.available_actions().join(", ")
                ),
            );
        };

        // Run on its own task so a panicking handler cannot take down the caller.
        let outcome =
            tokio::spawn(async move { handler.handle(&params, &context).await }).await;

        let err = match outcome {
            Ok(Ok(result)) => return result.normalized(),
            Ok(Err(err)) => err,
            Err(join_err) if join_err.is_panic() => ActionError::Panicked(join_err.to_string()),
            Err(join_err) => ActionError::HandlerFailed(join_err.to_string()),
        };

        tracing::warn!(action = %action, error = %err, "Action handler failed");
        ActionResult::from_error(action, &err)
    }
}
