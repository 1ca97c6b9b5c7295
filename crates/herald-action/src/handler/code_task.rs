//! Coding task action handler.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ActionError;
use crate::handler::{missing_field, non_empty, parse_params, ActionHandler};
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, CodeTask};

const ACTION: &str = ActionKind::CodeTask.as_str();

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeTaskParams {
    task: Option<String>,
    description: Option<String>,
    files: Option<Vec<String>>,
}

/// Handler for `code-task` (confirmation-eligible).
pub struct CodeTaskHandler {
    policy: ConfirmationPolicy,
}

impl CodeTaskHandler {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ActionHandler for CodeTaskHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: CodeTaskParams = parse_params(params)?;

        let Some(task) = non_empty(params.task.as_deref()) else {
            return Ok(missing_field(ACTION, "task"));
        };
        let Some(project_repo) = non_empty(context.project_repo.as_deref()) else {
            return Ok(missing_field(ACTION, "projectRepo"));
        };

        let description = non_empty(params.description.as_deref()).unwrap_or_else(|| task.clone());
        let task = CodeTask {
            task,
            description,
            files: params.files.unwrap_or_default(),
            project_repo,
            stack: context.stack().map(str::to_string),
        };

        tracing::info!(repo = %task.project_repo, files = task.files.len(), "Code task prepared");

        let message = format!("Ready to work on \"{}\" in {}", task.task, task.project_repo);
        let prompt = format!(
            "Start coding \"{}\" in {}? Reply yes to confirm or no to cancel.",
            task.task, task.project_repo
        );
        Ok(ActionResult::success(ACTION, message, &task)?
            .with_confirmation(self.policy.needs_confirmation(ACTION, context), prompt))
    }
}
