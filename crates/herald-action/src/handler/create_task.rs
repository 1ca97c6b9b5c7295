//! Issue creation action handler.
//!
//! Prepares a tracker issue for the repository in context. The issue itself
//! is filed by the downstream executor after confirmation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ActionError;
use crate::handler::{missing_field, non_empty, parse_params, ActionHandler};
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, IssueTask};

const ACTION: &str = ActionKind::CreateTask.as_str();

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskParams {
    title: Option<String>,
    body: Option<String>,
    labels: Option<Vec<String>>,
}

/// Handler for `create-task` (confirmation-eligible).
pub struct CreateTaskHandler {
    policy: ConfirmationPolicy,
}

impl CreateTaskHandler {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ActionHandler for CreateTaskHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: CreateTaskParams = parse_params(params)?;

        let Some(title) = non_empty(params.title.as_deref()) else {
            return Ok(missing_field(ACTION, "title"));
        };
        let Some(repo) = non_empty(context.project_repo.as_deref()) else {
            return Ok(missing_field(ACTION, "projectRepo"));
        };

        let task = IssueTask {
            title,
            body: params.body.unwrap_or_default(),
            labels: params.labels.unwrap_or_default(),
            repo,
        };

        tracing::info!(title = %task.title, repo = %task.repo, labels = task.labels.len(), "Issue task prepared");

        let message = format!("Ready to create issue \"{}\" in {}", task.title, task.repo);
        let prompt = format!(
            "Create issue \"{}\" in {}? Reply yes to confirm or no to cancel.",
            task.title, task.repo
        );
        Ok(ActionResult::success(ACTION, message, &task)?
            .with_confirmation(self.policy.needs_confirmation(ACTION, context), prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{params, repo_context};
    use serde_json::json;

    fn handler() -> CreateTaskHandler {
        CreateTaskHandler::new(ConfirmationPolicy::default())
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let result = handler()
            .handle(&params(json!({"title": "Fix login"})), &repo_context(Some(0.5)))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.needs_confirmation);
        let data = result.data.unwrap();
        assert_eq!(data["title"], "Fix login");
        assert_eq!(data["body"], "");
        assert_eq!(data["labels"], json!([]));
        assert_eq!(data["repo"], "org/site");
    }

    #[tokio::test]
    async fn test_create_task_with_labels() {
        let result = handler()
            .handle(
                &params(json!({"title": "Fix login", "body": "500 on submit", "labels": ["bug", "auth"]})),
                &repo_context(Some(0.99)),
            )
            .await
            .unwrap();
        assert!(!result.needs_confirmation);
        let data = result.data.unwrap();
        assert_eq!(data["labels"], json!(["bug", "auth"]));
        assert_eq!(data["body"], "500 on submit");
    }

    #[tokio::test]
    async fn test_create_task_missing_title() {
        let result = handler()
            .handle(&params(json!({"title": ""})), &repo_context(None))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("title"));
    }

    #[tokio::test]
    async fn test_create_task_bad_labels_is_error() {
        let err = handler()
            .handle(&params(json!({"title": "x", "labels": "bug"})), &repo_context(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidParams(_)));
    }
}
