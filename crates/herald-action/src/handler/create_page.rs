//! Page creation action handler.
//!
//! Prepares a page-scaffolding task for the project in context.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ActionError;
use crate::handler::{missing_field, non_empty, parse_params, ActionHandler};
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, PageTask};

const ACTION: &str = ActionKind::CreatePage.as_str();

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePageParams {
    page_name: Option<String>,
    page_type: Option<String>,
    route: Option<String>,
}

/// Handler for `create-page` (confirmation-eligible).
pub struct CreatePageHandler {
    policy: ConfirmationPolicy,
}

impl CreatePageHandler {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ActionHandler for CreatePageHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: CreatePageParams = parse_params(params)?;

        let Some(page_name) = non_empty(params.page_name.as_deref()) else {
            return Ok(missing_field(ACTION, "pageName"));
        };
        let Some(project_repo) = non_empty(context.project_repo.as_deref()) else {
            return Ok(missing_field(ACTION, "projectRepo"));
        };

        let page_type = non_empty(params.page_type.as_deref()).unwrap_or_else(|| "page".to_string());
        let route = non_empty(params.route.as_deref())
            .unwrap_or_else(|| format!("/{}", page_name.to_lowercase()));

        let task = PageTask {
            page_name,
            page_type,
            route,
            project_repo,
            stack: context.stack().map(str::to_string),
        };

        tracing::info!(page = %task.page_name, route = %task.route, repo = %task.project_repo, "Page task prepared");

        let message = format!(
            "Ready to create {} \"{}\" at {} in {}",
            task.page_type, task.page_name, task.route, task.project_repo
        );
        let prompt = format!(
            "Create page \"{}\" at {} in {}? Reply yes to confirm or no to cancel.",
            task.page_name, task.route, task.project_repo
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

    fn handler() -> CreatePageHandler {
        CreatePageHandler::new(ConfirmationPolicy::default())
    }

    #[tokio::test]
    async fn test_create_page_derives_route() {
        let result = handler()
            .handle(&params(json!({"pageName": "Pricing"})), &repo_context(Some(0.4)))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.needs_confirmation);
        assert!(result.confirmation_prompt.is_some());
        let data = result.data.unwrap();
        assert_eq!(data["route"], "/pricing");
        assert_eq!(data["pageType"], "page");
        assert_eq!(data["projectRepo"], "org/site");
    }

    #[tokio::test]
    async fn test_create_page_explicit_route_and_type() {
        let result = handler()
            .handle(
                &params(json!({"pageName": "Blog", "pageType": "layout", "route": "/posts"})),
                &repo_context(None),
            )
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["route"], "/posts");
        assert_eq!(data["pageType"], "layout");
    }

    #[tokio::test]
    async fn test_create_page_high_confidence_skips_confirmation() {
        let result = handler()
            .handle(&params(json!({"pageName": "Pricing"})), &repo_context(Some(0.95)))
            .await
            .unwrap();
        assert!(result.success);
        assert!(!result.needs_confirmation);
        assert!(result.confirmation_prompt.is_none());
    }

    #[tokio::test]
    async fn test_create_page_carries_stack() {
        let mut ctx = repo_context(None);
        ctx.project_details = Some(crate::types::ProjectDetails {
            stack: Some("nextjs".to_string()),
            project_type: None,
        });
        let result = handler()
            .handle(&params(json!({"pageName": "About"})), &ctx)
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["stack"], "nextjs");
    }

    #[tokio::test]
    async fn test_create_page_missing_name() {
        let result = handler()
            .handle(&params(json!({})), &repo_context(Some(0.4)))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(!result.needs_confirmation);
        assert!(result.message.contains("pageName"));
    }

    #[tokio::test]
    async fn test_create_page_missing_repo() {
        let result = handler()
            .handle(&params(json!({"pageName": "Pricing"})), &ActionContext::for_user("u1"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("projectRepo"));
    }
}
