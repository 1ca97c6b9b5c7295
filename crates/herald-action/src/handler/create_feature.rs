//! Feature creation action handler.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ActionError;
use crate::handler::{missing_field, non_empty, parse_params, ActionHandler};
use crate::policy::ConfirmationPolicy;
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, FeatureTask};

const ACTION: &str = ActionKind::CreateFeature.as_str();

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFeatureParams {
    feature_name: Option<String>,
    description: Option<String>,
}

/// Handler for `create-feature` (confirmation-eligible).
pub struct CreateFeatureHandler {
    policy: ConfirmationPolicy,
}

impl CreateFeatureHandler {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ActionHandler for CreateFeatureHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: CreateFeatureParams = parse_params(params)?;

        let Some(feature_name) = non_empty(params.feature_name.as_deref()) else {
            return Ok(missing_field(ACTION, "featureName"));
        };
        let Some(project_repo) = non_empty(context.project_repo.as_deref()) else {
            return Ok(missing_field(ACTION, "projectRepo"));
        };

        let description = non_empty(params.description.as_deref())
            .unwrap_or_else(|| format!("Implement {} feature", feature_name));
        let task = FeatureTask {
            feature_name,
            description,
            project_repo,
            stack: context.stack().map(str::to_string),
        };

        tracing::info!(feature = %task.feature_name, repo = %task.project_repo, "Feature task prepared");

        let message = format!(
            "Ready to build feature \"{}\" in {}",
            task.feature_name, task.project_repo
        );
        let prompt = format!(
            "Build feature \"{}\" in {}? Reply yes to confirm or no to cancel.",
            task.feature_name, task.project_repo
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

    fn handler() -> CreateFeatureHandler {
        CreateFeatureHandler::new(ConfirmationPolicy::default())
    }

    #[tokio::test]
    async fn test_create_feature_default_description() {
        let result = handler()
            .handle(&params(json!({"featureName": "dark mode"})), &repo_context(None))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.needs_confirmation);
        let data = result.data.unwrap();
        assert_eq!(data["description"], "Implement dark mode feature");
        assert_eq!(data["featureName"], "dark mode");
    }

    #[tokio::test]
    async fn test_create_feature_explicit_description() {
        let result = handler()
            .handle(
                &params(json!({"featureName": "search", "description": "Full-text search"})),
                &repo_context(Some(0.92)),
            )
            .await
            .unwrap();
        assert!(!result.needs_confirmation);
        assert_eq!(result.data.unwrap()["description"], "Full-text search");
    }

    #[tokio::test]
    async fn test_create_feature_missing_name() {
        let result = handler()
            .handle(&params(json!({"description": "x"})), &repo_context(None))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(!result.needs_confirmation);
        assert!(result.message.contains("featureName"));
    }
}
