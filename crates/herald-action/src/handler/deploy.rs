//! Deploy action handler.
//!
//! Resolves the target against the project whitelist and stages the deploy
//! command sequence. Deploys always wait for explicit confirmation; the
//! confidence bypass never applies here.

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::config::DeployConfig;
use serde::Deserialize;

use crate::collaborator::ProjectResolver;
use crate::error::ActionError;
use crate::handler::{non_empty, parse_params, ActionHandler};
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, DeployTask};

const ACTION: &str = ActionKind::Deploy.as_str();

/// Steps run in the resolved project directory, in order.
pub const DEPLOY_COMMANDS: [&str; 3] = ["git pull", "npm install", "npm run build"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployParams {
    project_name: Option<String>,
    environment: Option<String>,
}

/// Handler for `deploy` (always confirmation-gated).
pub struct DeployHandler {
    resolver: Arc<dyn ProjectResolver>,
    config: DeployConfig,
}

impl DeployHandler {
    pub fn new(resolver: Arc<dyn ProjectResolver>, config: DeployConfig) -> Self {
        Self { resolver, config }
    }
}

#[async_trait]
impl ActionHandler for DeployHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: DeployParams = parse_params(params)?;

        let target = non_empty(params.project_name.as_deref())
            .or_else(|| non_empty(context.project_id.as_deref()));
        let Some(target) = target else {
            return Ok(ActionResult::failure(ACTION, "No project specified."));
        };

        let resolution = self.resolver.resolve(&target).await?;
        let (project, path) = match (resolution.valid, resolution.matched, resolution.path) {
            (true, Some(project), Some(path)) => (project, path),
            _ => {
                let known = if resolution.known_projects.is_empty() {
                    "none".to_string()
                } else {
                    resolution.known_projects.join(", ")
                };
                tracing::warn!(project = %target, "Deploy target not in whitelist");
                return Ok(ActionResult::failure(
                    ACTION,
                    format!("Unknown project \"{}\". Known projects: {}", target, known),
                ));
            }
        };

        let task = DeployTask {
            project,
            path,
            environment: non_empty(params.environment.as_deref())
                .unwrap_or_else(|| self.config.default_environment.clone()),
            commands: DEPLOY_COMMANDS.iter().map(|c| c.to_string()).collect(),
        };

        tracing::info!(project = %task.project, environment = %task.environment, "Deploy staged");

        let message = format!(
            "Ready to deploy {} to {} from {}",
            task.project, task.environment, task.path
        );
        let prompt = format!(
            "Deploy {} to {}? This will run: {}. Reply yes to confirm or no to cancel.",
            task.project,
            task.environment,
            task.commands.join(" && ")
        );
        Ok(ActionResult::success(ACTION, message, &task)?.with_confirmation(true, prompt))
    }
}
