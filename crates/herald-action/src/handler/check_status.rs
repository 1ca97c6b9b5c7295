//! Project status action handler.
//!
//! Fetches the project's task-tracking document and summarises progress.

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::config::StatusConfig;
use serde::Deserialize;

use crate::collaborator::DocumentFetcher;
use crate::error::ActionError;
use crate::handler::{non_empty, parse_params, ActionHandler};
use crate::status::{StatusParser, StatusReport};
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult};

const ACTION: &str = ActionKind::CheckStatus.as_str();

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckStatusParams {
    project_name: Option<String>,
}

/// Handler for `check-status` (never confirmation-gated).
pub struct CheckStatusHandler {
    fetcher: Arc<dyn DocumentFetcher>,
    config: StatusConfig,
    parser: StatusParser,
}

impl CheckStatusHandler {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: StatusConfig) -> Self {
        Self {
            fetcher,
            config,
            parser: StatusParser::new(),
        }
    }
}

fn render(report: &StatusReport) -> String {
    let mut message = format!(
        "{}: {}/{} done, {} remaining",
        report.project, report.complete, report.total, report.incomplete
    );
    for item in &report.pending_items {
        message.push_str("\n- ");
        message.push_str(item);
    }
    message
}

#[async_trait]
impl ActionHandler for CheckStatusHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: CheckStatusParams = parse_params(params)?;

        let project = non_empty(params.project_name.as_deref())
            .or_else(|| non_empty(context.project_id.as_deref()))
            .or_else(|| non_empty(context.project_repo.as_deref()));
        let Some(project) = project else {
            return Ok(ActionResult::failure(ACTION, "No project specified."));
        };

        let document = &self.config.document_path;
        let Some(text) = self.fetcher.fetch(&project, document).await? else {
            return Ok(ActionResult::failure(
                ACTION,
                format!("No {} found for {}", document, project),
            ));
        };

        let summary = self.parser.parse(&text, self.config.max_items);
        let report = StatusReport {
            total: summary.total(),
            complete: summary.complete,
            incomplete: summary.incomplete,
            pending_items: summary.pending_items,
            document: document.clone(),
            project,
        };

        tracing::info!(
            project = %report.project,
            complete = report.complete,
            incomplete = report.incomplete,
            "Status report built"
        );

        ActionResult::success(ACTION, render(&report), &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{params, MemoryFetcher};
    use serde_json::json;

    fn handler() -> CheckStatusHandler {
        let mut fetcher = MemoryFetcher::default();
        fetcher.docs.insert(
            "site/TODO.md".to_string(),
            "- [x] Hero\n- [ ] Pricing\n- [ ] FAQ\n- ✅ Footer\n- 🔄 Blog".to_string(),
        );
        fetcher.docs.insert(
            "org/site/TODO.md".to_string(),
            "- [ ] one".to_string(),
        );
        CheckStatusHandler::new(Arc::new(fetcher), StatusConfig::default())
    }

    #[tokio::test]
    async fn test_check_status_counts() {
        let result = handler()
            .handle(&params(json!({"projectName": "site"})), &ActionContext::default())
            .await
            .unwrap();
        assert!(result.success);
        assert!(!result.needs_confirmation);
        let data = result.data.unwrap();
        assert_eq!(data["complete"], 2);
        assert_eq!(data["incomplete"], 3);
        assert_eq!(data["total"], 5);
        assert_eq!(data["pendingItems"], json!(["Pricing", "FAQ", "Blog"]));
        assert!(result.message.starts_with("site: 2/5 done, 3 remaining"));
        assert!(result.message.contains("\n- FAQ"));
    }

    #[tokio::test]
    async fn test_check_status_falls_back_to_project_repo() {
        let ctx = ActionContext {
            project_repo: Some("org/site".to_string()),
            ..ActionContext::default()
        };
        let result = handler().handle(&params(json!({})), &ctx).await.unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["incomplete"], 1);
    }

    #[tokio::test]
    async fn test_check_status_prefers_project_id_over_repo() {
        let ctx = ActionContext {
            project_id: Some("site".to_string()),
            project_repo: Some("org/site".to_string()),
            ..ActionContext::default()
        };
        let result = handler().handle(&params(json!({})), &ctx).await.unwrap();
        assert_eq!(result.data.unwrap()["project"], "site");
    }

    #[tokio::test]
    async fn test_check_status_document_missing() {
        let result = handler()
            .handle(&params(json!({"projectName": "api"})), &ActionContext::default())
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("TODO.md"));
    }

    #[tokio::test]
    async fn test_check_status_no_project() {
        let result = handler()
            .handle(&params(json!({})), &ActionContext::for_user("u1"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(!result.needs_confirmation);
    }
}
