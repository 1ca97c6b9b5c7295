//! Receipt processing action handler.
//!
//! Hands the image to the receipts skill, which runs its own confirmation
//! flow, so this handler never gates on confirmation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ActionError;
use crate::handler::{missing_field, non_empty, parse_params, ActionHandler};
use crate::types::{ActionContext, ActionKind, ActionParams, ActionResult, ReceiptTask};

const ACTION: &str = ActionKind::ProcessReceipt.as_str();
const RECEIPTS_SKILL: &str = "receipts";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessReceiptParams {
    image_url: Option<String>,
}

/// Handler for `process-receipt`.
pub struct ProcessReceiptHandler;

#[async_trait]
impl ActionHandler for ProcessReceiptHandler {
    async fn handle(
        &self,
        params: &ActionParams,
        context: &ActionContext,
    ) -> Result<ActionResult, ActionError> {
        let params: ProcessReceiptParams = parse_params(params)?;

        let image_url = non_empty(params.image_url.as_deref())
            .or_else(|| non_empty(context.media_url.as_deref()));
        let Some(image_url) = image_url else {
            return Ok(missing_field(ACTION, "imageUrl"));
        };

        let task = ReceiptTask {
            image_url,
            company: context.company.clone(),
            suggested_skill: RECEIPTS_SKILL.to_string(),
        };

        tracing::info!(company = ?task.company, "Receipt routed to skill");

        ActionResult::success(ACTION, "Receipt received, processing it now.", &task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::params;
    use serde_json::json;

    #[tokio::test]
    async fn test_receipt_from_params() {
        let ctx = ActionContext {
            company: Some("Acme".to_string()),
            ..ActionContext::for_user("u1")
        };
        let result = ProcessReceiptHandler
            .handle(&params(json!({"imageUrl": "https://cdn/r.jpg"})), &ctx)
            .await
            .unwrap();
        assert!(result.success);
        assert!(!result.needs_confirmation);
        let data = result.data.unwrap();
        assert_eq!(data["imageUrl"], "https://cdn/r.jpg");
        assert_eq!(data["company"], "Acme");
        assert_eq!(data["suggestedSkill"], "receipts");
    }

    #[tokio::test]
    async fn test_receipt_falls_back_to_media_url() {
        let ctx = ActionContext {
            media_url: Some("https://cdn/m.png".to_string()),
            media_type: Some("image/png".to_string()),
            confidence: Some(0.1),
            ..ActionContext::for_user("u1")
        };
        let result = ProcessReceiptHandler
            .handle(&params(json!({})), &ctx)
            .await
            .unwrap();
        assert!(result.success);
        assert!(!result.needs_confirmation);
        assert_eq!(result.data.unwrap()["imageUrl"], "https://cdn/m.png");
    }

    #[tokio::test]
    async fn test_receipt_missing_image() {
        let result = ProcessReceiptHandler
            .handle(&params(json!({})), &ActionContext::for_user("u1"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(!result.needs_confirmation);
        assert!(result.message.contains("imageUrl"));
    }
}
