//! JSON-lines request protocol.
//!
//! Each stdin line is one request object tagged by `op`; each response is
//! written back as one JSON line.

use herald_action::{ActionContext, ActionParams, Dispatcher};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    Execute {
        action: String,
        #[serde(default)]
        params: ActionParams,
        #[serde(default)]
        context: ActionContext,
    },
    Confirm {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Reject {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Pending {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Actions,
}

fn error_response(kind: &str, message: impl Into<String>) -> Value {
    json!({ "error": { "kind": kind, "message": message.into() } })
}

/// Answer one request line. Malformed input yields an error object, never `Err`.
pub async fn handle_line(dispatcher: &Dispatcher, line: &str) -> serde_json::Result<Value> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed request line");
            return Ok(error_response("invalid_request", e.to_string()));
        }
    };

    let response = match request {
        Request::Execute {
            action,
            params,
            context,
        } => serde_json::to_value(dispatcher.execute(&action, params, context).await)?,
        Request::Confirm { user_id } => {
            serde_json::to_value(dispatcher.confirm_pending_action(&user_id).await)?
        }
        Request::Reject { user_id } => {
            serde_json::to_value(dispatcher.reject_pending_action(&user_id))?
        }
        Request::Pending { user_id } => {
            serde_json::to_value(dispatcher.get_pending_confirmation(&user_id))?
        }
        Request::Actions => serde_json::to_value(dispatcher.available_actions())?,
    };
    Ok(response)
}

/// Answer requests from `reader` until EOF, one response line per
/// non-blank input line. Only I/O failures end the loop early.
pub async fn serve<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            tracing::info!("Input closed");
            return Ok(());
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(dispatcher, line).await?,
            Err(e) => {
                tracing::warn!(error = %e, "Request line is not valid UTF-8");
                error_response("invalid_request", format!("request is not valid UTF-8: {}", e))
            }
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }
}
