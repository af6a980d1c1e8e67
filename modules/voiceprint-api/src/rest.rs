use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value;
use tracing::warn;

use crate::tools::ToolOutput;
use crate::AppState;

pub async fn api_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "tools": state.tools.definitions() }))
}

/// Run a tool. Tool-level failures are still 200 with `is_error: true`;
/// only an unknown tool or an unparseable body changes the status.
pub async fn api_call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let args: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        match serde_json::from_slice(&body) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %name, error = %e, "Rejected tool call body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ToolOutput::error(format!("Request body is not valid JSON: {e}"))),
                )
                    .into_response();
            }
        }
    };

    match state.tools.call(&name, args).await {
        Some(output) => (StatusCode::OK, Json(output)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ToolOutput::error(format!("Unknown tool '{name}'"))),
        )
            .into_response(),
    }
}
