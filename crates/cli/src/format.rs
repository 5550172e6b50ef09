//! Response → string formatting.
//!
//! Two modes:
//! - **Human** (default): `(201) {pretty body}`, `(204)` for empty bodies
//! - **JSON** (`--json`): one compact `{"status": .., "body": ..}` per line

use galaxy_executor::Response;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a response.
pub fn format_response(response: &Response, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string(response)
            .unwrap_or_else(|e| format!("{{\"status\": 500, \"body\": \"{}\"}}", e)),
        OutputMode::Human => match &response.body {
            Some(body) => format!(
                "({}) {}",
                response.status.as_u16(),
                serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
            ),
            None => format!("({})", response.status.as_u16()),
        },
    }
}

/// Format a CLI-level error (bad arguments, unreadable files).
pub fn format_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({ "error": message }).to_string(),
        OutputMode::Human => format!("(error) {}", message),
    }
}
