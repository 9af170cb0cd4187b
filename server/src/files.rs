//! Workspace file routes.
//!
//! Both routes answer `{ok: true, ...}` on success and `{ok: false, error}`
//! with HTTP 400 otherwise. A read that fails for any reason is reported as
//! a missing file, never as an error.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use iip_contracts::error::ConsoleError;
use iip_core::{FileRead, Workspace};

use crate::api::SharedState;

// ── Payloads ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Serialize)]
pub struct ReadReply {
    pub ok: bool,
    #[serde(flatten)]
    pub file: FileRead,
}

// ── Error handling ────────────────────────────────────────────────────────────

pub struct FileError(String);

impl From<ConsoleError> for FileError {
    fn from(e: ConsoleError) -> Self {
        FileError(e.to_string())
    }
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(serde_json::json!({"ok": false, "error": self.0}))).into_response()
    }
}

fn parse_body(body: &Bytes) -> Result<Value, FileError> {
    serde_json::from_slice(body).map_err(|e| FileError(e.to_string()))
}

/// The value at `key`, if it is a string.
fn string_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn read_path(state: &SharedState, path: Option<&str>) -> Result<Json<ReadReply>, FileError> {
    let path = path.ok_or(ConsoleError::InvalidPath)?;
    let file = state.workspace.read(path)?;
    debug!(path, exists = file.exists, "file read");
    Ok(Json(ReadReply { ok: true, file }))
}

pub async fn read_file_query(
    State(state): State<SharedState>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<ReadReply>, FileError> {
    read_path(&state, query.path.as_deref())
}

pub async fn read_file_body(State(state): State<SharedState>, body: Bytes) -> Result<Json<ReadReply>, FileError> {
    let body = parse_body(&body)?;
    read_path(&state, string_field(&body, "path"))
}

/// Accepts the target as `filePath` or `path`; `filePath` wins when both are set.
pub async fn write_file(State(state): State<SharedState>, body: Bytes) -> Result<Json<Value>, FileError> {
    let body = parse_body(&body)?;

    let target = match body.get("filePath") {
        Some(v) if !v.is_null() => v.as_str(),
        _ => string_field(&body, "path"),
    };
    let path = target.filter(|p| !p.is_empty()).ok_or(ConsoleError::InvalidPath)?;
    let content = string_field(&body, "content").ok_or_else(|| FileError("Invalid content".to_string()))?;

    if let Err(e) = state.workspace.write(path, content) {
        warn!(path, error = %e, "file write failed");
        return Err(e.into());
    }
    debug!(path, bytes = content.len(), "file written");
    Ok(Json(serde_json::json!({"ok": true})))
}
