//! Session API: router, shared state, and the console-backed handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use iip_contracts::{
    approval::Confirmation,
    artifacts::ArtifactPreview,
    error::{ConsoleError, ConsoleResult},
    execution::Progress,
    pipeline::{ActionId, StepId},
};
use iip_core::{Console, ConsoleConfig, FsWorkspace, SystemClock};

use crate::files;

// ── Shared application state ──────────────────────────────────────────────────

pub struct AppState {
    pub console: Mutex<Console>,
    /// Backs the file routes. The console writes through its own handle on
    /// the same root.
    pub workspace: FsWorkspace,
}

impl AppState {
    pub fn new(config: ConsoleConfig, workspace: FsWorkspace) -> ConsoleResult<Self> {
        let console = Console::new(config, Box::new(SystemClock), Box::new(workspace.clone()))?;
        Ok(Self { console: Mutex::new(console), workspace })
    }
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub step_id: StepId,
    pub action_id: ActionId,
}

#[derive(Deserialize)]
pub struct RequirementRequest {
    pub requirement: String,
}

// ── Error handling ────────────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<ConsoleError> for ApiError {
    fn from(e: ConsoleError) -> Self {
        let msg = e.to_string();
        match e {
            ConsoleError::StepNotFound { .. } | ConsoleError::ActionNotFound { .. } => ApiError::NotFound(msg),
            ConsoleError::ApprovalPending { .. }
            | ConsoleError::NoPendingApproval
            | ConsoleError::MissingBuildArtifacts
            | ConsoleError::Unsettled { .. } => ApiError::Conflict(msg),
            ConsoleError::ConfirmationRejected { .. } | ConsoleError::InvalidPath => ApiError::BadRequest(msg),
            ConsoleError::WriteFailed { .. } | ConsoleError::ConfigError { .. } => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/files/read", get(files::read_file_query).post(files::read_file_body))
        .route("/api/files/write", post(files::write_file))
        .route("/api/session", get(get_session))
        .route("/api/session/requirement", put(set_requirement))
        .route("/api/session/execute", post(execute_action))
        .route("/api/session/steps/{id}/skip", post(skip_step))
        .route("/api/session/approval/approve", post(approve))
        .route("/api/session/approval/cancel", post(cancel))
        .route("/api/session/artifacts/preview", post(preview_artifacts))
        .route("/api/session/artifacts/save", post(save_artifacts))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn lock(state: &AppState) -> Result<MutexGuard<'_, Console>, ApiError> {
    state.console.lock().map_err(|_| ApiError::Internal("Lock poisoned".into()))
}

fn snapshot(console: &Console) -> Result<Json<Value>, ApiError> {
    serde_json::to_value(console.snapshot())
        .map(Json)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize session: {}", e)))
}

/// Wait out a started action with the console unlocked, then settle it.
///
/// The wait and the settle run on their own task, so a caller that goes
/// away mid-delay does not leave the step `Running` or skip its audit entry.
async fn finish(state: &SharedState, progress: Progress) -> Result<Progress, ApiError> {
    let ticket = match progress {
        Progress::Running { ticket } => ticket,
        other => return Ok(other),
    };

    let state = Arc::clone(state);
    let settle = tokio::spawn(async move {
        tokio::time::sleep(ticket.delay).await;
        let mut console = lock(&state)?;
        console.complete(ticket).map_err(ApiError::from)
    });

    let dispatch = settle
        .await
        .map_err(|e| ApiError::Internal(format!("Action task failed: {}", e)))??;
    Ok(Progress::Done { dispatch })
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_session(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let console = lock(&state)?;
    snapshot(&console)
}

async fn set_requirement(
    State(state): State<SharedState>,
    Json(req): Json<RequirementRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut console = lock(&state)?;
    console.set_requirement(req.requirement);
    snapshot(&console)
}

async fn execute_action(
    State(state): State<SharedState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<Progress>, ApiError> {
    let progress = {
        let mut console = lock(&state)?;
        console.dispatch_by_id(req.step_id, req.action_id)?
    };
    debug!(step_id = %req.step_id, action_id = %req.action_id, "execute requested");
    Ok(Json(finish(&state, progress).await?))
}

async fn skip_step(State(state): State<SharedState>, Path(id): Path<StepId>) -> Result<Json<Value>, ApiError> {
    let mut console = lock(&state)?;
    console.skip_step(id)?;
    snapshot(&console)
}

async fn approve(
    State(state): State<SharedState>,
    Json(confirmation): Json<Confirmation>,
) -> Result<Json<Progress>, ApiError> {
    let progress = {
        let mut console = lock(&state)?;
        console.approve(&confirmation)?
    };
    Ok(Json(finish(&state, progress).await?))
}

async fn cancel(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let cancelled = lock(&state)?.cancel().ok_or(ConsoleError::NoPendingApproval)?;
    Ok(Json(serde_json::json!({"cancelled": cancelled})))
}

async fn preview_artifacts(State(state): State<SharedState>) -> Result<Json<Vec<ArtifactPreview>>, ApiError> {
    let previews = lock(&state)?.preview_build_artifacts()?;
    Ok(Json(previews))
}

async fn save_artifacts(State(state): State<SharedState>) -> Result<Json<Progress>, ApiError> {
    let progress = lock(&state)?.request_save_artifacts()?;
    Ok(Json(progress))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use iip_contracts::pipeline::{StepName, StepState};
    use tower::ServiceExt;

    fn test_app(root: &std::path::Path) -> (Router, SharedState) {
        test_app_with(root, ConsoleConfig { delay_scale: 0.0, ..ConsoleConfig::default() })
    }

    fn test_app_with(root: &std::path::Path, config: ConsoleConfig) -> (Router, SharedState) {
        let state = Arc::new(AppState::new(config, FsWorkspace::new(root)).unwrap());
        (api_router().with_state(state.clone()), state)
    }

    /// Poll until `step` leaves `Running`, for at most two seconds.
    async fn wait_settled(state: &SharedState, step: StepName) -> Option<StepState> {
        for _ in 0..40 {
            let current = {
                let console = state.console.lock().unwrap();
                console.state().step_named(step).map(|s| s.state)
            };
            if current != Some(StepState::Running) {
                return current;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        Some(StepState::Running)
    }

    async fn body_json(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn execute_request(state: &SharedState, step: StepName, action: &str) -> Request<Body> {
        let (step_id, action) = state.console.lock().unwrap().find_action(step, action).unwrap();
        post_json(
            "/api/session/execute",
            serde_json::json!({"stepId": step_id, "actionId": action.id}),
        )
    }

    /// Execute an action, approving it if the gate opens.
    async fn run_through(app: &Router, state: &SharedState, step: StepName, action: &str) -> Value {
        let response = app.clone().oneshot(execute_request(state, step, action)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let progress = body_json(response.into_body()).await;
        if progress["status"] != "awaitingApproval" {
            return progress;
        }
        let response = app
            .clone()
            .oneshot(post_json("/api/session/approval/approve", serde_json::json!({"typed": "APPROVE"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response.into_body()).await
    }

    // ── Health ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    // ── File routes ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_read_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let response = app.oneshot(get("/api/files/read?path=nope/missing.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body, serde_json::json!({"ok": true, "exists": false, "content": ""}));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let write = post_json(
            "/api/files/write",
            serde_json::json!({"filePath": "deep/nested/a.txt", "content": "hello"}),
        );
        let response = app.clone().oneshot(write).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response.into_body()).await, serde_json::json!({"ok": true}));
        assert_eq!(std::fs::read_to_string(dir.path().join("deep/nested/a.txt")).unwrap(), "hello");

        let read = post_json("/api/files/read", serde_json::json!({"path": "deep/nested/a.txt"}));
        let body = body_json(app.oneshot(read).await.unwrap().into_body()).await;
        assert_eq!(body["exists"], true);
        assert_eq!(body["content"], "hello");
    }

    #[tokio::test]
    async fn test_write_accepts_path_key() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let write = post_json("/api/files/write", serde_json::json!({"path": "b.txt", "content": ""}));
        let response = app.oneshot(write).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), "");
    }

    #[tokio::test]
    async fn test_file_route_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let cases = [
            (post_json("/api/files/read", serde_json::json!({})), "Invalid path"),
            (post_json("/api/files/read", serde_json::json!({"path": ""})), "Invalid path"),
            (post_json("/api/files/write", serde_json::json!({"content": "x"})), "Invalid path"),
            (post_json("/api/files/write", serde_json::json!({"path": "c.txt"})), "Invalid content"),
            (post_json("/api/files/write", serde_json::json!({"path": "c.txt", "content": 7})), "Invalid content"),
            (get("/api/files/read"), "Invalid path"),
        ];
        for (request, message) in cases {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response.into_body()).await;
            assert_eq!(body, serde_json::json!({"ok": false, "error": message}));
        }
        assert!(!dir.path().join("c.txt").exists());
    }

    #[tokio::test]
    async fn test_root_path_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        for request in [get("/api/files/read?path=/"), post_json("/api/files/read", serde_json::json!({"path": "  "}))] {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response.into_body()).await;
            assert_eq!(body, serde_json::json!({"ok": true, "exists": false, "content": ""}));
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/api/files/write")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].is_string());
    }

    // ── Session routes ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_session_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let body = body_json(app.oneshot(get("/api/session")).await.unwrap().into_body()).await;
        assert_eq!(body["env"], "DEV");
        assert_eq!(body["steps"].as_array().unwrap().len(), 7);
        assert_eq!(body["steps"][0]["state"], "Pending");
        assert!(body["pendingApproval"].is_null());
        assert!(body["audit"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_automated_action() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app(dir.path());

        let progress = run_through(&app, &state, StepName::Intent, "Compile Intent").await;
        assert_eq!(progress["status"], "done");
        assert_eq!(progress["dispatch"]["type"], "completed");
        assert_eq!(progress["dispatch"]["state"], "Success");

        let body = body_json(app.oneshot(get("/api/session")).await.unwrap().into_body()).await;
        assert_eq!(body["steps"][0]["state"], "Success");
        assert_eq!(body["audit"][0]["actionName"], "Compile Intent");
    }

    #[tokio::test]
    async fn test_gated_action_waits_for_approval() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app(dir.path());

        let response = app
            .clone()
            .oneshot(execute_request(&state, StepName::Deploy, "Deploy Instance"))
            .await
            .unwrap();
        let progress = body_json(response.into_body()).await;
        assert_eq!(progress["status"], "awaitingApproval");

        // Dispatch is suspended while the request is pending.
        let response = app
            .clone()
            .oneshot(execute_request(&state, StepName::Intent, "Compile Intent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let wrong = post_json("/api/session/approval/approve", serde_json::json!({"typed": "yes"}));
        let response = app.clone().oneshot(wrong).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let right = post_json("/api/session/approval/approve", serde_json::json!({"typed": "APPROVE"}));
        let progress = body_json(app.oneshot(right).await.unwrap().into_body()).await;
        assert_eq!(progress["status"], "done");
        assert_eq!(progress["dispatch"]["state"], "Failed");
        assert!(state.console.lock().unwrap().pending_approval().is_none());
    }

    #[tokio::test]
    async fn test_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app(dir.path());

        let response = app.clone().oneshot(post_json("/api/session/approval/cancel", Value::Null)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        app.clone()
            .oneshot(execute_request(&state, StepName::Design, "Generate/Update API Spec"))
            .await
            .unwrap();
        let response = app.oneshot(post_json("/api/session/approval/cancel", Value::Null)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["cancelled"]["action"]["name"], "Generate/Update API Spec");
        assert!(state.console.lock().unwrap().state().audit.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path());

        let request = post_json(
            "/api/session/execute",
            serde_json::json!({"stepId": StepId::new(), "actionId": ActionId::new()}),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let uri = format!("/api/session/steps/{}/skip", StepId::new());
        let response = app.oneshot(post_json(&uri, Value::Null)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skip_and_requirement() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app(dir.path());
        let observe = state.console.lock().unwrap().state().step_named(StepName::Observe).unwrap().id;

        let uri = format!("/api/session/steps/{observe}/skip");
        let body = body_json(app.clone().oneshot(post_json(&uri, Value::Null)).await.unwrap().into_body()).await;
        assert_eq!(body["steps"][5]["state"], "Skipped");

        let request = Request::builder()
            .method("PUT")
            .uri("/api/session/requirement")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({"requirement": "Expose balances"}).to_string()))
            .unwrap();
        let body = body_json(app.oneshot(request).await.unwrap().into_body()).await;
        assert_eq!(body["requirement"], "Expose balances");
    }

    #[tokio::test]
    async fn test_artifact_preview_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app(dir.path());

        let response = app.clone().oneshot(post_json("/api/session/artifacts/preview", Value::Null)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        run_through(&app, &state, StepName::Intent, "Compile Intent").await;
        run_through(&app, &state, StepName::Design, "Generate/Update API Spec").await;
        run_through(&app, &state, StepName::Build, "Generate Mule App").await;

        let response = app.clone().oneshot(post_json("/api/session/artifacts/preview", Value::Null)).await.unwrap();
        let previews = body_json(response.into_body()).await;
        assert_eq!(previews.as_array().unwrap().len(), 3);
        assert_eq!(previews[0]["unchanged"], false);

        let response = app.clone().oneshot(post_json("/api/session/artifacts/save", Value::Null)).await.unwrap();
        assert_eq!(body_json(response.into_body()).await["status"], "awaitingApproval");

        let approve = post_json("/api/session/approval/approve", serde_json::json!({"typed": "APPROVE"}));
        let progress = body_json(app.oneshot(approve).await.unwrap().into_body()).await;
        assert_eq!(progress["dispatch"]["type"], "saved");
        assert_eq!(progress["dispatch"]["written"].as_array().unwrap().len(), 3);
        assert!(dir.path().join("artifacts/mule/mule-app.xml").exists());
        assert!(dir.path().join("artifacts/mule/config.properties").exists());
    }

    // ── Abandoned requests ────────────────────────────────────────────────────

    /// A caller that gives up mid-delay does not stop the action from settling.
    #[tokio::test]
    async fn test_dropped_execute_still_settles() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app_with(dir.path(), ConsoleConfig::default());

        let request = execute_request(&state, StepName::Intent, "Compile Intent");
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), app.oneshot(request)).await;
        assert!(outcome.is_err());

        assert_eq!(wait_settled(&state, StepName::Intent).await, Some(StepState::Success));
        let console = state.console.lock().unwrap();
        assert_eq!(console.state().audit.len(), 1);
        assert_eq!(console.state().audit.latest().unwrap().action_name, "Compile Intent");
    }

    /// A dropped approval still runs the approved action exactly once.
    #[tokio::test]
    async fn test_dropped_approval_still_runs_action() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = test_app_with(dir.path(), ConsoleConfig::default());

        let response = app
            .clone()
            .oneshot(execute_request(&state, StepName::Debug, "Apply Patch (Commit)"))
            .await
            .unwrap();
        assert_eq!(body_json(response.into_body()).await["status"], "awaitingApproval");

        let approve = post_json("/api/session/approval/approve", serde_json::json!({"typed": "APPROVE"}));
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), app.oneshot(approve)).await;
        assert!(outcome.is_err());

        assert_eq!(wait_settled(&state, StepName::Debug).await, Some(StepState::Success));
        let console = state.console.lock().unwrap();
        assert!(console.pending_approval().is_none());
        assert_eq!(console.state().audit.len(), 1);
        assert!(dir.path().join("artifacts/mule/config.properties").exists());
    }
}
