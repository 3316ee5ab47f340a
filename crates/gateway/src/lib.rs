//! HTTP gateway for the Triagent engine.
//!
//! Endpoints:
//!
//! - `GET  /health`               — liveness and version
//! - `POST /api/v1/triage`        — run one triage turn, return the final reply
//! - `POST /api/v1/triage/stream` — run one triage turn, stream SSE events
//! - `GET  /api/v1/sessions/{id}` — ordered turn history for a session
//!
//! Built on Axum. The gateway owns no triage logic: it resolves the session,
//! replays stored history into a conversation, runs the orchestrator, and
//! persists the turns the pass appended.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, Sse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use triagent_agent::{TriageOrchestrator, TriageStreamEvent};
use triagent_config::TriageConfig;
use triagent_core::message::{Conversation, SessionId};
use triagent_core::{SessionIdAllocator, SessionStore, Severity};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: TriageOrchestrator,
    pub store: Arc<dyn SessionStore>,
    pub allocator: Arc<dyn SessionIdAllocator>,
}

pub type SharedState = Arc<GatewayState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    // Local-first deployment: the UI may sit on any port, so origins stay open
    // while methods and headers are pinned down.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/triage", post(triage_handler))
        .route("/api/v1/triage/stream", post(triage_stream_handler))
        .route("/api/v1/sessions/{id}", get(session_history_handler))
        .layer(DefaultBodyLimit::max(64 * 1024)) // patient messages are short
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

// ── Request / response DTOs ───────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct TriageRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct TriageResponse {
    session_id: String,
    severity: Severity,
    reply: String,
}

#[derive(Serialize)]
struct TurnView {
    role: &'static str,
    content: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct SessionHistoryResponse {
    session_id: String,
    turns: Vec<TurnView>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn internal_error(message: String) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Resolve the session id and replay its stored history.
///
/// A fresh id is allocated when the request carries none. A failing history
/// read degrades to an empty conversation; the store must never block triage.
async fn resolve_conversation(
    state: &GatewayState,
    session_id: Option<String>,
) -> Result<Conversation, ApiError> {
    let id = match session_id {
        Some(id) => SessionId(id),
        None => state
            .allocator
            .next_id()
            .map_err(|e| internal_error(format!("Could not allocate session id: {e}")))?,
    };

    let history = match state.store.history(&id).await {
        Ok(turns) => turns,
        Err(e) => {
            warn!(session = %id, error = %e, "History load failed, starting empty");
            Vec::new()
        }
    };

    Ok(Conversation::from_turns(id, history))
}

/// Persist every turn the triage pass appended past `new_from`.
async fn persist_new_turns(state: &GatewayState, conversation: &Conversation, new_from: usize) {
    for turn in &conversation.turns[new_from..] {
        if let Err(e) = state.store.append_turn(&conversation.id, turn).await {
            error!(session = %conversation.id, error = %e, "Failed to persist turn");
        }
    }
}

/// `POST /api/v1/triage` — one full triage turn, final reply in the body.
async fn triage_handler(
    State(state): State<SharedState>,
    Json(payload): Json<TriageRequest>,
) -> Result<Json<TriageResponse>, ApiError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let mut conversation = resolve_conversation(&state, payload.session_id).await?;
    let before = conversation.turns.len();

    info!(session = %conversation.id, "Triage request");
    let outcome = state.orchestrator.run(&mut conversation, &message).await;

    persist_new_turns(&state, &conversation, before).await;

    Ok(Json(TriageResponse {
        session_id: conversation.id.to_string(),
        severity: outcome.severity,
        reply: outcome.reply,
    }))
}

/// `POST /api/v1/triage/stream` — one triage turn as an SSE event stream.
///
/// Event types mirror the orchestrator's channel: `severity`, `chunk`,
/// `done`, `error`. The turn runs to completion and persists even when the
/// client disconnects mid-stream.
async fn triage_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<TriageRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let mut conversation = resolve_conversation(&state, payload.session_id).await?;
    info!(session = %conversation.id, "Triage stream request");

    let (tx, rx) = tokio::sync::mpsc::channel::<TriageStreamEvent>(64);
    tokio::spawn(async move {
        let before = conversation.turns.len();
        state
            .orchestrator
            .run_streaming(&mut conversation, &message, tx)
            .await;
        persist_new_turns(&state, &conversation, before).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.event_type().to_string();
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event_type).data(data))
    });

    Ok(Sse::new(stream))
}

/// `GET /api/v1/sessions/{id}` — ordered turn history.
async fn session_history_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let session_id = SessionId(id);
    let turns = state
        .store
        .history(&session_id)
        .await
        .map_err(|e| internal_error(format!("History read failed: {e}")))?;

    // The store treats unknown ids as empty; the API distinguishes them.
    if turns.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No session named {session_id}"),
            }),
        ));
    }

    Ok(Json(SessionHistoryResponse {
        session_id: session_id.to_string(),
        turns: turns
            .into_iter()
            .map(|t| TurnView {
                role: t.role.as_str(),
                content: t.content,
                timestamp: t.timestamp,
            })
            .collect(),
    }))
}

// ── Bootstrap ─────────────────────────────────────────────────────────────

/// Build the shared gateway state from configuration.
pub async fn build_state(
    config: &TriageConfig,
) -> Result<SharedState, Box<dyn std::error::Error>> {
    let provider = triagent_providers::build_from_config(config);
    let knowledge = triagent_knowledge::build_from_config(config);
    let store: Arc<dyn SessionStore> = Arc::new(
        triagent_session::SqliteSessionStore::new(&config.session.database_url).await?,
    );
    let allocator: Arc<dyn SessionIdAllocator> = Arc::new(
        triagent_session::FileCounterAllocator::new(&config.session.counter_path),
    );

    let orchestrator = TriageOrchestrator::new(provider, knowledge, config);

    Ok(Arc::new(GatewayState {
        orchestrator,
        store,
        allocator,
    }))
}

/// Start the gateway HTTP server. Runs until the process is stopped.
pub async fn serve(config: TriageConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config).await?;
    let app = build_router(state);

    info!(addr = %addr, "Triage gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use triagent_core::error::ProviderError;
    use triagent_core::message::Turn;
    use triagent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
    use triagent_knowledge::InMemoryKnowledgeStore;
    use triagent_session::{InMemoryAllocator, InMemorySessionStore};

    /// Queue-backed mock provider for gateway tests. Each triage turn pops
    /// two replies: the classifier verdict, then the synthesis text.
    struct ScriptedProvider {
        replies: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            let mut queue: Vec<String> = replies.iter().map(|s| s.to_string()).collect();
            queue.reverse();
            Self {
                replies: std::sync::Mutex::new(queue),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "gateway-mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let text = self
                .replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop()
                .expect("ScriptedProvider exhausted");
            Ok(ProviderResponse {
                message: Turn::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    fn test_state(replies: &[&str]) -> SharedState {
        let provider = Arc::new(ScriptedProvider::new(replies));
        let knowledge = Arc::new(InMemoryKnowledgeStore::new().with_demo_corpus());
        let orchestrator =
            TriageOrchestrator::new(provider, knowledge, &TriageConfig::default());
        Arc::new(GatewayState {
            orchestrator,
            store: Arc::new(InMemorySessionStore::new()),
            allocator: Arc::new(InMemoryAllocator::new()),
        })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(&[]));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn triage_returns_severity_and_reply() {
        let state = test_state(&["CRITICAL", "1. Call emergency services now."]);
        let app = build_router(state);

        let req = post_json(
            "/api/v1/triage",
            serde_json::json!({ "message": "My chest feels heavy and left arm hurts." }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["reply"], "1. Call emergency services now.");
        assert_eq!(json["session_id"], "patient_session_001");
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let app = build_router(test_state(&[]));

        let req = post_json("/api/v1/triage", serde_json::json!({ "message": "   " }));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn triage_appends_to_session_history() {
        let state = test_state(&["NORMAL", "Rest and fluids."]);

        let req = post_json(
            "/api/v1/triage",
            serde_json::json!({ "message": "Could it be the flu?" }),
        );
        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        let json = body_json(response).await;
        let session_id = json["session_id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri(format!("/api/v1/sessions/{session_id}"))
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let turns = json["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[0]["content"], "Could it be the flu?");
        assert_eq!(turns[1]["role"], "assistant");
        assert_eq!(turns[1]["content"], "Rest and fluids.");
    }

    #[tokio::test]
    async fn explicit_session_id_resumes_history() {
        let state = test_state(&["NORMAL", "First answer.", "NORMAL", "Second answer."]);

        for message in ["first question", "second question"] {
            let req = post_json(
                "/api/v1/triage",
                serde_json::json!({ "message": message, "session_id": "patient_session_042" }),
            );
            let response = build_router(state.clone()).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let req = Request::builder()
            .uri("/api/v1/sessions/patient_session_042")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(req).await.unwrap();
        let json = body_json(response).await;

        let roles: Vec<&str> = json["turns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = build_router(test_state(&[]));

        let req = Request::builder()
            .uri("/api/v1/sessions/patient_session_999")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stream_emits_tagged_events() {
        let state = test_state(&["NORMAL", "Rest and fluids."]);
        let app = build_router(state);

        let req = post_json(
            "/api/v1/triage/stream",
            serde_json::json!({ "message": "Could it be the flu?" }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("event: severity"));
        assert!(body.contains("event: chunk"));
        assert!(body.contains("event: done"));
        assert!(body.contains("Rest and fluids."));
    }
}
