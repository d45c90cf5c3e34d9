//! Local web chat server.
//!
//! Serves one conversation session per process. Engine events are
//! forwarded onto a broadcast channel and pushed to WebSocket clients;
//! the embedded index page renders the chat UI.
//!
//! Endpoints:
//! - GET  /                  - Chat UI
//! - GET  /api/messages      - Message history
//! - POST /api/messages      - Submit a user message
//! - GET  /api/conversation  - Session summary
//! - PUT  /api/personality   - Switch the active personality
//! - GET  /api/personalities - Available presets
//! - WS   /ws                - Conversation event stream

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;

use crate::engine::{
    ConversationEngine, ConversationSnapshot, EngineEvent, EngineOptions, SubmitOutcome,
};
use crate::models::{Message, Personality};

/// Shared server state.
pub struct ServerState {
    /// The single conversation session this server fronts.
    engine: ConversationEngine,
    /// Broadcast channel for real-time updates.
    tx: broadcast::Sender<EngineEvent>,
}

// === Request/Response Types ===

/// Request to submit a user message.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// Outcome of a submission. Rejections are reported, not errored.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    pub message_id: Option<i64>,
    pub rejection: Option<&'static str>,
}

/// Request to switch the active personality.
#[derive(Debug, Deserialize)]
pub struct PersonalityRequest {
    pub personality: String,
}

/// A personality preset for the picker.
#[derive(Debug, Serialize)]
pub struct PersonalityInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub replies: &'static [&'static str],
}

// === Server Lifecycle ===

/// Start the server on localhost.
pub async fn start_server(options: EngineOptions, port: u16) -> Result<()> {
    let (engine, mut events) = ConversationEngine::with_events(options);
    let (tx, _rx) = broadcast::channel(1000);

    // Forward engine events to WebSocket subscribers.
    let forward_tx = tx.clone();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let _ = forward_tx.send(event);
        }
    });

    println!("Session {}", engine.session_id());

    let state = Arc::new(ServerState { engine, tx });

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/api/messages", get(list_messages))
        .route("/api/messages", post(submit_message))
        .route("/api/conversation", get(get_conversation))
        .route("/api/personality", put(set_personality))
        .route("/api/personalities", get(list_personalities))
        .route("/ws", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Companion server starting on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

// === Handlers ===

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}

async fn list_messages(State(state): State<Arc<ServerState>>) -> Json<Vec<Message>> {
    Json(state.engine.messages().await)
}

async fn submit_message(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    // The reply handle is dropped here; the reply still lands in the
    // history and reaches clients through the event stream.
    let response = match state.engine.submit(&req.text).await {
        SubmitOutcome::Accepted { message_id, .. } => SubmitResponse {
            accepted: true,
            message_id: Some(message_id),
            rejection: None,
        },
        SubmitOutcome::RejectedEmpty => SubmitResponse {
            accepted: false,
            message_id: None,
            rejection: Some("empty"),
        },
        SubmitOutcome::RejectedBusy => SubmitResponse {
            accepted: false,
            message_id: None,
            rejection: Some("busy"),
        },
    };
    Json(response)
}

async fn get_conversation(State(state): State<Arc<ServerState>>) -> Json<ConversationSnapshot> {
    Json(state.engine.snapshot().await)
}

async fn set_personality(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<PersonalityRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let personality: Personality = req
        .personality
        .parse()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    state.engine.set_personality(personality).await;
    Ok(Json(serde_json::json!({ "personality": personality.as_str() })))
}

async fn list_personalities() -> Json<Vec<PersonalityInfo>> {
    let presets = Personality::ALL
        .into_iter()
        .map(|p| PersonalityInfo {
            id: p.as_str(),
            label: p.label(),
            replies: p.fallback_replies(),
        })
        .collect();
    Json(presets)
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

async fn handle_websocket(mut socket: axum::extract::ws::WebSocket, state: Arc<ServerState>) {
    use axum::extract::ws::Message;

    let mut events = BroadcastStream::new(state.tx.subscribe());

    while let Some(Ok(event)) = events.next().await {
        if let Ok(json) = serde_json::to_string(&event) {
            if socket.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    }
}
