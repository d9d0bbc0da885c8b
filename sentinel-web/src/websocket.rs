//! WebSocket handler for real-time investigation events
//!
//! Every connection first receives the current state, then one message per
//! notification and state change. Clients may send `{"type": "ping"}` and get
//! a pong back.

use crate::handlers::InvestigationResponse;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use sentinel_applications::{InvestigationEvent, Notification};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// WebSocket message types
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full investigation state after a change
    StateChanged { state: serde_json::Value },
    /// Transient user notification
    Notification { notification: Notification },
    /// Ping/Pong for connection health
    Ping {
        timestamp: Option<chrono::DateTime<chrono::Utc>>,
    },
    Pong {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Error message
    Error { message: String },
}

impl WsMessage {
    fn state(state: InvestigationResponse) -> Self {
        let state = serde_json::to_value(state).unwrap_or_default();
        WsMessage::StateChanged { state }
    }

    fn to_text(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                warn!("Failed to serialize WebSocket message: {}", e);
                None
            }
        }
    }
}

impl From<InvestigationEvent> for WsMessage {
    fn from(event: InvestigationEvent) -> Self {
        match event {
            InvestigationEvent::StateChanged(snapshot) => WsMessage::state(snapshot.into()),
            InvestigationEvent::Notification(notification) => {
                WsMessage::Notification { notification }
            }
        }
    }
}

/// Investigation event stream
pub async fn events_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_events_socket(socket, state))
}

async fn handle_events_socket(socket: WebSocket, state: AppState) {
    info!("New events WebSocket connection established");

    let investigations = state.investigations();
    // Subscribe before reading the snapshot so no change falls in between
    let mut events = investigations.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let initial = WsMessage::state(investigations.snapshot().await.into());
    if let Some(message) = initial.to_text() {
        if sender.send(message).await.is_err() {
            return;
        }
    }

    loop {
        let outgoing = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => WsMessage::from(event),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Events WebSocket lagged, resending state");
                    WsMessage::state(investigations.snapshot().await.into())
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<WsMessage>(text.as_str()) {
                    Ok(WsMessage::Ping { .. }) => WsMessage::Pong {
                        timestamp: chrono::Utc::now(),
                    },
                    Ok(_) => continue,
                    Err(e) => WsMessage::Error {
                        message: format!("Invalid message: {}", e),
                    },
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Events WebSocket connection closed");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("Events WebSocket error: {}", e);
                    break;
                }
            },
        };

        if let Some(message) = outgoing.to_text() {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    }
}
