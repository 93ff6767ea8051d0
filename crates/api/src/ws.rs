//! Socket room hub and websocket endpoint.
//!
//! Each username maps to a room; every live connection for that user holds a
//! receiver on the room's broadcast channel. A refresh signal carries no
//! payload, is at-least-once, and only means "your dashboard data is stale".

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info};

use cuzdan_core::notify::Notifier;
use cuzdan_shared::types::Username;

use crate::AppState;

/// Buffered signals per room; a lagging client just refetches once anyway.
const ROOM_CAPACITY: usize = 16;

/// Room registry mapping usernames to live refresh channels.
#[derive(Debug, Default)]
pub struct SocketHub {
    rooms: DashMap<String, broadcast::Sender<()>>,
}

impl SocketHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the room for a username, creating it on first subscribe.
    #[must_use]
    pub fn subscribe(&self, username: &str) -> broadcast::Receiver<()> {
        self.rooms
            .entry(username.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Number of live connections in a user's room.
    #[must_use]
    pub fn connection_count(&self, username: &str) -> usize {
        self.rooms
            .get(username)
            .map_or(0, |tx| tx.receiver_count())
    }
}

impl Notifier for SocketHub {
    fn notify(&self, username: &str) {
        let Some(tx) = self.rooms.get(username) else {
            return;
        };

        if tx.send(()).is_err() {
            // Last connection is gone; drop the empty room.
            drop(tx);
            self.rooms
                .remove_if(username, |_, tx| tx.receiver_count() == 0);
        }
    }
}

/// Creates the websocket routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws/{username}", get(ws_handler))
}

/// GET `/ws/{username}` - Upgrade and join the user's room.
async fn ws_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    match Username::parse(&username) {
        Ok(username) => ws
            .on_upgrade(move |socket| handle_socket(socket, state, username.into_inner()))
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "error": "invalid_username",
                "message": e.to_string()
            })),
        )
            .into_response(),
    }
}

/// Pumps refresh signals into the socket until either side hangs up.
async fn handle_socket(socket: WebSocket, state: AppState, username: String) {
    info!(username = %username, "Socket connected");
    let mut signals = state.hub.subscribe(&username);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Ok(()) => {
                    if sink.send(Message::Text("refresh".into())).await.is_err() {
                        break;
                    }
                }
                // Missed signals collapse into one refresh hint.
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if sink.send(Message::Text("refresh".into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients send nothing meaningful; ignore pings and chatter.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(username = %username, "Socket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let hub = SocketHub::new();
        let mut rx = hub.subscribe("alice");

        hub.notify("alice");

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_notify_fans_out_to_all_connections() {
        let hub = SocketHub::new();
        let mut first = hub.subscribe("alice");
        let mut second = hub.subscribe("alice");

        hub.notify("alice");

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
        assert_eq!(hub.connection_count("alice"), 2);
    }

    #[tokio::test]
    async fn test_notify_unknown_room_is_noop() {
        let hub = SocketHub::new();
        hub.notify("nobody");
        assert_eq!(hub.connection_count("nobody"), 0);
    }

    #[tokio::test]
    async fn test_rooms_are_per_username() {
        let hub = SocketHub::new();
        let mut alice = hub.subscribe("alice");
        let mut bob = hub.subscribe("bob");

        hub.notify("alice");

        assert!(alice.recv().await.is_ok());
        assert!(bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_room_is_dropped_after_notify() {
        let hub = SocketHub::new();
        let rx = hub.subscribe("alice");
        drop(rx);

        hub.notify("alice");

        assert!(!hub.rooms.contains_key("alice"));
    }
}
