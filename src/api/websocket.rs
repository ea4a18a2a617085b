//! Handlers for websocket

use super::AppState;
use crate::conn::{Client, ClientConfig};
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::stream::StreamExt;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket(socket, state))
}

async fn websocket(socket: WebSocket, state: Arc<AppState>) {
    // by splitting, we can send and receive at the same time
    let (sender, receiver) = socket.split();

    let client = Client::new(
        state.hub.clone(),
        state.store.clone(),
        state.store.clone(),
        &ClientConfig::from(&state.config),
    );
    let id = client.handle().id();
    tracing::debug!("socket connect {}", id);

    client.run(sender, receiver).await;
    tracing::debug!("socket disconnect {}", id);
}
