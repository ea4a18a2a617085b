//! Defines the router of the server.

use super::{room, status, websocket, AppState};
use crate::{core::Error, util::cleanup, Config};
use axum::Router;
use tokio::time::Duration;
use tower_http::trace::TraceLayer;

/// Create router of the application.
///
/// - `config`: The global configure of the application.
pub async fn make_app(config: Config) -> Result<Router, Error> {
    let state = AppState::new(config).await?;

    cleanup::spawn_room_cleanup(
        state.store.clone(),
        Duration::from_secs(state.config.room_cleanup_interval_secs),
        time::Duration::days(state.config.room_inactive_days),
    );

    let app = Router::new()
        .merge(websocket::router())
        .merge(room::router())
        .merge(status::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
