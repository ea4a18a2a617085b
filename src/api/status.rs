use super::AppState;
use crate::{conn::HubStatus, core::Error};
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/hub/status", get(hub_status))
}

async fn hub_status(State(state): State<Arc<AppState>>) -> Result<Json<HubStatus>, Error> {
    Ok(Json(state.hub.status().await?))
}
