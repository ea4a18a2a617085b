//! Handlers for chat rooms

use super::{
    extractor::{RoomId, ValidJson, ValidQuery},
    AppState, CreateRoomRequest, ListRoomsQuery,
};
use crate::{core::Error, store::RoomInfo, util::password};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;

// ========================// Room Router //======================== //

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:id", get(get_room))
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomInfo>), Error> {
    let password_hash = match req.password() {
        Some(p) => Some(password::hash_password(p)?),
        None => None,
    };
    let room = state.store.create_room(&req.name, password_hash).await?;

    Ok((StatusCode::CREATED, Json(room.into())))
}

async fn list_rooms(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ListRoomsQuery>,
) -> Result<Json<Vec<RoomInfo>>, Error> {
    let rooms = state
        .store
        .list_rooms(query.limit(), query.order(), query.before_id)
        .await?;

    Ok(Json(rooms.into_iter().map(RoomInfo::from).collect()))
}

async fn get_room(
    State(state): State<Arc<AppState>>,
    RoomId(id): RoomId,
) -> Result<Json<RoomInfo>, Error> {
    let room = state.store.get_room(id).await?;
    Ok(Json(room.into()))
}
