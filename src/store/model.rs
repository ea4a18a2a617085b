use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

// ========================= // Room // ========================= //

#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub password_hash: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub last_active_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct RoomInfo {
    pub id: i64,
    pub name: String,
    pub has_password: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active_at: OffsetDateTime,
}

impl From<Room> for RoomInfo {
    fn from(value: Room) -> Self {
        Self {
            id: value.id,
            name: value.name,
            has_password: value.password_hash.is_some(),
            created_at: value.created_at,
            updated_at: value.updated_at,
            last_active_at: value.last_active_at,
        }
    }
}

// ========================= // Message // ========================= //

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub nick: String,
    pub text: String,
    pub room_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
