//! Data objects defined for HTTP request and response

use crate::core::{
    constant::{DEFAULT_ROOM_ORDER, DEFAULT_ROOM_PAGE_SIZE},
    validator as VAL,
};
use serde::Deserialize;
use validator::Validate;

// ============================== // Room // ============================== //

#[derive(Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(
        length(min = 3, max = 30, message = "Must be between 3 and 30 characters"),
        custom = "VAL::validate_not_blank"
    )]
    pub name: String,
    #[validate(length(max = 30, message = "Must be at most 30 characters"))]
    pub password: Option<String>,
}

impl CreateRoomRequest {
    /// Password to protect the room with; empty means an open room
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Deserialize, Validate)]
pub struct ListRoomsQuery {
    #[validate(range(min = 1, max = 100, message = "Must be between 1 and 100"))]
    pub limit: Option<i64>,
    pub before_id: Option<i64>,
    #[validate(custom = "VAL::validate_room_order")]
    pub order: Option<String>,
}

impl ListRoomsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_ROOM_PAGE_SIZE)
    }

    pub fn order(&self) -> &str {
        self.order.as_deref().unwrap_or(DEFAULT_ROOM_ORDER)
    }
}
