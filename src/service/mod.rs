//! Collaborators the connection layer calls into for rooms and messages.

use crate::{core::Error, store::Message};
use async_trait::async_trait;

mod message;
mod room;

#[async_trait]
pub trait RoomService: Send + Sync {
    /// Whether `password` opens the room; rooms without a password accept anything
    async fn check_password(&self, room_id: i64, password: &str) -> Result<bool, Error>;

    async fn touch_activity(&self, room_id: i64) -> Result<(), Error>;

    /// Soft delete rooms idle for longer than `older_than`, returning how many were hit
    async fn soft_delete_inactive(&self, older_than: time::Duration) -> Result<u64, Error>;
}

#[async_trait]
pub trait MessageService: Send + Sync {
    async fn create_message(&self, room_id: i64, nick: &str, text: &str)
        -> Result<Message, Error>;

    /// Messages of a room, oldest first, strictly below `before_id` when given
    async fn list_messages(
        &self,
        room_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, Error>;
}
