use super::RoomService;
use crate::{core::Error, store::Store, util::password};
use async_trait::async_trait;

#[async_trait]
impl RoomService for Store {
    async fn check_password(&self, room_id: i64, password: &str) -> Result<bool, Error> {
        let room = self.get_room(room_id).await?;

        match room.password_hash {
            Some(hash) => password::verify_password(password, &hash),
            None => Ok(true),
        }
    }

    async fn touch_activity(&self, room_id: i64) -> Result<(), Error> {
        self.touch_room_activity(room_id).await
    }

    async fn soft_delete_inactive(&self, older_than: time::Duration) -> Result<u64, Error> {
        self.soft_delete_inactive_rooms(older_than).await
    }
}
