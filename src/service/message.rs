use super::MessageService;
use crate::{
    core::{
        constant::{HISTORY_PAGE_SIZE, MAX_PAGE_SIZE},
        Error,
    },
    store::{Message, Store},
};
use async_trait::async_trait;

#[async_trait]
impl MessageService for Store {
    async fn create_message(
        &self,
        room_id: i64,
        nick: &str,
        text: &str,
    ) -> Result<Message, Error> {
        Store::create_message(self, room_id, nick, text).await
    }

    async fn list_messages(
        &self,
        room_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        Store::list_messages(self, room_id, before_id, page_limit(limit)).await
    }
}

/// Limits outside `1..=MAX_PAGE_SIZE` fall back to one history page
fn page_limit(limit: i64) -> i64 {
    if (1..=MAX_PAGE_SIZE).contains(&limit) {
        limit
    } else {
        HISTORY_PAGE_SIZE
    }
}
