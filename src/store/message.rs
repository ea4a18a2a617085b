//! Methods of Store for managing chat messages

use super::{model::Message, Store};
use crate::core::Error;

impl Store {
    pub async fn create_message(
        &self,
        room_id: i64,
        nick: &str,
        text: &str,
    ) -> Result<Message, Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
                INSERT INTO messages
                    (room_id, nick, text)
                VALUES
                    ($1, $2, $3)
                RETURNING
                    id, nick, text, room_id, created_at
            "#,
        )
        .bind(room_id)
        .bind(nick)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Get messages of the room in ascending id order, strictly below `before_id` if given
    pub async fn list_messages(
        &self,
        room_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
                SELECT id, nick, text, room_id, created_at
                FROM messages
                WHERE room_id = $1 AND ($2::BIGINT IS NULL OR id < $2)
                ORDER BY id ASC
                LIMIT $3
            "#,
        )
        .bind(room_id)
        .bind(before_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
