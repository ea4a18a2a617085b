//! Methods of Store for managing chat rooms

use super::{model::Room, Store};
use crate::core::{
    constant::{DEFAULT_ROOM_ORDER, ROOM_ORDERS},
    Error, ResultExt,
};
use time::{Duration, OffsetDateTime};

// ========================// Room Store //======================== //

impl Store {
    pub async fn create_room(
        &self,
        name: &str,
        password_hash: Option<String>,
    ) -> Result<Room, Error> {
        let room = sqlx::query_as::<_, Room>(
            r#"
                INSERT INTO rooms
                    (name, password_hash)
                VALUES
                    ($1, $2)
                RETURNING
                    id, name, password_hash, created_at, updated_at, last_active_at
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(room)
    }

    /// Get a room which has not been soft deleted
    pub async fn get_room(&self, room_id: i64) -> Result<Room, Error> {
        sqlx::query_as::<_, Room>(
            r#"
                SELECT id, name, password_hash, created_at, updated_at, last_active_at
                FROM rooms
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await
        .not_found()
    }

    /// List rooms with cursor pagination on id
    pub async fn list_rooms(
        &self,
        limit: i64,
        order: &str,
        before_id: Option<i64>,
    ) -> Result<Vec<Room>, Error> {
        let sql = format!(
            r#"
                SELECT id, name, password_hash, created_at, updated_at, last_active_at
                FROM rooms
                WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR id < $1)
                ORDER BY {}
                LIMIT $2
            "#,
            order_clause(order)
        );

        let rooms = sqlx::query_as::<_, Room>(&sql)
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rooms)
    }

    pub async fn touch_room_activity(&self, room_id: i64) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
                UPDATE rooms
                SET updated_at = now(), last_active_at = now()
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(room_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Soft delete rooms that have been inactive longer than `older_than`
    ///
    /// Returns the number of rooms marked as deleted.
    pub async fn soft_delete_inactive_rooms(&self, older_than: Duration) -> Result<u64, Error> {
        let threshold = OffsetDateTime::now_utc() - older_than;

        let result = sqlx::query(
            r#"
                UPDATE rooms
                SET deleted_at = now()
                WHERE last_active_at < $1 AND deleted_at IS NULL
            "#,
        )
        .bind(threshold)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Map a requested ordering onto a static SQL fragment
fn order_clause(order: &str) -> &'static str {
    ROOM_ORDERS
        .iter()
        .find(|&&o| o == order)
        .copied()
        .unwrap_or(DEFAULT_ROOM_ORDER)
}
