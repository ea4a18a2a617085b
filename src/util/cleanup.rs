//! Periodic job retiring rooms nobody has used for a while

use crate::{core::constant::ROOM_CLEANUP_INTERVAL_SECS, service::RoomService};
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Duration, Instant},
};

/// Spawn a task which soft deletes inactive rooms every `every`.
///
/// Failures are logged and the job keeps running. A zero period falls back to
/// the default interval.
pub fn spawn_room_cleanup(
    rooms: Arc<dyn RoomService>,
    every: Duration,
    older_than: time::Duration,
) -> JoinHandle<()> {
    let every = if every.is_zero() {
        Duration::from_secs(ROOM_CLEANUP_INTERVAL_SECS)
    } else {
        every
    };

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);

        loop {
            ticker.tick().await;

            match rooms.soft_delete_inactive(older_than).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("soft deleted {} inactive rooms", n),
                Err(e) => tracing::error!("failed to clean up inactive rooms: {}", e),
            }
        }
    })
}
