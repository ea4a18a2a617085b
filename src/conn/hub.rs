use super::{
    client::ClientHandle,
    event::OutgoingEvent,
    state::{HubState, HubStatus},
};
use crate::core::Error;
use tokio::sync::{mpsc, oneshot};

/// Requests processed in order by the hub loop
pub enum HubCommand {
    Register(ClientHandle),
    Unregister(ClientHandle),
    Broadcast(i64, OutgoingEvent),
    Status(oneshot::Sender<HubStatus>),
}

/// Handle to the hub loop
///
/// Every mutation and fan-out goes through one queue, so the loop owning
/// `HubState` sees them in submission order and needs no locking.
#[derive(Clone)]
pub struct Hub {
    tx: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// Start the hub loop on the runtime
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(HubState::default().serve(rx));
        Self { tx }
    }

    pub async fn register(&self, client: ClientHandle) -> Result<(), Error> {
        self.tx.send(HubCommand::Register(client)).await?;
        Ok(())
    }

    pub async fn unregister(&self, client: ClientHandle) -> Result<(), Error> {
        self.tx.send(HubCommand::Unregister(client)).await?;
        Ok(())
    }

    /// Send event to all clients in the room
    pub async fn broadcast(&self, room_id: i64, event: OutgoingEvent) -> Result<(), Error> {
        if room_id == 0 {
            return Ok(());
        }
        self.tx.send(HubCommand::Broadcast(room_id, event)).await?;
        Ok(())
    }

    /// Snapshot of the registry, taken after everything submitted before it
    pub async fn status(&self) -> Result<HubStatus, Error> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(HubCommand::Status(tx)).await?;
        Ok(rx.await?)
    }
}
