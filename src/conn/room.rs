use super::{client::ClientHandle, event::OutgoingEvent};
use std::collections::HashMap;
use uuid::Uuid;

/// Connected members of one room; only lives while someone is in it
pub struct RoomRuntime {
    id: i64,
    members: HashMap<Uuid, ClientHandle>,
}

impl RoomRuntime {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            members: HashMap::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn insert(&mut self, client: ClientHandle) {
        self.members.insert(client.id(), client);
    }

    pub fn remove(&mut self, id: &Uuid) -> bool {
        self.members.remove(id).is_some()
    }

    /// Queue the event for every member
    ///
    /// Members that get closed on the way (full mailbox) are dropped.
    pub fn send(&mut self, event: &OutgoingEvent) {
        self.members.retain(|_, client| {
            client.send(event.clone());
            !client.is_closed()
        });
    }
}
