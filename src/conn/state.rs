use super::{client::ClientHandle, event::OutgoingEvent, hub::HubCommand, room::RoomRuntime};
use serde::Serialize;
use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    pub num_rooms: usize,
    pub num_clients: usize,
    /// Member count keyed by room id
    pub rooms: BTreeMap<i64, usize>,
}

/// Room registry owned by the hub loop; nothing else touches it
#[derive(Default)]
pub struct HubState {
    rooms: HashMap<i64, RoomRuntime>,
}

impl HubState {
    /// Process commands one at a time until every sender is gone
    pub async fn serve(mut self, mut rx: mpsc::Receiver<HubCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        tracing::debug!("hub stopped");
    }

    pub fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client) => self.register(client),
            HubCommand::Unregister(client) => self.unregister(&client),
            HubCommand::Broadcast(room_id, event) => self.broadcast(room_id, &event),
            HubCommand::Status(tx) => {
                let _ = tx.send(self.status());
            }
        }
    }

    /// Add the client to the room it joined, creating the room if absent
    pub fn register(&mut self, client: ClientHandle) {
        let room_id = client.room_id();
        if room_id == 0 || client.is_closed() {
            return;
        }

        match self.rooms.entry(room_id) {
            Entry::Occupied(mut o) => o.get_mut().insert(client),
            Entry::Vacant(v) => {
                let mut room = RoomRuntime::new(room_id);
                room.insert(client);
                v.insert(room);
                tracing::debug!("room {} opened", room_id);
            }
        }
    }

    /// Remove the client from its room and drop the room once empty
    pub fn unregister(&mut self, client: &ClientHandle) {
        let room_id = client.room_id();
        if let Entry::Occupied(mut o) = self.rooms.entry(room_id) {
            o.get_mut().remove(&client.id());
            if o.get().is_empty() {
                o.remove();
                tracing::debug!("room {} closed", room_id);
            }
        }
    }

    pub fn broadcast(&mut self, room_id: i64, event: &OutgoingEvent) {
        if room_id == 0 {
            return;
        }
        if let Entry::Occupied(mut o) = self.rooms.entry(room_id) {
            o.get_mut().send(event);
            if o.get().is_empty() {
                o.remove();
                tracing::debug!("room {} closed", room_id);
            }
        }
    }

    pub fn status(&self) -> HubStatus {
        let rooms: BTreeMap<i64, usize> = self
            .rooms
            .values()
            .map(|room| (room.id(), room.len()))
            .collect();

        HubStatus {
            num_rooms: rooms.len(),
            num_clients: rooms.values().sum(),
            rooms,
        }
    }
}

// ========================// tests //======================== //
