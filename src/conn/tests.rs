//! Connection scenarios run against in-memory services and an in-process duplex

use super::{Client, ClientConfig, Hub, HubStatus};
use crate::{
    core::Error,
    service::{MessageService, RoomService},
    store::Message,
};
use async_trait::async_trait;
use axum::extract::ws::Message as Frame;
use futures::{channel::mpsc, Sink, StreamExt};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use time::OffsetDateTime;
use tokio::time::{timeout, Duration};

const WAIT: Duration = Duration::from_secs(2);

// ========================// MemoryStore //======================== //

#[derive(Default)]
struct MemoryStore {
    // room id -> optional password
    rooms: Mutex<HashMap<i64, Option<String>>>,
    messages: Mutex<Vec<Message>>,
    touched: Mutex<Vec<i64>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    fn with_rooms(rooms: &[(i64, Option<&str>)]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut map = store.rooms.lock().unwrap();
            for (id, password) in rooms {
                map.insert(*id, password.map(str::to_owned));
            }
        }
        Arc::new(store)
    }

    fn seed(&self, room_id: i64, count: usize) {
        let mut messages = self.messages.lock().unwrap();
        for _ in 0..count {
            let id = messages.len() as i64 + 1;
            messages.push(message(id, room_id, "seed", &format!("seed {}", id)));
        }
    }

    fn stored(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

fn message(id: i64, room_id: i64, nick: &str, text: &str) -> Message {
    Message {
        id,
        nick: nick.to_owned(),
        text: text.to_owned(),
        room_id,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[async_trait]
impl RoomService for MemoryStore {
    async fn check_password(&self, room_id: i64, password: &str) -> Result<bool, Error> {
        match self.rooms.lock().unwrap().get(&room_id) {
            Some(Some(expected)) => Ok(expected == password),
            Some(None) => Ok(true),
            None => Err(Error::NotFound),
        }
    }

    async fn touch_activity(&self, room_id: i64) -> Result<(), Error> {
        self.touched.lock().unwrap().push(room_id);
        Ok(())
    }

    async fn soft_delete_inactive(&self, _older_than: time::Duration) -> Result<u64, Error> {
        Ok(0)
    }
}

#[async_trait]
impl MessageService for MemoryStore {
    async fn create_message(
        &self,
        room_id: i64,
        nick: &str,
        text: &str,
    ) -> Result<Message, Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut messages = self.messages.lock().unwrap();
        let stored = message(messages.len() as i64 + 1, room_id, nick, text);
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        room_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        let mut page: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.room_id == room_id && before_id.map_or(true, |b| m.id < b))
            .cloned()
            .collect();
        page.sort_by_key(|m| m.id);
        page.truncate(limit as usize);
        Ok(page)
    }
}

// ========================// Peer //======================== //

/// The remote end of one connection
struct Peer<O> {
    inbound: Inbound,
    outbound: O,
}

type Inbound = mpsc::UnboundedSender<Result<Frame, io::Error>>;

fn spawn_client<S>(
    hub: &Hub,
    store: &Arc<MemoryStore>,
    sink: S,
    config: &ClientConfig,
) -> Inbound
where
    S: Sink<Frame> + Unpin + Send + 'static,
    S::Error: std::fmt::Display + Send + 'static,
{
    let (inbound, stream) = mpsc::unbounded();
    let client = Client::new(hub.clone(), store.clone(), store.clone(), config);
    tokio::spawn(client.run(sink, stream));
    inbound
}

fn connect(hub: &Hub, store: &Arc<MemoryStore>) -> Peer<mpsc::UnboundedReceiver<Frame>> {
    connect_with(hub, store, &ClientConfig::default())
}

fn connect_with(
    hub: &Hub,
    store: &Arc<MemoryStore>,
    config: &ClientConfig,
) -> Peer<mpsc::UnboundedReceiver<Frame>> {
    let (sink, outbound) = mpsc::unbounded();
    let inbound = spawn_client(hub, store, sink, config);
    Peer { inbound, outbound }
}

/// A peer whose socket accepts a single frame and then stops reading
fn connect_stalled(hub: &Hub, store: &Arc<MemoryStore>) -> Peer<mpsc::Receiver<Frame>> {
    let (sink, outbound) = mpsc::channel(0);
    let inbound = spawn_client(hub, store, sink, &ClientConfig::default());
    Peer { inbound, outbound }
}

impl<O> Peer<O>
where
    O: futures::Stream<Item = Frame> + Unpin,
{
    fn send(&self, value: Value) {
        self.send_raw(&value.to_string());
    }

    fn send_raw(&self, text: &str) {
        self.inbound
            .unbounded_send(Ok(Frame::Text(text.to_owned())))
            .unwrap();
    }

    async fn recv(&mut self) -> Value {
        loop {
            let frame = timeout(WAIT, self.outbound.next())
                .await
                .expect("timed out waiting for an event")
                .expect("connection closed");
            match frame {
                Frame::Text(text) => return serde_json::from_str(&text).unwrap(),
                Frame::Ping(_) => continue,
                other => panic!("unexpected frame {:?}", other),
            }
        }
    }

    /// Whether the server closed the connection; pending frames are discarded
    async fn closed(&mut self) -> bool {
        timeout(WAIT, async {
            while self.outbound.next().await.is_some() {}
        })
        .await
        .is_ok()
    }

    async fn join(&mut self, room_id: i64, nick: &str) -> Value {
        self.send(json!({"type": "join", "room_id": room_id, "nick": nick, "password": ""}));
        self.recv().await
    }
}

fn setup() -> (Hub, Arc<MemoryStore>) {
    let store = MemoryStore::with_rooms(&[(5, None), (6, None), (7, Some("secret"))]);
    (Hub::spawn(64), store)
}

async fn members(hub: &Hub, room_id: i64) -> Option<usize> {
    hub.status().await.unwrap().rooms.get(&room_id).copied()
}

// ========================// scenarios //======================== //

#[tokio::test]
async fn join_is_broadcast_to_the_whole_room() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);

    assert_eq!(
        ann.join(5, "ann").await,
        json!({"type": "join", "room_id": 5, "nick": "ann"})
    );
    assert_eq!(members(&hub, 5).await, Some(1));
    assert_eq!(*store.touched.lock().unwrap(), vec![5]);

    let joined = json!({"type": "join", "room_id": 5, "nick": "bob"});
    assert_eq!(bob.join(5, "bob").await, joined);
    assert_eq!(ann.recv().await, joined);
    assert_eq!(members(&hub, 5).await, Some(2));
}

#[tokio::test]
async fn message_is_persisted_then_broadcast() {
    let (hub, store) = setup();
    store.seed(9, 41);
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;
    ann.recv().await;

    ann.send(json!({"type": "message", "text": "hi"}));

    let events = [ann.recv().await, bob.recv().await];
    for event in &events {
        assert_eq!(event["type"], "message");
        assert_eq!(event["room_id"], 5);
        assert_eq!(event["nick"], "ann");
        assert_eq!(event["message"]["id"], 42);
        assert_eq!(event["message"]["text"], "hi");
    }
    assert_eq!(store.stored().len(), 42);
}

#[tokio::test]
async fn unjoined_client_is_unauthorized() {
    let (hub, store) = setup();
    let mut watcher = connect(&hub, &store);
    watcher.join(5, "watcher").await;
    let mut stranger = connect(&hub, &store);

    stranger.send(json!({"type": "message", "text": "hi"}));
    assert_eq!(
        stranger.recv().await,
        json!({"type": "error", "text": "unauthorized"})
    );
    stranger.send(json!({"type": "load_history"}));
    assert_eq!(
        stranger.recv().await,
        json!({"type": "error", "text": "unauthorized"})
    );

    assert!(store.stored().is_empty());
    assert_eq!(members(&hub, 5).await, Some(1));

    // the next thing the watcher sees is its own message, nothing from the stranger
    watcher.send(json!({"type": "message", "text": "anyone?"}));
    assert_eq!(watcher.recv().await["message"]["text"], "anyone?");
}

#[tokio::test]
async fn wrong_password_keeps_client_unjoined() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);

    ann.send(json!({"type": "join", "room_id": 7, "nick": "ann", "password": "guess"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "room_id": 7, "text": "wrong-password"})
    );
    assert_eq!(members(&hub, 7).await, None);

    ann.send(json!({"type": "message", "text": "let me in"}));
    assert_eq!(ann.recv().await["text"], "unauthorized");

    ann.send(json!({"type": "join", "room_id": 7, "nick": "ann", "password": "secret"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "join", "room_id": 7, "nick": "ann"})
    );
}

#[tokio::test]
async fn unknown_room_is_reported_as_wrong_password() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);

    ann.send(json!({"type": "join", "room_id": 404, "nick": "ann"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "room_id": 404, "text": "wrong-password"})
    );
    assert!(store.touched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_events_are_reported_and_the_loop_continues() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);

    ann.send(json!({"type": "join", "room_id": 0, "nick": "ann"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "text": "invalid event payload: room_id is required for join"})
    );

    ann.send(json!({"type": "join", "room_id": 5, "nick": "   "}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "room_id": 5, "text": "invalid event payload: nick is required for join"})
    );

    ann.send(json!({"type": "shout", "text": "hey"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "text": "unknown event type"})
    );

    ann.send(json!({"text": "hey"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "text": "unknown event type"})
    );

    ann.join(5, "ann").await;
    ann.send(json!({"type": "message", "text": " \n "}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "text": "invalid event payload: text is required for message"})
    );
    assert!(store.stored().is_empty());
}

#[tokio::test]
async fn history_goes_only_to_the_requester() {
    let (hub, store) = setup();
    store.seed(5, 60);
    store.seed(6, 5);
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;
    ann.recv().await;

    ann.send(json!({"type": "load_history", "before_id": 42}));
    let history = ann.recv().await;
    assert_eq!(history["type"], "history");
    assert_eq!(history["room_id"], 5);
    assert_eq!(history["nick"], "ann");
    let ids: Vec<i64> = history["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..42).collect::<Vec<_>>());

    ann.send(json!({"type": "load_history"}));
    let history = ann.recv().await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 50);
    assert_eq!(messages[0]["id"], 1);
    assert_eq!(messages[49]["id"], 50);

    // bob's next event is the message below, not a history page
    ann.send(json!({"type": "message", "text": "done"}));
    assert_eq!(bob.recv().await["type"], "message");
}

#[tokio::test]
async fn persistence_failure_reports_bad_request_without_broadcast() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;
    ann.recv().await;

    store.fail_writes.store(true, Ordering::SeqCst);
    ann.send(json!({"type": "message", "text": "lost"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "text": "bad-request"})
    );

    store.fail_writes.store(false, Ordering::SeqCst);
    ann.send(json!({"type": "message", "text": "kept"}));
    assert_eq!(bob.recv().await["message"]["text"], "kept");
    assert_eq!(ann.recv().await["message"]["text"], "kept");
}

#[tokio::test]
async fn members_observe_the_same_broadcast_order() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;
    ann.recv().await;

    for i in 0..5 {
        ann.send(json!({"type": "message", "text": format!("ann {}", i)}));
        bob.send(json!({"type": "message", "text": format!("bob {}", i)}));
    }

    let mut seen_by_ann = Vec::new();
    let mut seen_by_bob = Vec::new();
    for _ in 0..10 {
        seen_by_ann.push(ann.recv().await["message"]["text"].clone());
        seen_by_bob.push(bob.recv().await["message"]["text"].clone());
    }
    assert_eq!(seen_by_ann, seen_by_bob);

    // per sender order is kept as well
    let from_ann: Vec<&Value> = seen_by_ann
        .iter()
        .filter(|t| t.as_str().unwrap().starts_with("ann"))
        .collect();
    let expected: Vec<Value> = (0..5).map(|i| json!(format!("ann {}", i))).collect();
    assert_eq!(from_ann, expected.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn second_join_is_rejected() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    ann.join(5, "ann").await;

    ann.send(json!({"type": "join", "room_id": 6, "nick": "ann"}));
    assert_eq!(
        ann.recv().await,
        json!({"type": "error", "room_id": 6, "text": "already-joined"})
    );

    let status = hub.status().await.unwrap();
    assert_eq!(status.rooms.get(&5), Some(&1));
    assert_eq!(status.rooms.get(&6), None);
}

#[tokio::test]
async fn malformed_payload_tears_the_connection_down() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    ann.join(5, "ann").await;

    ann.send_raw("{not json");

    assert!(ann.closed().await);
    assert_eq!(hub.status().await.unwrap(), HubStatus::default());
}

#[tokio::test]
async fn disconnect_unregisters_the_client() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;

    drop(ann.inbound);
    timeout(WAIT, async {
        while members(&hub, 5).await != Some(1) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("client was never unregistered");

    // a client that never joined leaves nothing behind either
    let Peer {
        inbound,
        mut outbound,
    } = connect(&hub, &store);
    drop(inbound);
    timeout(WAIT, async { while outbound.next().await.is_some() {} })
        .await
        .expect("stranger was never torn down");

    let status = hub.status().await.unwrap();
    assert_eq!(status.num_clients, 1);
    assert_eq!(status.rooms.get(&5), Some(&1));
}

#[tokio::test]
async fn write_failure_tears_the_client_down() {
    let (hub, store) = setup();
    let mut ann = connect(&hub, &store);
    let mut bob = connect(&hub, &store);
    ann.join(5, "ann").await;
    bob.join(5, "bob").await;

    // ann's socket goes away; the next write to it fails
    let Peer { inbound, outbound } = ann;
    drop(outbound);
    bob.send(json!({"type": "message", "text": "first"}));
    assert_eq!(bob.recv().await["message"]["text"], "first");

    timeout(WAIT, async {
        while members(&hub, 5).await != Some(1) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("client was never unregistered after a failed write");
    drop(inbound);

    bob.send(json!({"type": "message", "text": "second"}));
    assert_eq!(bob.recv().await["message"]["text"], "second");
}

#[tokio::test]
async fn zero_ping_interval_does_not_kill_the_writer() {
    let (hub, store) = setup();
    let config = ClientConfig {
        ping_interval: Duration::ZERO,
        ..ClientConfig::default()
    };
    let mut ann = connect_with(&hub, &store, &config);

    assert_eq!(
        ann.join(5, "ann").await,
        json!({"type": "join", "room_id": 5, "nick": "ann"})
    );
    assert_eq!(members(&hub, 5).await, Some(1));
}

// A stalled consumer is shed on purpose; the room keeps flowing for everyone else.
#[tokio::test]
async fn stalled_peer_is_shed_without_delaying_others() {
    let (hub, store) = setup();
    let mut slow = connect_stalled(&hub, &store);
    slow.join(5, "slow").await;
    let mut bob = connect(&hub, &store);
    bob.join(5, "bob").await;
    assert_eq!(members(&hub, 5).await, Some(2));

    for i in 0..40 {
        bob.send(json!({"type": "message", "text": format!("msg {}", i)}));
        assert_eq!(bob.recv().await["message"]["text"], format!("msg {}", i));
    }

    assert_eq!(members(&hub, 5).await, Some(1));
    assert!(slow.closed().await);
}
