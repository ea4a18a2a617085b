use super::{
    event::{IncomingEvent, JoinRequest, LoadHistoryRequest, MessageRequest, OutgoingEvent},
    hub::Hub,
};
use crate::{
    core::{
        constant::{CLOSE_TIMEOUT_SECS, HISTORY_PAGE_SIZE, MAILBOX_CAPACITY, PING_INTERVAL_SECS},
        Error,
    },
    service::{MessageService, RoomService},
    Config,
};
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock,
    },
};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{self, Duration, Instant},
};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

// ========================// ClientConfig //======================== //

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub mailbox_capacity: usize,
    pub ping_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: MAILBOX_CAPACITY,
            ping_interval: Duration::from_secs(PING_INTERVAL_SECS),
        }
    }
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            mailbox_capacity: config.mailbox_capacity,
            ping_interval: Duration::from_secs(config.ping_interval_secs),
        }
    }
}

// ========================// ClientHandle //======================== //

struct Identity {
    room_id: i64,
    nick: String,
}

struct Shared {
    id: Uuid,
    // written once by the inbound loop on a successful join
    identity: OnceLock<Identity>,
    mailbox: mpsc::Sender<OutgoingEvent>,
    token: CancellationToken,
    closed: AtomicBool,
}

/// The part of a connection that the hub holds on to
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<Shared>,
}

impl ClientHandle {
    pub(crate) fn new(capacity: usize) -> (Self, mpsc::Receiver<OutgoingEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let inner = Shared {
            id: Uuid::new_v4(),
            identity: OnceLock::new(),
            mailbox: tx,
            token: CancellationToken::new(),
            closed: AtomicBool::new(false),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Room the client joined, 0 before a successful join
    pub fn room_id(&self) -> i64 {
        self.inner.identity.get().map_or(0, |i| i.room_id)
    }

    pub fn nick(&self) -> &str {
        self.inner.identity.get().map_or("", |i| i.nick.as_str())
    }

    pub fn is_joined(&self) -> bool {
        self.inner.identity.get().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub(crate) fn set_identity(&self, room_id: i64, nick: String) -> Result<(), Error> {
        self.inner
            .identity
            .set(Identity { room_id, nick })
            .map_err(|_| Error::AlreadyJoined)
    }

    /// Queue an event without waiting
    ///
    /// A full mailbox sheds the connection instead of blocking the caller.
    pub fn send(&self, event: OutgoingEvent) {
        if self.is_closed() {
            return;
        }

        match self.inner.mailbox.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    "send buffer full for nick={} room={}, closing client",
                    self.nick(),
                    self.room_id()
                );
                self.close();
            }
            Err(TrySendError::Closed(_)) => self.close(),
        }
    }

    /// Tear the connection down; only the first call has any effect
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.token.cancel();
        tracing::debug!("client {} closed", self.id());
    }

    fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }
}

// ========================// Client //======================== //

/// Connection actor bound to one duplex connection
pub struct Client {
    session: Session,
    mailbox: mpsc::Receiver<OutgoingEvent>,
    ping_interval: Duration,
}

impl Client {
    pub fn new(
        hub: Hub,
        rooms: Arc<dyn RoomService>,
        messages: Arc<dyn MessageService>,
        config: &ClientConfig,
    ) -> Self {
        let (handle, mailbox) = ClientHandle::new(config.mailbox_capacity);
        Self {
            session: Session {
                handle,
                hub,
                rooms,
                messages,
            },
            mailbox,
            ping_interval: ping_interval(config.ping_interval),
        }
    }

    pub fn handle(&self) -> ClientHandle {
        self.session.handle.clone()
    }

    /// Drive the inbound and outbound loops until both have stopped
    pub async fn run<S, R, E>(self, sink: S, stream: R)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display + Send + 'static,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let Client {
            session,
            mailbox,
            ping_interval,
        } = self;
        let id = session.handle.id();

        let send_task = tokio::spawn(write_loop(
            session.handle.clone(),
            mailbox,
            sink,
            ping_interval,
        ));
        let recv_task = tokio::spawn(session.read_loop(stream));

        let (sent, received) = tokio::join!(send_task, recv_task);
        if let Err(e) = sent.and(received) {
            tracing::error!("client {} task failed: {}", id, e);
        }
        tracing::debug!("client {} disconnected", id);
    }
}

/// Outbound loop: drains the mailbox into the connection
async fn write_loop<S>(
    handle: ClientHandle,
    mut mailbox: mpsc::Receiver<OutgoingEvent>,
    mut sink: S,
    ping_interval: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut heartbeat = time::interval_at(Instant::now() + ping_interval, ping_interval);

    loop {
        let msg = tokio::select! {
            biased;
            _ = handle.cancelled() => break,
            event = mailbox.recv() => match event {
                Some(event) => match event.to_json() {
                    Ok(text) => Message::Text(text),
                    Err(e) => {
                        tracing::error!("failed to serialize event: {}", e);
                        continue;
                    }
                },
                None => break,
            },
            _ = heartbeat.tick() => Message::Ping(Vec::new()),
        };

        // a stalled peer must not outlive the close
        let sent = tokio::select! {
            _ = handle.cancelled() => break,
            sent = sink.send(msg) => sent,
        };
        if let Err(e) = sent {
            tracing::debug!("client {} write failed: {}", handle.id(), e);
            break;
        }
    }

    mailbox.close();
    handle.close();
    match time::timeout(Duration::from_secs(CLOSE_TIMEOUT_SECS), sink.close()).await {
        Ok(Err(e)) => tracing::debug!("client {} close failed: {}", handle.id(), e),
        Err(_) => tracing::debug!("client {} close timed out", handle.id()),
        Ok(Ok(())) => {}
    }
    tracing::debug!("client {} send task stopped", handle.id());
}

// ========================// Session //======================== //

/// Inbound side of a client: decodes events and dispatches them
struct Session {
    handle: ClientHandle,
    hub: Hub,
    rooms: Arc<dyn RoomService>,
    messages: Arc<dyn MessageService>,
}

impl Session {
    async fn read_loop<R, E>(self, mut stream: R)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        loop {
            let frame = tokio::select! {
                _ = self.handle.cancelled() => break,
                frame = stream.next() => frame,
            };

            let decoded = match frame {
                Some(Ok(Message::Text(text))) => IncomingEvent::from_slice(text.as_bytes()),
                Some(Ok(Message::Binary(data))) => IncomingEvent::from_slice(&data),
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("client {} closed the connection", self.handle.id());
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!("client {} read failed: {}", self.handle.id(), e);
                    break;
                }
            };

            match decoded {
                Ok(event) => {
                    if !self.handle_event(event).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("client {} sent a malformed event: {}", self.handle.id(), e);
                    break;
                }
            }
        }

        // safe for a client that never joined
        if let Err(e) = self.hub.unregister(self.handle.clone()).await {
            tracing::error!("{}", e);
        }
        self.handle.close();
        tracing::debug!("client {} recv task stopped", self.handle.id());
    }

    /// Handle one decoded event
    ///
    /// Return whether to continue receiving messages
    async fn handle_event(&self, event: IncomingEvent) -> bool {
        let room_id = event.room_id();

        if let Err(e) = event.validate() {
            self.handle.send(OutgoingEvent::error(room_id, e.to_string()));
            return true;
        }

        let result = match event {
            IncomingEvent::Join(req) => self.join(req).await,
            IncomingEvent::Message(req) => self.send_message(req).await,
            IncomingEvent::LoadHistory(req) => self.load_history(req).await,
            IncomingEvent::Unknown => Ok(()),
        };

        match result {
            Ok(()) => true,
            Err(err) if err.is_recoverable() => {
                self.handle
                    .send(OutgoingEvent::error(room_id, err.wire_text()));
                true
            }
            Err(err) => {
                tracing::error!("{}", err);
                false
            }
        }
    }

    async fn join(&self, req: JoinRequest) -> Result<(), Error> {
        if self.handle.is_joined() {
            return Err(Error::AlreadyJoined);
        }

        let allowed = match self.rooms.check_password(req.room_id, &req.password).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!("check password of room {} failed: {}", req.room_id, e);
                false
            }
        };
        if !allowed {
            return Err(Error::WrongPassword);
        }

        if let Err(e) = self.rooms.touch_activity(req.room_id).await {
            tracing::warn!("touch activity of room {} failed: {}", req.room_id, e);
        }

        self.handle.set_identity(req.room_id, req.nick.clone())?;
        self.hub.register(self.handle.clone()).await?;

        let event = OutgoingEvent::Join {
            room_id: req.room_id,
            nick: req.nick,
        };
        self.hub.broadcast(req.room_id, event).await
    }

    async fn send_message(&self, req: MessageRequest) -> Result<(), Error> {
        if !self.handle.is_joined() {
            return Err(Error::Unauthorized);
        }
        let room_id = self.handle.room_id();
        let nick = self.handle.nick();

        let message = self
            .messages
            .create_message(room_id, nick, &req.text)
            .await
            .map_err(|e| upstream("create message", e))?;

        let event = OutgoingEvent::Message {
            room_id,
            nick: nick.to_owned(),
            message,
        };
        self.hub.broadcast(room_id, event).await
    }

    async fn load_history(&self, req: LoadHistoryRequest) -> Result<(), Error> {
        if !self.handle.is_joined() {
            return Err(Error::Unauthorized);
        }
        let room_id = self.handle.room_id();

        let messages = self
            .messages
            .list_messages(room_id, req.before_id, HISTORY_PAGE_SIZE)
            .await
            .map_err(|e| upstream("list messages", e))?;

        self.handle.send(OutgoingEvent::History {
            room_id,
            nick: self.handle.nick().to_owned(),
            messages,
        });
        Ok(())
    }
}

/// Heartbeat period; a zero period would make the ticker panic
fn ping_interval(period: Duration) -> Duration {
    if period.is_zero() {
        Duration::from_secs(PING_INTERVAL_SECS)
    } else {
        period
    }
}

fn upstream(action: &str, e: Error) -> Error {
    tracing::error!("{} failed: {}", action, e);
    Error::BadRequest
}

// ========================// tests //======================== //
