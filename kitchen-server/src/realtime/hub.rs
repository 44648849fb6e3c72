//! RealtimeHub: 房间成员管理与事件分发
//!
//! ```text
//! TicketService / MenuService / TimerExpiry
//!       │ broadcast_to_rooms / broadcast_to_all
//!       ▼
//! RealtimeHub
//!   ├── tx: broadcast::Sender<Envelope>   (one channel, fan-out to every connection)
//!   └── memberships: conn_id → rooms       (filter applied on the receiving side)
//!           │
//!           ▼
//!   Subscription::recv (per WS connection, skips envelopes for other rooms)
//! ```
//!
//! Delivery is best-effort: a connection that falls behind the channel
//! buffer sees `Lagged` and must resync from a fresh snapshot.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use shared::models::{Room, Source, Station, Ticket};
use shared::realtime::ServerMessage;
use tokio::sync::broadcast;

pub type ConnectionId = u64;

/// Who an event is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    /// Delivered once to every connection that is in at least one of the rooms
    Rooms(Vec<Room>),
}

impl Audience {
    fn reaches(&self, rooms: &HashSet<Room>) -> bool {
        match self {
            Audience::All => true,
            Audience::Rooms(targets) => targets.iter().any(|room| rooms.contains(room)),
        }
    }
}

/// Hub 内部事件
#[derive(Debug, Clone)]
pub struct Envelope {
    pub audience: Audience,
    pub message: Arc<ServerMessage>,
}

struct HubInner {
    tx: broadcast::Sender<Envelope>,
    memberships: DashMap<ConnectionId, HashSet<Room>>,
    next_id: AtomicU64,
    ready: AtomicBool,
}

/// 实时分发中心
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("connections", &self.inner.memberships.len())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(HubInner {
                tx,
                memberships: DashMap::new(),
                next_id: AtomicU64::new(1),
                ready: AtomicBool::new(false),
            }),
        }
    }

    /// Start accepting broadcasts. Until then every broadcast is a no-op.
    pub fn mark_ready(&self) {
        self.inner.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    /// Register a new connection with no rooms.
    pub fn connect(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.memberships.insert(id, HashSet::new());
        Subscription {
            id,
            rx: self.inner.tx.subscribe(),
            hub: self.clone(),
        }
    }

    /// Replace the connection's rooms with the valid names in `requested`.
    ///
    /// Unknown names are dropped. Returns the rooms actually joined.
    pub fn join<S: AsRef<str>>(&self, conn: ConnectionId, requested: &[S]) -> Vec<Room> {
        let rooms = Room::parse_all(requested);
        self.leave_all(conn);
        self.inner
            .memberships
            .insert(conn, rooms.iter().copied().collect());
        tracing::debug!(
            conn_id = conn,
            rooms = ?rooms.iter().map(Room::as_str).collect::<Vec<_>>(),
            "Connection joined rooms"
        );
        rooms
    }

    pub fn leave_all(&self, conn: ConnectionId) {
        if let Some(mut rooms) = self.inner.memberships.get_mut(&conn) {
            rooms.clear();
        }
    }

    pub fn disconnect(&self, conn: ConnectionId) {
        self.inner.memberships.remove(&conn);
    }

    pub fn rooms_of(&self, conn: ConnectionId) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .inner
            .memberships
            .get(&conn)
            .map(|rooms| rooms.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub fn room_size(&self, room: Room) -> usize {
        self.inner
            .memberships
            .iter()
            .filter(|entry| entry.value().contains(&room))
            .count()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.memberships.len()
    }

    fn is_member(&self, conn: ConnectionId, audience: &Audience) -> bool {
        self.inner
            .memberships
            .get(&conn)
            .is_some_and(|rooms| audience.reaches(&rooms))
    }

    fn publish(&self, audience: Audience, message: ServerMessage) {
        if !self.is_ready() {
            tracing::debug!(event = message.event_name(), "Realtime hub not ready, dropping event");
            return;
        }
        // 无订阅者时 send 返回 Err，安全忽略
        let _ = self.inner.tx.send(Envelope {
            audience,
            message: Arc::new(message),
        });
    }

    pub fn broadcast_to_rooms(&self, rooms: Vec<Room>, message: ServerMessage) {
        self.publish(Audience::Rooms(rooms), message);
    }

    pub fn broadcast_to_station(&self, station: Station, message: ServerMessage) {
        self.broadcast_to_rooms(vec![Room::Station(station)], message);
    }

    pub fn broadcast_to_source(&self, source: Source, message: ServerMessage) {
        self.broadcast_to_rooms(vec![Room::Source(source)], message);
    }

    /// Station room and source room of the ticket, one delivery per connection
    pub fn broadcast_to_ticket_rooms(&self, ticket: &Ticket, message: ServerMessage) {
        self.broadcast_to_rooms(
            vec![Room::Station(ticket.station), Room::Source(ticket.source)],
            message,
        );
    }

    pub fn broadcast_to_all(&self, message: ServerMessage) {
        self.publish(Audience::All, message);
    }
}

/// 单个连接的订阅句柄
///
/// Dropping it removes the connection's memberships.
pub struct Subscription {
    id: ConnectionId,
    rx: broadcast::Receiver<Envelope>,
    hub: RealtimeHub,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next message addressed to one of this connection's rooms
    pub async fn recv(&mut self) -> Result<Arc<ServerMessage>, broadcast::error::RecvError> {
        loop {
            let envelope = self.rx.recv().await?;
            if self.hub.is_member(self.id, &envelope.audience) {
                return Ok(envelope.message);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Result<Arc<ServerMessage>, broadcast::error::TryRecvError> {
        loop {
            let envelope = self.rx.try_recv()?;
            if self.hub.is_member(self.id, &envelope.audience) {
                return Ok(envelope.message);
            }
        }
    }

    /// Skip everything still buffered; used after a lag before resending a snapshot
    pub fn resubscribe(&mut self) {
        self.rx = self.rx.resubscribe();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.disconnect(self.id);
    }
}
