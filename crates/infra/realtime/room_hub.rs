use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{debug, info};

use crate::domain::value_objects::realtime::{RealtimeEvent, Room};

const ROOM_CAPACITY: usize = 64;

#[derive(Default)]
struct Rooms {
    senders: HashMap<String, broadcast::Sender<RealtimeEvent>>,
    closed: bool,
}

fn lock(rooms: &Mutex<Rooms>) -> MutexGuard<'_, Rooms> {
    rooms.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process fan-out of booking events to per-identity rooms.
///
/// Delivery is at-most-once: a room with nobody listening drops the event,
/// and late joiners get no replay. A room lives as long as one of its
/// subscriptions does.
#[derive(Default)]
pub struct RoomHub {
    rooms: Arc<Mutex<Rooms>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joining a closed hub yields a subscription that ends immediately.
    pub async fn join(&self, room: Room) -> RoomSubscription {
        let receiver = {
            let mut rooms = lock(&self.rooms);
            if rooms.closed {
                broadcast::channel(1).1
            } else {
                rooms
                    .senders
                    .entry(room.to_string())
                    .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
                    .subscribe()
            }
        };

        RoomSubscription {
            room,
            receiver,
            rooms: Arc::clone(&self.rooms),
        }
    }

    /// Returns how many receivers got the event.
    pub async fn emit(&self, room: Room, event: RealtimeEvent) -> usize {
        let key = room.to_string();
        let event_type = event.event_type;
        let mut rooms = lock(&self.rooms);

        let Some(sender) = rooms.senders.get(&key) else {
            debug!(%room, %event_type, "realtime: nobody in room");
            return 0;
        };
        match sender.send(event) {
            Ok(reached) => {
                debug!(%room, %event_type, reached, "realtime: event emitted");
                reached
            }
            Err(_) => {
                rooms.senders.remove(&key);
                debug!(%room, %event_type, "realtime: nobody in room");
                0
            }
        }
    }

    /// Drops every room so open subscriptions drain and end. Later joins end at once.
    pub async fn close_all(&self) {
        let closed = {
            let mut rooms = lock(&self.rooms);
            rooms.closed = true;
            let count = rooms.senders.len();
            rooms.senders.clear();
            count
        };
        info!(rooms = closed, "realtime: all rooms closed");
    }

    pub async fn room_count(&self) -> usize {
        lock(&self.rooms).senders.len()
    }
}

/// One listener's membership in a room.
pub struct RoomSubscription {
    room: Room,
    receiver: broadcast::Receiver<RealtimeEvent>,
    rooms: Arc<Mutex<Rooms>>,
}

impl RoomSubscription {
    pub fn room(&self) -> Room {
        self.room
    }

    pub async fn recv(&mut self) -> Result<RealtimeEvent, RecvError> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<RealtimeEvent, TryRecvError> {
        self.receiver.try_recv()
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        let key = self.room.to_string();
        let mut rooms = lock(&self.rooms);
        // Our own receiver is still counted here.
        if rooms
            .senders
            .get(&key)
            .is_some_and(|sender| sender.receiver_count() <= 1)
        {
            rooms.senders.remove(&key);
            debug!(room = %self.room, "realtime: empty room pruned");
        }
    }
}
