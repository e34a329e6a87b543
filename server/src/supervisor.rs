//! Room registry and admission policy: places a newly joined player into the
//! first room with space, opening a new one only when every existing room
//! is full, bounded by `max_rooms`. Each room runs its own tick-loop task
//! for as long as it has at least one player.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::Mutex;
use tokio::time::interval;

use shared::{MAX_ROOMS, TICK_RATE};

use crate::room::{now_ms, OutboundSender, Room};

pub struct Supervisor {
    rooms: HashMap<u32, Arc<Mutex<Room>>>,
    next_room_id: u32,
    map_seed: u32,
    max_rooms: usize,
}

impl Supervisor {
    pub fn new(map_seed: u32, max_rooms: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            next_room_id: 1,
            map_seed,
            max_rooms: max_rooms.min(MAX_ROOMS).max(1),
        }
    }

    /// Admits a new connection, returning its room id, player id, and a
    /// handle to the room it landed in. `None` means every room is full and
    /// the supervisor is already at `max_rooms`.
    pub async fn admit(&mut self, name: String, sender: OutboundSender) -> Option<(u32, u16, Arc<Mutex<Room>>)> {
        for (&room_id, room) in self.rooms.iter() {
            let mut guard = room.lock().await;
            if !guard.is_full() {
                let player_id = guard.add_player(name, sender);
                drop(guard);
                return Some((room_id, player_id, Arc::clone(room)));
            }
        }

        if self.rooms.len() >= self.max_rooms {
            return None;
        }

        let room_id = self.next_room_id;
        self.next_room_id += 1;
        let mut room = Room::new(room_id, self.map_seed);
        let player_id = room.add_player(name, sender);
        let room = Arc::new(Mutex::new(room));
        self.rooms.insert(room_id, Arc::clone(&room));
        info!("opened room {room_id}");
        spawn_tick_loop(Arc::clone(&room));
        Some((room_id, player_id, room))
    }

    /// Drops a room from the registry once its last player has left. Safe
    /// to call even if the room's own tick loop already exited on its own;
    /// this is bookkeeping, not a synchronization point.
    pub fn forget_if_empty(&mut self, room_id: u32) {
        self.rooms.remove(&room_id);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub async fn player_count(&self) -> usize {
        let mut total = 0;
        for room in self.rooms.values() {
            total += room.lock().await.player_count();
        }
        total
    }
}

fn spawn_tick_loop(room: Arc<Mutex<Room>>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs_f64(1.0 / TICK_RATE as f64));
        loop {
            ticker.tick().await;
            let mut guard = room.lock().await;
            if guard.is_empty() {
                break;
            }
            let now = now_ms();
            guard.tick(now);
            guard.broadcast(now);
            let tick_count = guard.tick_count();
            let room_id = guard.id;
            let players = guard.player_count();
            drop(guard);
            if tick_count % (TICK_RATE * 60) == 0 {
                debug!("room {room_id} tick {tick_count}: {players} players");
            }
        }
    });
}
