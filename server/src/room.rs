//! The per-room tick driver: fixed-rate simulation loop, FIFO input
//! drainage, hit-validation dispatch, respawn gating, and per-player
//! snapshot broadcast. A room owns its players, their input queues, and the
//! outbound channel for every connection admitted into it; nothing outside
//! the room touches any of that directly.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use shared::{
    apply_input_to_velocity, generate_obstacles, step, Deathmatch, GameMode, HitEvent,
    InputRecord, Obstacle, Player, PlayerEntry, SnapshotEncoder, MAX_PLAYERS_PER_ROOM, TICK_RATE,
};

use crate::hit_validator::process_shot;

pub type OutboundSender = mpsc::UnboundedSender<Vec<u8>>;

pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

pub struct Room {
    pub id: u32,
    pub map_seed: u32,
    obstacles: Vec<Obstacle>,
    players: HashMap<u16, Player>,
    connections: HashMap<u16, OutboundSender>,
    pending_inputs: HashMap<u16, VecDeque<InputRecord>>,
    tick: u32,
    next_player_id: u16,
    mode: Box<dyn GameMode + Send>,
    pending_hits: Vec<HitEvent>,
    encoder: SnapshotEncoder,
    rng: StdRng,
}

impl Room {
    pub fn new(id: u32, map_seed: u32) -> Self {
        Self {
            id,
            map_seed,
            obstacles: generate_obstacles(map_seed),
            players: HashMap::new(),
            connections: HashMap::new(),
            pending_inputs: HashMap::new(),
            tick: 0,
            next_player_id: 1,
            mode: Box::new(Deathmatch::new()),
            pending_hits: Vec::new(),
            encoder: SnapshotEncoder::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS_PER_ROOM
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn players(&self) -> &HashMap<u16, Player> {
        &self.players
    }

    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    /// Admits a new player: assigns the next monotonic id, lets the mode
    /// pick a spawn point, and installs the connection's outbound sender so
    /// the tick driver can reach it directly.
    pub fn add_player(&mut self, name: String, sender: OutboundSender) -> u16 {
        // Ids are monotonic until the 16-bit space wraps; past that point,
        // skip any id still held by a long-lived connection instead of
        // silently stealing its slot.
        let mut id = self.next_player_id;
        while self.players.contains_key(&id) {
            id = id.wrapping_add(1).max(1);
        }
        self.next_player_id = id.wrapping_add(1).max(1);

        let mut player = Player::new(id, name, shared::Vec3::ZERO);
        self.mode.on_player_join(&mut player, &self.obstacles);

        self.players.insert(id, player);
        self.connections.insert(id, sender);
        self.pending_inputs.insert(id, VecDeque::new());
        id
    }

    pub fn remove_player(&mut self, id: u16) {
        self.mode.on_player_leave(id);
        self.players.remove(&id);
        self.connections.remove(&id);
        self.pending_inputs.remove(&id);
    }

    /// Appends one input to a player's FIFO queue. Inputs for a player that
    /// isn't (or is no longer) in this room are silently dropped — this is
    /// how the network layer's "unsolicited input" case resolves.
    pub fn queue_input(&mut self, id: u16, input: InputRecord) {
        if let Some(queue) = self.pending_inputs.get_mut(&id) {
            queue.push_back(input);
        }
    }

    /// Advances the room by one fixed tick: drains every player's input
    /// queue in map order, applies physics and hit validation per input,
    /// handles respawns, and ticks the mode.
    pub fn tick(&mut self, now_ms: f64) {
        self.pending_hits.clear();
        let dt = 1.0 / TICK_RATE as f32;

        // Iteration order must be stable for a room's lifetime (spec.md
        // §4.5); a `HashMap`'s own order can shift across inserts/removes,
        // so it's sorted by the monotonically assigned player id instead.
        let mut player_ids: Vec<u16> = self.players.keys().copied().collect();
        player_ids.sort_unstable();
        for id in player_ids {
            let inputs: Vec<InputRecord> = match self.pending_inputs.get_mut(&id) {
                Some(queue) => queue.drain(..).collect(),
                None => continue,
            };

            let mut last_seq = None;
            for input in &inputs {
                if let Some(player) = self.players.get_mut(&id) {
                    player.yaw = input.yaw;
                    player.pitch = input.pitch.clamp(-shared::MAX_PITCH, shared::MAX_PITCH);
                    player.weapon = input.weapon;
                    player.is_shooting = input.shoot;
                    apply_input_to_velocity(player, input);
                    step(player, &self.obstacles, dt);
                }

                if input.shoot {
                    let hits = process_shot(
                        id,
                        input,
                        &mut self.players,
                        &self.obstacles,
                        self.mode.as_mut(),
                        now_ms,
                        &mut self.rng,
                    );
                    self.pending_hits.extend(hits);
                }

                last_seq = Some(input.sequence);
            }

            if let Some(seq) = last_seq {
                if let Some(player) = self.players.get_mut(&id) {
                    player.last_processed_input = seq;
                }
            }

            if let Some(player) = self.players.get_mut(&id) {
                let pos = player.position;
                player.history.push(pos, now_ms);
            }
        }

        let wall_ms = now_ms as u64;
        let respawning: Vec<u16> = self
            .players
            .iter()
            .filter(|(_, p)| p.is_dead && p.respawn_time_ms > 0 && wall_ms >= p.respawn_time_ms)
            .map(|(&id, _)| id)
            .collect();
        for id in respawning {
            let spawn = self.mode.get_spawn_position(&self.obstacles);
            if let Some(player) = self.players.get_mut(&id) {
                player.respawn_at(spawn);
            }
        }

        self.mode.tick(&mut self.players, dt);

        if self.mode.should_end_game(&self.players) {
            for player in self.players.values_mut() {
                player.score = 0;
                player.kills = 0;
                player.deaths = 0;
                let spawn = self.mode.get_spawn_position(&self.obstacles);
                player.respawn_at(spawn);
            }
            self.tick = 0;
            return;
        }

        self.tick += 1;
    }

    /// Encodes and sends one personalized SNAPSHOT per connected player. The
    /// shared body (every player entry plus the tick's hit list) is
    /// identical for every recipient, so it's encoded once and only the
    /// `lastProcessedInput` field is patched per connection rather than
    /// re-running the full encode once per player. No work happens if
    /// nobody is left to receive it.
    pub fn broadcast(&mut self, server_time_ms: f64) {
        if self.connections.is_empty() {
            return;
        }

        let mut entries: Vec<PlayerEntry> = self
            .players
            .values()
            .map(|p| PlayerEntry {
                id: p.id,
                x: p.position.x,
                y: p.position.y,
                z: p.position.z,
                vx: p.velocity.x,
                vy: p.velocity.y,
                vz: p.velocity.z,
                yaw: p.yaw,
                pitch: p.pitch,
                health: p.health,
                weapon: p.weapon,
                is_shooting: p.is_shooting,
                is_dead: p.is_dead,
                score: p.score,
            })
            .collect();
        entries.sort_by_key(|e| e.id);

        let hits = self.pending_hits.clone();
        let tick = self.tick;

        let shared_body = self.encoder.encode(tick, server_time_ms, 0, &entries, &hits).to_vec();

        let ids: Vec<u16> = self.connections.keys().copied().collect();
        for id in ids {
            let last_processed = self.players.get(&id).map(|p| p.last_processed_input).unwrap_or(0);
            let mut frame = shared_body.clone();
            shared::patch_last_processed_input(&mut frame, last_processed);
            if let Some(sender) = self.connections.get(&id) {
                let _ = sender.send(frame);
            }
        }
    }
}
