//! Per-player authoritative state: identity, transform, combat stats, and history.

use crate::constants::MAX_HEALTH;
use crate::history::HistoryRing;
use crate::vec3::Vec3;

/// A player entity, created on join and destroyed on disconnect. Owns its
/// history ring and input pipeline exclusively; no cross-player references.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u16,
    pub name: String,

    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub health: u8,
    pub is_dead: bool,
    pub respawn_time_ms: u64,
    pub weapon: u8,
    pub is_shooting: bool,
    pub last_shoot_time_ms: u64,

    pub score: u16,
    pub kills: u32,
    pub deaths: u32,

    pub last_processed_input: u32,

    pub grounded: bool,

    pub history: HistoryRing,
}

impl Player {
    pub fn new(id: u16, name: String, spawn: Vec3) -> Self {
        Self {
            id,
            name,
            position: spawn,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            health: MAX_HEALTH,
            is_dead: false,
            respawn_time_ms: 0,
            weapon: 0,
            is_shooting: false,
            last_shoot_time_ms: 0,
            score: 0,
            kills: 0,
            deaths: 0,
            last_processed_input: 0,
            grounded: false,
            history: HistoryRing::new(),
        }
    }

    /// Eye position used as the ray origin for shots: feet + eye-height offset.
    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + crate::constants::EYE_HEIGHT_OFFSET,
            self.position.z,
        )
    }

    /// Teleports the player to a fresh spawn point, restoring health and
    /// clearing death/respawn state. The history ring is cleared on spawn,
    /// since a lag-compensated rewind should never reach back across a death.
    pub fn respawn_at(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.health = MAX_HEALTH;
        self.is_dead = false;
        self.respawn_time_ms = 0;
        self.history.clear();
    }

    pub fn apply_damage(&mut self, damage: u8) {
        self.health = self.health.saturating_sub(damage);
    }
}
