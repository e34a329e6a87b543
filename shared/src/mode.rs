//! Pluggable game-mode policy: spawn selection, kill/death bookkeeping, and
//! win conditions, decoupled from the tick driver itself.

use std::collections::HashMap;

use rand::Rng;

use crate::constants::{MAP_SIZE, RESPAWN_TIME_MS};
use crate::map::Obstacle;
use crate::player::Player;
use crate::vec3::Vec3;

/// Capability set a room's tick driver calls into at the points where scoring
/// and win conditions diverge between modes. Victim/killer are addressed by
/// id rather than passed as a pair of mutable references, since a single
/// `HashMap<u16, Player>` can't yield two simultaneous `&mut` borrows anyway.
pub trait GameMode {
    fn on_player_join(&mut self, player: &mut Player, obstacles: &[Obstacle]);
    fn on_player_leave(&mut self, player_id: u16);
    fn on_player_kill(&mut self, killer: &mut Player, victim_id: u16, headshot: bool);
    fn on_player_death(&mut self, victim: &mut Player, killer_id: Option<u16>, now_ms: u64);
    fn should_end_game(&self, players: &HashMap<u16, Player>) -> bool;
    fn get_winners<'a>(&self, players: &'a HashMap<u16, Player>) -> Vec<&'a Player>;
    fn get_spawn_position(&mut self, obstacles: &[Obstacle]) -> Vec3;
    fn tick(&mut self, players: &mut HashMap<u16, Player>, dt: f32);
}

/// Free-for-all deathmatch: uniform random spawn, no spawn-safety check,
/// +2 score for a headshot kill, +1 for a body kill, never ends on its own
/// (a room's lifetime is governed by player presence, not score).
#[derive(Debug, Default)]
pub struct Deathmatch;

impl Deathmatch {
    pub fn new() -> Self {
        Self
    }
}

impl GameMode for Deathmatch {
    fn on_player_join(&mut self, player: &mut Player, obstacles: &[Obstacle]) {
        player.position = self.get_spawn_position(obstacles);
    }

    fn on_player_leave(&mut self, _player_id: u16) {}

    fn on_player_kill(&mut self, killer: &mut Player, _victim_id: u16, headshot: bool) {
        killer.score = killer.score.saturating_add(if headshot { 2 } else { 1 });
        killer.kills += 1;
    }

    fn on_player_death(&mut self, victim: &mut Player, _killer_id: Option<u16>, now_ms: u64) {
        victim.respawn_time_ms = now_ms + RESPAWN_TIME_MS;
    }

    fn should_end_game(&self, _players: &HashMap<u16, Player>) -> bool {
        false
    }

    fn get_winners<'a>(&self, players: &'a HashMap<u16, Player>) -> Vec<&'a Player> {
        let top = players.values().map(|p| p.score).max().unwrap_or(0);
        players.values().filter(|p| p.score == top).collect()
    }

    /// Uniform random point in the inner square, `MAP_SIZE/2 - 2` units from
    /// each wall, at a fixed spawn height. No obstacle-overlap check: a spawn
    /// landing inside an obstacle resolves itself on the next physics step.
    fn get_spawn_position(&mut self, _obstacles: &[Obstacle]) -> Vec3 {
        let mut rng = rand::thread_rng();
        let half = MAP_SIZE / 2.0 - 2.0;
        Vec3::new(rng.gen_range(-half..half), 5.0, rng.gen_range(-half..half))
    }

    fn tick(&mut self, _players: &mut HashMap<u16, Player>, _dt: f32) {}
}
