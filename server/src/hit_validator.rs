//! Per-shoot-input hit validation: fire-rate gating, lag-compensated rewind,
//! head-then-body ray tests against every other alive player, and the
//! obstacle line-of-sight check that can still block a nearer hit. This is
//! the one place a room's tick loop reaches across players.

use std::collections::HashMap;

use rand::Rng;

use shared::{
    ray_vs_obstacles, ray_vs_sphere, weapon_for_index, GameMode, HitEvent, InputRecord, Obstacle,
    Player, Vec3, BODY_RADIUS_MULTIPLIER, HEAD_HEIGHT, MAX_LAG_COMPENSATION_MS, PLAYER_HEIGHT,
    PLAYER_RADIUS,
};

/// Validates and applies one `shoot` input, returning the `HitEvent`s it
/// produced (zero, one, or — for the shotgun — several, since each pellet is
/// an independent ray). Mutates `players` in place: the shooter's
/// `last_shoot_time_ms` on a successful fire-rate check, and any struck
/// target's health/death state. Kill/death notifications go through `mode`
/// exactly as described in its trait doc.
pub fn process_shot(
    shooter_id: u16,
    input: &InputRecord,
    players: &mut HashMap<u16, Player>,
    obstacles: &[Obstacle],
    mode: &mut dyn GameMode,
    now_ms: f64,
    rng: &mut impl Rng,
) -> Vec<HitEvent> {
    let mut hits = Vec::new();
    let weapon = weapon_for_index(input.weapon);
    let now_ms_u64 = now_ms as u64;

    let shooter_snapshot = match players.get(&shooter_id) {
        Some(p) if !p.is_dead => Some((p.eye_position(), p.yaw, p.pitch, p.last_shoot_time_ms)),
        _ => None,
    };
    let (origin, yaw, pitch, last_shoot) = match shooter_snapshot {
        Some(s) => s,
        None => return hits,
    };

    if now_ms_u64.saturating_sub(last_shoot) < weapon.fire_rate_ms {
        return hits;
    }
    if let Some(shooter) = players.get_mut(&shooter_id) {
        shooter.last_shoot_time_ms = now_ms_u64;
    }

    let t_r = input.timestamp_ms.clamp(now_ms - MAX_LAG_COMPENSATION_MS, now_ms);

    for _ in 0..weapon.bullet_count {
        let base = Vec3::new(yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos());
        let direction = if weapon.spread > 0.0 {
            let half = weapon.spread / 2.0;
            let jittered = Vec3::new(
                base.x + rng.gen_range(-half..half),
                base.y + rng.gen_range(-half..half),
                base.z + rng.gen_range(-half..half),
            );
            let normalized = jittered.normalize();
            if normalized == Vec3::ZERO {
                continue; // degenerate post-perturbation direction: a miss
            }
            normalized
        } else {
            base.normalize()
        };

        let mut nearest: Option<(u16, f32, bool)> = None;
        for (&pid, player) in players.iter() {
            if pid == shooter_id || player.is_dead {
                continue;
            }
            let pos = match player.history.query(t_r) {
                Some(p) => p,
                None => continue, // no history yet: this bullet can't hit them
            };

            let head_center = Vec3::new(pos.x, pos.y + PLAYER_HEIGHT - HEAD_HEIGHT, pos.z);
            if let Some(d) = ray_vs_sphere(origin, direction, head_center, HEAD_HEIGHT, weapon.range) {
                if nearest.map_or(true, |(_, nd, _)| d < nd) {
                    nearest = Some((pid, d, true));
                }
                continue;
            }

            let body_center = Vec3::new(pos.x, pos.y + PLAYER_HEIGHT / 2.0, pos.z);
            let body_radius = PLAYER_RADIUS * BODY_RADIUS_MULTIPLIER;
            if let Some(d) = ray_vs_sphere(origin, direction, body_center, body_radius, weapon.range) {
                if nearest.map_or(true, |(_, nd, _)| d < nd) {
                    nearest = Some((pid, d, false));
                }
            }
        }

        let Some((target_id, dist, headshot)) = nearest else {
            continue;
        };

        if let Some(obstacle_dist) = ray_vs_obstacles(origin, direction, dist, obstacles) {
            if obstacle_dist < dist {
                continue; // an obstacle sits between the shooter and the target
            }
        }

        let damage = weapon.damage.saturating_mul(if headshot { 2 } else { 1 });
        hits.push(HitEvent { shooter_id, target_id, damage, headshot });

        let mut killed = false;
        if let Some(target) = players.get_mut(&target_id) {
            if !target.is_dead {
                target.apply_damage(damage);
                if target.health == 0 {
                    target.is_dead = true;
                    target.deaths += 1;
                    killed = true;
                }
            }
        }
        if killed {
            if let Some(target) = players.get_mut(&target_id) {
                mode.on_player_death(target, Some(shooter_id), now_ms_u64);
            }
            if let Some(killer) = players.get_mut(&shooter_id) {
                mode.on_player_kill(killer, target_id, headshot);
            }
        }
    }

    hits
}
