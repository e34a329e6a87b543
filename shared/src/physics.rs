//! Gravity, AABB-vs-cylinder collision, and the two ray tests hit validation
//! depends on. Shared verbatim between anything that needs to predict or
//! authoritatively resolve the same physics.

use crate::constants::{
    GRAVITY, JUMP_FORCE, MAP_SIZE, MOVE_SPEED, PLAYER_HEIGHT, PLAYER_RADIUS, RAY_STEP,
    SNEAK_MULTIPLIER, SPRINT_MULTIPLIER,
};
use crate::input::InputRecord;
use crate::map::Obstacle;
use crate::player::Player;
use crate::vec3::Vec3;

/// Converts WASD + sprint/sneak flags into a world-space horizontal velocity
/// and applies a valid jump. Horizontal velocity is set directly (no
/// accumulation); sprint takes precedence over sneak when both are held.
pub fn apply_input_to_velocity(player: &mut Player, input: &InputRecord) {
    let mut dx = 0.0f32;
    let mut dz = 0.0f32;
    if input.forward {
        dz += 1.0;
    }
    if input.backward {
        dz -= 1.0;
    }
    if input.right {
        dx += 1.0;
    }
    if input.left {
        dx -= 1.0;
    }

    let len = (dx * dx + dz * dz).sqrt();
    if len > 1e-6 {
        dx /= len;
        dz /= len;
    }

    let yaw = input.yaw;
    let wx = dx * yaw.cos() + dz * yaw.sin();
    let wz = -dx * yaw.sin() + dz * yaw.cos();

    let speed = if input.sprint {
        MOVE_SPEED * SPRINT_MULTIPLIER
    } else if input.sneak {
        MOVE_SPEED * SNEAK_MULTIPLIER
    } else {
        MOVE_SPEED
    };

    player.velocity.x = wx * speed;
    player.velocity.z = wz * speed;

    if input.jump && player.grounded {
        player.velocity.y = JUMP_FORCE;
        player.grounded = false;
    }
}

/// True if a player standing with feet at `pos` overlaps `obstacle`: the XZ
/// point is clamped into the obstacle's box, and the squared distance to
/// that closest point must be under `PLAYER_RADIUS^2` with the player's Y
/// interval overlapping `[0, obstacle.height]`.
pub fn collides_with_obstacle(pos: Vec3, obstacle: &Obstacle) -> bool {
    let closest_x = pos.x.clamp(obstacle.min_x(), obstacle.max_x());
    let closest_z = pos.z.clamp(obstacle.min_z(), obstacle.max_z());
    let dx = pos.x - closest_x;
    let dz = pos.z - closest_z;
    let dist_sq = dx * dx + dz * dz;

    let y_overlap = pos.y <= obstacle.height && (pos.y + PLAYER_HEIGHT) >= 0.0;

    dist_sq < PLAYER_RADIUS * PLAYER_RADIUS && y_overlap
}

pub fn collides_with_any(pos: Vec3, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| collides_with_obstacle(pos, o))
}

/// Advances one fixed `dt` physics step: gravity, axis-separated obstacle
/// resolution (X, Z, then Y), ground-plane clamp, and map-bound clamp. This
/// exact axis order and the "revert + zero that axis's velocity" resolution
/// are what produces wall-sliding instead of a dead stop at contact.
pub fn step(player: &mut Player, obstacles: &[Obstacle], dt: f32) {
    player.velocity.y -= GRAVITY * dt;

    let start = player.position;
    let candidate = start.add(player.velocity.scale(dt));

    let mut next = start;

    // X axis, other axes held at pre-step values.
    let try_x = Vec3::new(candidate.x, start.y, start.z);
    if collides_with_any(try_x, obstacles) {
        player.velocity.x = 0.0;
    } else {
        next.x = candidate.x;
    }

    // Z axis, X already resolved, Y still pre-step.
    let try_z = Vec3::new(next.x, start.y, candidate.z);
    if collides_with_any(try_z, obstacles) {
        player.velocity.z = 0.0;
    } else {
        next.z = candidate.z;
    }

    // Y axis, combined with the resolved X/Z.
    let try_y = Vec3::new(next.x, candidate.y, next.z);
    if candidate.y <= 0.0 {
        next.y = 0.0;
        player.velocity.y = 0.0;
        player.grounded = true;
    } else if collides_with_any(try_y, obstacles) {
        next.y = start.y;
        player.velocity.y = 0.0;
    } else {
        next.y = candidate.y;
        player.grounded = false;
    }

    let half = MAP_SIZE / 2.0;
    next.x = next.x.clamp(-half + PLAYER_RADIUS, half - PLAYER_RADIUS);
    next.z = next.z.clamp(-half + PLAYER_RADIUS, half - PLAYER_RADIUS);

    player.position = next;
}

/// Fixed-step ray march against the obstacle field and the ground plane,
/// deliberately coarse (0.5-unit steps). Returns the distance to the first
/// hit, if any, within `max_distance`.
pub fn ray_vs_obstacles(origin: Vec3, direction: Vec3, max_distance: f32, obstacles: &[Obstacle]) -> Option<f32> {
    let dir = direction.normalize();
    if dir == Vec3::ZERO {
        return None;
    }

    let steps = (max_distance / RAY_STEP).floor() as i32;
    for step_index in 1..=steps {
        let dist = step_index as f32 * RAY_STEP;
        let point = origin.add(dir.scale(dist));

        if point.y < 0.0 {
            return Some(dist);
        }
        if obstacles.iter().any(|o| o.contains_point(point.x, point.y, point.z)) {
            return Some(dist);
        }
    }
    None
}

/// Standard ray-vs-sphere quadratic solve; returns the smaller non-negative
/// root within `max_distance`, or `None` on a miss.
pub fn ray_vs_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
    let dir = direction.normalize();
    if dir == Vec3::ZERO {
        return None;
    }

    let oc = origin.sub(center);
    let a = dir.dot(dir);
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    let root = if t1 >= 0.0 {
        t1
    } else if t2 >= 0.0 {
        t2
    } else {
        return None;
    };

    if root < max_distance {
        Some(root)
    } else {
        None
    }
}
