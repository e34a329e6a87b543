//! World, physics, and combat constants shared by every room.
//!
//! These values are the deterministic contract between the authoritative
//! simulation and anything that replays its inputs: changing one changes
//! what "correct" client prediction looks like.

/// Simulation ticks per second. Fixed regardless of wall-clock jitter.
pub const TICK_RATE: u32 = 60;

/// Downward gravitational acceleration, world units/second^2.
pub const GRAVITY: f32 = 20.0;

/// Horizontal move speed, world units/second, before sprint/sneak modifiers.
pub const MOVE_SPEED: f32 = 5.0;

/// Multiplier applied to `MOVE_SPEED` while sprinting. Takes precedence over sneak.
pub const SPRINT_MULTIPLIER: f32 = 1.6;

/// Multiplier applied to `MOVE_SPEED` while sneaking.
pub const SNEAK_MULTIPLIER: f32 = 0.5;

/// Upward velocity applied on a valid jump.
pub const JUMP_FORCE: f32 = 8.0;

/// Player collision radius in the XZ plane.
pub const PLAYER_RADIUS: f32 = 0.4;

/// Player collision height along Y.
pub const PLAYER_HEIGHT: f32 = 1.8;

/// Half-angle clamp on pitch, radians, to keep the look direction just shy of straight up/down.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

/// Side length of the square playable map.
pub const MAP_SIZE: f32 = 50.0;

/// Number of randomly generated obstacles, before the four boundary walls.
pub const OBSTACLE_COUNT: u32 = 40;

/// Capacity of a player's position history ring.
pub const HISTORY_CAPACITY: usize = 300;

/// Maximum player health.
pub const MAX_HEALTH: u8 = 100;

/// Eye height offset above a player's feet when computing shot origin.
pub const EYE_HEIGHT_OFFSET: f32 = PLAYER_HEIGHT - 0.2;

/// Head hitbox radius, also used to offset the head center down from the top of the player.
pub const HEAD_HEIGHT: f32 = 0.3;

/// Body hitbox radius multiplier applied to `PLAYER_RADIUS`.
pub const BODY_RADIUS_MULTIPLIER: f32 = 1.5;

/// Headshot damage multiplier.
pub const HEADSHOT_MULTIPLIER: u32 = 2;

/// Maximum lag-compensation rewind window, milliseconds.
pub const MAX_LAG_COMPENSATION_MS: f64 = 400.0;

/// Wall-clock delay before a dead player may respawn, milliseconds.
pub const RESPAWN_TIME_MS: u64 = 2000;

/// Fixed ray-march step used for ray-vs-obstacle line-of-sight tests.
pub const RAY_STEP: f32 = 0.5;

/// Maximum players admitted to a single room.
pub const MAX_PLAYERS_PER_ROOM: usize = 16;

/// Upper bound on rooms a single supervisor manages.
pub const MAX_ROOMS: usize = 10;

/// Headroom the wire-codec scratch buffer is sized for (beyond `MAX_PLAYERS_PER_ROOM`).
pub const SCRATCH_PLAYER_CAPACITY: usize = 32;

/// Headroom the wire-codec scratch buffer is sized for, hit entries per tick.
pub const SCRATCH_HIT_CAPACITY: usize = 16;

/// Default world seed used when none is configured.
pub const DEFAULT_MAP_SEED: u32 = 12345;
