//! # Shared Simulation Core
//!
//! This crate holds everything that must agree bit-for-bit between an
//! authoritative room and anything that replays its inputs: world constants,
//! deterministic map generation, physics, lag-compensated history, the
//! binary wire protocol, and the game-mode policy. It has no network code
//! and no per-room bookkeeping of its own — those live in `server`.
//!
//! ## Modules
//!
//! - [`constants`]: world, physics, and combat tuning values.
//! - [`vec3`]: the one vector type used throughout.
//! - [`map`]: deterministic obstacle-field generation from a 32-bit seed.
//! - [`physics`]: gravity, collision, and the ray tests hit validation needs.
//! - [`history`]: per-player position history ring for rewind.
//! - [`player`]: per-player authoritative state.
//! - [`input`]: one client input frame, as decoded off the wire.
//! - [`weapon`]: the fixed weapon table.
//! - [`hit`]: a validated hit event, ready for wire encoding.
//! - [`mode`]: the `GameMode` trait and the default deathmatch policy.
//! - [`wire`]: the fixed-layout binary protocol.
//! - [`error`]: decode-time error type.
//!
//! ## Design philosophy
//!
//! ### Determinism first
//! Every function here is a pure function of its inputs: no wall-clock reads,
//! no hidden RNG state outside what's passed in explicitly. That's what lets
//! a room replay a client's lag-compensated past without drifting from what
//! actually happened.
//!
//! ### No self-describing wire format
//! Unlike most of this workspace's ambient stack, the wire protocol is not
//! `serde` + `bincode`. The layout in [`wire`] is a fixed byte contract a
//! client depends on at specific offsets; see that module's doc comment and
//! `DESIGN.md` for why.

pub mod constants;
pub mod error;
pub mod history;
pub mod hit;
pub mod input;
pub mod map;
pub mod mode;
pub mod physics;
pub mod player;
pub mod vec3;
pub mod weapon;
pub mod wire;

pub use constants::*;
pub use error::ProtocolError;
pub use history::HistoryRing;
pub use hit::HitEvent;
pub use input::InputRecord;
pub use map::{generate_obstacles, MapRng, Obstacle};
pub use mode::{Deathmatch, GameMode};
pub use physics::{apply_input_to_velocity, collides_with_any, collides_with_obstacle, ray_vs_obstacles, ray_vs_sphere, step};
pub use player::Player;
pub use vec3::Vec3;
pub use weapon::{weapon_for_index, WeaponDef, PISTOL, RIFLE, SHOTGUN, SMG, WEAPONS};
pub use wire::{
    decode_client_message, decode_snapshot, encode_ping, encode_welcome, patch_last_processed_input,
    ClientMessage, PlayerEntry, SnapshotEncoder, HIT_ENTRY_SIZE, MSG_INPUT, MSG_JOIN, MSG_PING,
    MSG_SNAPSHOT, MSG_WELCOME, PLAYER_ENTRY_SIZE, SNAPSHOT_HEADER_SIZE,
};
