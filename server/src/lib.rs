//! # Game Server Library
//!
//! This library provides the authoritative server implementation for the
//! networked multiplayer shooter. It manages every room's canonical state,
//! validates client inputs and shots, and broadcasts personalized snapshots
//! to keep connected clients synchronized.
//!
//! ## Core responsibilities
//!
//! ### Authoritative simulation
//! Each room runs the definitive version of the physics and combat rules
//! from `shared`. Clients predict locally and reconcile against whatever a
//! room decides actually happened; the room's decision is final.
//!
//! ### Connection lifecycle
//! [`network`] handles the TCP transport end to end: admission (JOIN ->
//! WELCOME), routing decoded INPUT into the right room, PING echo, and
//! idle-timeout disconnection.
//!
//! ### Room placement and supervision
//! [`supervisor`] places every newly admitted player into the first room
//! with space, opening new rooms on demand up to a configured bound, and
//! runs each room's fixed-rate tick loop for as long as it has players.
//!
//! ## Architecture
//!
//! ### One executor per room
//! A room's state is never touched by two tasks at once: the tick loop and
//! any connection queuing input into it synchronize through a single
//! `tokio::sync::Mutex<Room>`, held only for the duration of one tick or one
//! queue push. No room's state is visible to, or shared with, any other
//! room.
//!
//! ### TCP, not UDP
//! Unlike the low-latency UDP transport this architecture's ancestor used,
//! this protocol needs ordered, intact delivery of every INPUT and
//! SNAPSHOT — see `network`'s module doc and `DESIGN.md` for the reasoning.

pub mod client_manager;
pub mod config;
pub mod hit_validator;
pub mod network;
pub mod room;
pub mod stats;
pub mod supervisor;
