//! The bit-exact binary wire protocol. Little-endian throughout,
//! every field width fixed. Encoding writes into a caller-supplied scratch
//! buffer so a room's hot path never allocates per tick; decoding reads
//! straight out of a received byte slice with no intermediate allocation
//! either.
//!
//! This is a hand-rolled codec, not `bincode`: the layout below is a fixed
//! contract a client implementation depends on byte-for-byte, which rules
//! out a self-describing or varint-prefixed format. See DESIGN.md for the
//! reasoning behind dropping the UDP+bincode transport this grew out of.

use crate::error::ProtocolError;
use crate::hit::HitEvent;
use crate::input::InputRecord;

pub const MSG_JOIN: u8 = 1;
pub const MSG_INPUT: u8 = 2;
pub const MSG_PING: u8 = 3;

pub const MSG_WELCOME: u8 = 1;
pub const MSG_SNAPSHOT: u8 = 2;

pub const PLAYER_ENTRY_SIZE: usize = 40;
pub const HIT_ENTRY_SIZE: usize = 6;
pub const SNAPSHOT_HEADER_SIZE: usize = 19;

/// A decoded client -> server message.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join { name: String },
    Input(InputRecord),
    Ping { client_time_ms: f64 },
}

/// One player's state as it appears in a SNAPSHOT, already shaped for the
/// 40-byte wire entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerEntry {
    pub id: u16,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub health: u8,
    pub weapon: u8,
    pub is_shooting: bool,
    pub is_dead: bool,
    pub score: u16,
}

/// Decodes one client message from a single transport-level frame.
/// Unknown types, truncated frames, and over-long JOIN name lengths are
/// reported as [`ProtocolError`] rather than panicking — the caller's
/// policy is to drop and log, never to disconnect or crash.
pub fn decode_client_message(buf: &[u8]) -> Result<ClientMessage, ProtocolError> {
    if buf.is_empty() {
        return Err(ProtocolError::Truncated);
    }

    match buf[0] {
        MSG_JOIN => {
            if buf.len() < 2 {
                return Err(ProtocolError::Truncated);
            }
            let name_len = buf[1] as usize;
            if buf.len() < 2 + name_len {
                return Err(ProtocolError::NameLengthExceedsPayload);
            }
            let name = String::from_utf8_lossy(&buf[2..2 + name_len]).into_owned();
            Ok(ClientMessage::Join { name })
        }
        MSG_INPUT => {
            // [type][u32 seq][u8 flags][u8 weapon][f32 yaw][f32 pitch][f64 timestamp]
            if buf.len() < 23 {
                return Err(ProtocolError::Truncated);
            }
            let sequence = u32::from_le_bytes(buf[1..5].try_into().unwrap());
            let flags = buf[5];
            let weapon = buf[6];
            let yaw = f32::from_le_bytes(buf[7..11].try_into().unwrap());
            let pitch = f32::from_le_bytes(buf[11..15].try_into().unwrap());
            let timestamp_ms = f64::from_le_bytes(buf[15..23].try_into().unwrap());

            let (forward, backward, left, right, jump, sprint, sneak, shoot) =
                InputRecord::from_flags_byte(flags);

            Ok(ClientMessage::Input(InputRecord {
                sequence,
                forward,
                backward,
                left,
                right,
                jump,
                sprint,
                sneak,
                shoot,
                weapon,
                yaw,
                pitch,
                timestamp_ms,
            }))
        }
        MSG_PING => {
            if buf.len() < 9 {
                return Err(ProtocolError::Truncated);
            }
            let client_time_ms = f64::from_le_bytes(buf[1..9].try_into().unwrap());
            Ok(ClientMessage::Ping { client_time_ms })
        }
        other => Err(ProtocolError::UnknownType(other)),
    }
}

/// Encodes a WELCOME message (8 bytes) into `out`, replacing its contents.
pub fn encode_welcome(out: &mut Vec<u8>, player_id: u16, tick_rate: u8, map_seed: u32) {
    out.clear();
    out.push(MSG_WELCOME);
    out.extend_from_slice(&player_id.to_le_bytes());
    out.push(tick_rate);
    out.extend_from_slice(&map_seed.to_le_bytes());
}

/// Encodes the PING echo (9 bytes), verbatim round-trip of the client's frame.
pub fn encode_ping(out: &mut Vec<u8>, client_time_ms: f64) {
    out.clear();
    out.push(MSG_PING);
    out.extend_from_slice(&client_time_ms.to_le_bytes());
}

fn write_player_entry(out: &mut Vec<u8>, p: &PlayerEntry) {
    out.extend_from_slice(&p.id.to_le_bytes());
    out.extend_from_slice(&p.x.to_le_bytes());
    out.extend_from_slice(&p.y.to_le_bytes());
    out.extend_from_slice(&p.z.to_le_bytes());
    out.extend_from_slice(&p.vx.to_le_bytes());
    out.extend_from_slice(&p.vy.to_le_bytes());
    out.extend_from_slice(&p.vz.to_le_bytes());
    out.extend_from_slice(&p.yaw.to_le_bytes());
    out.extend_from_slice(&p.pitch.to_le_bytes());
    out.push(p.health);
    out.push(p.weapon);
    out.push(p.is_shooting as u8);
    out.push(p.is_dead as u8);
    out.extend_from_slice(&p.score.to_le_bytes());
}

fn write_hit_entry(out: &mut Vec<u8>, h: &HitEvent) {
    out.extend_from_slice(&h.shooter_id.to_le_bytes());
    out.extend_from_slice(&h.target_id.to_le_bytes());
    out.push(h.damage);
    out.push(h.headshot as u8);
}

/// Reusable per-room scratch buffer for SNAPSHOT encoding. Sized for
/// `SCRATCH_PLAYER_CAPACITY` players and `SCRATCH_HIT_CAPACITY` hits of
/// headroom, reused tick over tick so the hot path never grows the heap
/// proportional to player or bullet count.
pub struct SnapshotEncoder {
    buf: Vec<u8>,
}

impl SnapshotEncoder {
    pub fn new() -> Self {
        use crate::constants::{SCRATCH_HIT_CAPACITY, SCRATCH_PLAYER_CAPACITY};
        Self {
            buf: Vec::with_capacity(
                SNAPSHOT_HEADER_SIZE
                    + SCRATCH_PLAYER_CAPACITY * PLAYER_ENTRY_SIZE
                    + SCRATCH_HIT_CAPACITY * HIT_ENTRY_SIZE,
            ),
        }
    }

    /// Encodes one SNAPSHOT message and returns the encoded bytes borrowed
    /// from the internal scratch buffer (valid until the next `encode*` call).
    pub fn encode(
        &mut self,
        tick: u32,
        server_time_ms: f64,
        last_processed_input: u32,
        players: &[PlayerEntry],
        hits: &[HitEvent],
    ) -> &[u8] {
        self.buf.clear();
        self.buf.push(MSG_SNAPSHOT);
        self.buf.extend_from_slice(&tick.to_le_bytes());
        self.buf.extend_from_slice(&server_time_ms.to_le_bytes());
        self.buf.push(players.len() as u8);
        self.buf.push(hits.len() as u8);
        self.buf.extend_from_slice(&last_processed_input.to_le_bytes());

        for p in players {
            write_player_entry(&mut self.buf, p);
        }
        for h in hits {
            write_hit_entry(&mut self.buf, h);
        }

        &self.buf
    }
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrites the `lastProcessedInput` field of an already-encoded SNAPSHOT
/// in place. A room's player entries and hit list are identical for every
/// recipient in a tick; only this one field is personalized, so a broadcast
/// can encode the shared body once and patch this field per recipient
/// instead of re-running the full encode for each connection.
pub fn patch_last_processed_input(buf: &mut [u8], last_processed_input: u32) {
    buf[15..19].copy_from_slice(&last_processed_input.to_le_bytes());
}

/// Decodes a SNAPSHOT message, mainly used by tests and any future client
/// implementation that needs to verify the server's encoding.
pub fn decode_snapshot(buf: &[u8]) -> Result<(u32, f64, u32, Vec<PlayerEntry>, Vec<HitEvent>), ProtocolError> {
    if buf.is_empty() || buf[0] != MSG_SNAPSHOT || buf.len() < SNAPSHOT_HEADER_SIZE {
        return Err(ProtocolError::Truncated);
    }
    let tick = u32::from_le_bytes(buf[1..5].try_into().unwrap());
    let server_time_ms = f64::from_le_bytes(buf[5..13].try_into().unwrap());
    let player_count = buf[13] as usize;
    let hit_count = buf[14] as usize;
    let last_processed_input = u32::from_le_bytes(buf[15..19].try_into().unwrap());

    let players_end = SNAPSHOT_HEADER_SIZE + player_count * PLAYER_ENTRY_SIZE;
    let hits_end = players_end + hit_count * HIT_ENTRY_SIZE;
    if buf.len() < hits_end {
        return Err(ProtocolError::Truncated);
    }

    let mut players = Vec::with_capacity(player_count);
    for i in 0..player_count {
        let off = SNAPSHOT_HEADER_SIZE + i * PLAYER_ENTRY_SIZE;
        let e = &buf[off..off + PLAYER_ENTRY_SIZE];
        players.push(PlayerEntry {
            id: u16::from_le_bytes(e[0..2].try_into().unwrap()),
            x: f32::from_le_bytes(e[2..6].try_into().unwrap()),
            y: f32::from_le_bytes(e[6..10].try_into().unwrap()),
            z: f32::from_le_bytes(e[10..14].try_into().unwrap()),
            vx: f32::from_le_bytes(e[14..18].try_into().unwrap()),
            vy: f32::from_le_bytes(e[18..22].try_into().unwrap()),
            vz: f32::from_le_bytes(e[22..26].try_into().unwrap()),
            yaw: f32::from_le_bytes(e[26..30].try_into().unwrap()),
            pitch: f32::from_le_bytes(e[30..34].try_into().unwrap()),
            health: e[34],
            weapon: e[35],
            is_shooting: e[36] != 0,
            is_dead: e[37] != 0,
            score: u16::from_le_bytes(e[38..40].try_into().unwrap()),
        });
    }

    let mut hits = Vec::with_capacity(hit_count);
    for i in 0..hit_count {
        let off = players_end + i * HIT_ENTRY_SIZE;
        let e = &buf[off..off + HIT_ENTRY_SIZE];
        hits.push(HitEvent {
            shooter_id: u16::from_le_bytes(e[0..2].try_into().unwrap()),
            target_id: u16::from_le_bytes(e[2..4].try_into().unwrap()),
            damage: e[4],
            headshot: e[5] != 0,
        });
    }

    Ok((tick, server_time_ms, last_processed_input, players, hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_roundtrip() {
        let mut frame = vec![MSG_JOIN];
        let name = b"Alice";
        frame.push(name.len() as u8);
        frame.extend_from_slice(name);

        match decode_client_message(&frame).unwrap() {
            ClientMessage::Join { name } => assert_eq!(name, "Alice"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn join_name_length_exceeds_payload_is_reported() {
        let frame = vec![MSG_JOIN, 10, b'A', b'B'];
        assert_eq!(decode_client_message(&frame), Err(ProtocolError::NameLengthExceedsPayload));
    }

    #[test]
    fn input_roundtrip_exact_offsets() {
        let mut frame = vec![MSG_INPUT];
        frame.extend_from_slice(&7u32.to_le_bytes());
        frame.push(0b1000_0001); // forward + shoot
        frame.push(2); // weapon = rifle
        frame.extend_from_slice(&1.5f32.to_le_bytes());
        frame.extend_from_slice(&(-0.3f32).to_le_bytes());
        frame.extend_from_slice(&12345.0f64.to_le_bytes());

        match decode_client_message(&frame).unwrap() {
            ClientMessage::Input(input) => {
                assert_eq!(input.sequence, 7);
                assert!(input.forward);
                assert!(input.shoot);
                assert_eq!(input.weapon, 2);
                assert_eq!(input.yaw, 1.5);
                assert_eq!(input.pitch, -0.3);
                assert_eq!(input.timestamp_ms, 12345.0);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn input_ignores_trailing_duplicated_tail() {
        // A second weapon/yaw/pitch/timestamp tail appended after the canonical
        // one. The decoder must read only the first copy at the fixed offsets
        // and ignore the rest.
        let mut frame = vec![MSG_INPUT];
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.push(0);
        frame.push(0);
        frame.extend_from_slice(&0.1f32.to_le_bytes());
        frame.extend_from_slice(&0.2f32.to_le_bytes());
        frame.extend_from_slice(&1000.0f64.to_le_bytes());
        // Duplicated tail the decoder should ignore.
        frame.push(9);
        frame.extend_from_slice(&9.9f32.to_le_bytes());
        frame.extend_from_slice(&9.9f32.to_le_bytes());
        frame.extend_from_slice(&9999.0f64.to_le_bytes());

        match decode_client_message(&frame).unwrap() {
            ClientMessage::Input(input) => {
                assert_eq!(input.yaw, 0.1);
                assert_eq!(input.pitch, 0.2);
                assert_eq!(input.timestamp_ms, 1000.0);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn ping_echo_roundtrip() {
        let mut out = Vec::new();
        encode_ping(&mut out, 42.5);
        match decode_client_message(&out).unwrap() {
            ClientMessage::Ping { client_time_ms } => assert_eq!(client_time_ms, 42.5),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_type_is_reported() {
        assert_eq!(decode_client_message(&[200]), Err(ProtocolError::UnknownType(200)));
    }

    #[test]
    fn welcome_is_eight_bytes() {
        let mut out = Vec::new();
        encode_welcome(&mut out, 3, 60, 12345);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], MSG_WELCOME);
        assert_eq!(u16::from_le_bytes(out[1..3].try_into().unwrap()), 3);
        assert_eq!(out[3], 60);
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 12345);
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut encoder = SnapshotEncoder::new();
        let players = vec![PlayerEntry {
            id: 1,
            x: 1.0,
            y: 2.0,
            z: 3.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            health: 100,
            weapon: 0,
            is_shooting: false,
            is_dead: false,
            score: 5,
        }];
        let hits = vec![HitEvent { shooter_id: 1, target_id: 2, damage: 35, headshot: true }];

        let encoded = encoder.encode(10, 12345.0, 7, &players, &hits).to_vec();
        let (tick, server_time, last_input, decoded_players, decoded_hits) =
            decode_snapshot(&encoded).unwrap();

        assert_eq!(tick, 10);
        assert_eq!(server_time, 12345.0);
        assert_eq!(last_input, 7);
        assert_eq!(decoded_players, players);
        assert_eq!(decoded_hits, hits);
    }

    #[test]
    fn patch_last_processed_input_overwrites_only_that_field() {
        let mut encoder = SnapshotEncoder::new();
        let encoded = encoder.encode(1, 100.0, 7, &[], &[]).to_vec();
        let mut patched = encoded.clone();
        patch_last_processed_input(&mut patched, 99);

        let (_, _, last_input, _, _) = decode_snapshot(&patched).unwrap();
        assert_eq!(last_input, 99);
        // Everything outside the patched field is untouched.
        assert_eq!(&patched[..15], &encoded[..15]);
    }

    #[test]
    fn snapshot_entry_sizes_match_contract() {
        assert_eq!(PLAYER_ENTRY_SIZE, 40);
        assert_eq!(HIT_ENTRY_SIZE, 6);
        assert_eq!(SNAPSHOT_HEADER_SIZE, 19);
    }
}
