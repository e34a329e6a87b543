//! # Server Network Layer
//!
//! TCP transport: per-connection length-prefixed framing, admission, and the
//! out-of-core health endpoint. Every message is a `u32` little-endian byte
//! count followed by that many payload bytes — the frame the fixed message
//! layout in `shared::wire` is written into and read out of.
//!
//! A malformed message body is logged and dropped; the connection stays
//! open. A corrupt length prefix can't be resynchronized, so it closes the
//! connection instead, alongside a read error, EOF, or a prolonged idle
//! period.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

use shared::{decode_client_message, encode_ping, encode_welcome, ClientMessage, TICK_RATE};

use crate::client_manager::IdleTimer;
use crate::room::{OutboundSender, Room};
use crate::stats::StatsStore;
use crate::supervisor::Supervisor;

const MAX_FRAME_LEN: u32 = 64 * 1024;
const READ_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of reading one length-prefixed frame. A bad length prefix is
/// distinguished from a closed connection: the former is the "malformed
/// message" policy (log and keep the connection open), the latter ends it.
enum FrameRead {
    Frame(Vec<u8>),
    Eof,
    BadLength(u32),
}

async fn read_frame(reader: &mut (impl AsyncReadExt + Unpin)) -> std::io::Result<FrameRead> {
    let mut len_buf = [0u8; 4];
    if reader.read_exact(&mut len_buf).await.is_err() {
        return Ok(FrameRead::Eof);
    }
    let len = u32::from_le_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_LEN {
        return Ok(FrameRead::BadLength(len));
    }
    let mut buf = vec![0u8; len as usize];
    if reader.read_exact(&mut buf).await.is_err() {
        return Ok(FrameRead::Eof);
    }
    Ok(FrameRead::Frame(buf))
}

async fn write_frame(writer: &mut (impl AsyncWriteExt + Unpin), payload: &[u8]) -> std::io::Result<()> {
    writer.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Drives one TCP connection end to end: reads frames, admits the player on
/// JOIN, forwards INPUT into its room, answers PING directly, and relays
/// whatever the outbound channel hands it (the WELCOME, then every
/// broadcast SNAPSHOT) back over the socket.
async fn handle_connection(
    stream: TcpStream,
    supervisor: Arc<Mutex<Supervisor>>,
    stats: Arc<dyn StatsStore>,
) {
    let peer = stream.peer_addr().ok();
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    let (out_tx, mut out_rx): (OutboundSender, _) = mpsc::unbounded_channel();

    let writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if write_frame(&mut writer, &frame).await.is_err() {
                break;
            }
        }
    });

    let mut membership: Option<(u32, u16, Arc<Mutex<Room>>)> = None;
    let mut stats_user_id: Option<u32> = None;
    let mut idle = IdleTimer::new();

    loop {
        let frame = match tokio::time::timeout(READ_POLL_INTERVAL, read_frame(&mut reader)).await {
            Ok(Ok(FrameRead::Frame(frame))) => frame,
            Ok(Ok(FrameRead::Eof)) => break,
            Ok(Ok(FrameRead::BadLength(len))) => {
                // The length prefix itself is corrupt: the byte stream can't
                // be resynchronized, so unlike a malformed message body this
                // ends the connection rather than merely dropping one frame.
                warn!("bad frame length {len} from {peer:?}, closing connection");
                break;
            }
            Ok(Err(e)) => {
                warn!("read error from {peer:?}: {e}");
                break;
            }
            Err(_) => {
                if idle.is_timed_out() {
                    info!("connection {peer:?} idle-timed out");
                    break;
                }
                continue;
            }
        };
        idle.touch();

        let message = match decode_client_message(&frame) {
            Ok(m) => m,
            Err(e) => {
                warn!("malformed message from {peer:?}: {e}");
                continue;
            }
        };

        match message {
            ClientMessage::Join { name } => {
                if membership.is_some() {
                    continue;
                }
                let admitted = supervisor.lock().await.admit(name.clone(), out_tx.clone()).await;
                match admitted {
                    Some((room_id, player_id, room)) => {
                        let map_seed = room.lock().await.map_seed;
                        let mut welcome = Vec::new();
                        encode_welcome(&mut welcome, player_id, TICK_RATE as u8, map_seed);
                        let _ = out_tx.send(welcome);
                        membership = Some((room_id, player_id, room));
                        stats_user_id = Some(stats.create_user(&name).id);
                    }
                    None => {
                        debug!("rejecting connection {peer:?}: every room is full");
                        break;
                    }
                }
            }
            ClientMessage::Input(input) => match &membership {
                Some((_, player_id, room)) => {
                    room.lock().await.queue_input(*player_id, input);
                }
                None => {
                    // Unsolicited input before admission: ignored.
                }
            },
            ClientMessage::Ping { client_time_ms } => {
                let mut echo = Vec::new();
                encode_ping(&mut echo, client_time_ms);
                let _ = out_tx.send(echo);
            }
        }
    }

    if let Some((room_id, player_id, room)) = membership {
        let (became_empty, kills, deaths) = {
            let mut room = room.lock().await;
            let (kills, deaths) = room
                .players()
                .get(&player_id)
                .map(|p| (p.kills, p.deaths))
                .unwrap_or((0, 0));
            room.remove_player(player_id);
            (room.is_empty(), kills, deaths)
        };
        if let Some(user_id) = stats_user_id {
            stats.update_stats(user_id, kills, deaths);
        }
        if became_empty {
            supervisor.lock().await.forget_if_empty(room_id);
        }
    }
    writer_task.abort();
}

/// Accepts connections forever, handing each its own task. `stats` is the
/// persistence collaborator touched only at admission and disconnect, never
/// from inside a room's tick.
pub async fn run_tcp_listener(
    addr: &str,
    supervisor: Arc<Mutex<Supervisor>>,
    stats: Arc<dyn StatsStore>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening for players on {addr}");
    loop {
        let (stream, _) = listener.accept().await?;
        let supervisor = Arc::clone(&supervisor);
        let stats = Arc::clone(&stats);
        tokio::spawn(handle_connection(stream, supervisor, stats));
    }
}

/// Minimal `GET /health` responder, deliberately no HTTP framework — this
/// is the one route a deployment's liveness probe needs.
pub async fn run_health_listener(addr: &str, supervisor: Arc<Mutex<Supervisor>>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("health endpoint listening on {addr}");
    loop {
        let (mut stream, _) = listener.accept().await?;
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            if stream.read(&mut buf).await.is_err() {
                return;
            }
            let (rooms, players) = {
                let sup = supervisor.lock().await;
                let rooms = sup.room_count();
                let players = sup.player_count().await;
                (rooms, players)
            };
            let body = format!("{{\"status\":\"ok\",\"rooms\":{rooms},\"players\":{players}}}");
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_length_cap_rejects_absurd_sizes() {
        assert!(MAX_FRAME_LEN < u32::MAX / 2);
    }

    #[tokio::test]
    async fn read_frame_round_trips_a_well_formed_frame() {
        let payload = vec![1u8, 2, 3];
        let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(&payload);
        let mut cursor = std::io::Cursor::new(bytes);
        match read_frame(&mut cursor).await.unwrap() {
            FrameRead::Frame(frame) => assert_eq!(frame, payload),
            _ => panic!("expected a frame"),
        }
    }

    #[tokio::test]
    async fn read_frame_reports_oversized_length_without_erroring() {
        let bytes = (MAX_FRAME_LEN + 1).to_le_bytes().to_vec();
        let mut cursor = std::io::Cursor::new(bytes);
        match read_frame(&mut cursor).await.unwrap() {
            FrameRead::BadLength(len) => assert_eq!(len, MAX_FRAME_LEN + 1),
            _ => panic!("expected BadLength"),
        }
    }

    #[tokio::test]
    async fn read_frame_reports_eof_on_an_empty_stream() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        match read_frame(&mut cursor).await.unwrap() {
            FrameRead::Eof => {}
            _ => panic!("expected Eof"),
        }
    }
}
