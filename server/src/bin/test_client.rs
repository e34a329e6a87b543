//! A manual TCP client for exercising a running room server by hand: joins,
//! sends a handful of INPUT frames, and prints every WELCOME/SNAPSHOT it
//! receives. Not part of the test suite — a debugging aid, run with
//! `cargo run --bin test_client`.

use std::time::{SystemTime, UNIX_EPOCH};

use shared::{decode_snapshot, InputRecord, MSG_SNAPSHOT, MSG_WELCOME};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> std::io::Result<()> {
    stream.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    stream.write_all(payload).await
}

async fn read_frame(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}

fn encode_join(name: &str) -> Vec<u8> {
    let mut out = vec![shared::MSG_JOIN, name.len() as u8];
    out.extend_from_slice(name.as_bytes());
    out
}

fn encode_input(input: &InputRecord) -> Vec<u8> {
    let mut out = vec![shared::MSG_INPUT];
    out.extend_from_slice(&input.sequence.to_le_bytes());
    out.push(input.flags_byte());
    out.push(input.weapon);
    out.extend_from_slice(&input.yaw.to_le_bytes());
    out.extend_from_slice(&input.pitch.to_le_bytes());
    out.extend_from_slice(&input.timestamp_ms.to_le_bytes());
    out
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:9001".to_string());
    println!("connecting to {addr}");
    let mut stream = TcpStream::connect(&addr).await?;

    write_frame(&mut stream, &encode_join("test_client")).await?;
    let welcome = read_frame(&mut stream).await?;
    let mut player_id = 0u16;
    if welcome.first() == Some(&MSG_WELCOME) {
        player_id = u16::from_le_bytes(welcome[1..3].try_into().unwrap());
        let tick_rate = welcome[3];
        let map_seed = u32::from_le_bytes(welcome[4..8].try_into().unwrap());
        println!("welcomed as player {player_id} (tick rate {tick_rate}, map seed {map_seed})");
    } else {
        println!("unexpected first frame: {welcome:?}");
    }

    for sequence in 0..10u32 {
        let input = InputRecord {
            sequence,
            forward: true,
            backward: false,
            left: false,
            right: false,
            jump: false,
            sprint: false,
            sneak: false,
            shoot: sequence % 3 == 0,
            weapon: 2,
            yaw: 0.0,
            pitch: 0.0,
            timestamp_ms: now_ms(),
        };
        write_frame(&mut stream, &encode_input(&input)).await?;

        let frame = read_frame(&mut stream).await?;
        if frame.first() == Some(&MSG_SNAPSHOT) {
            match decode_snapshot(&frame) {
                Ok((tick, server_time, last_processed, players, hits)) => {
                    println!(
                        "tick {tick} at {server_time:.1}ms, last processed input {last_processed}, {} players, {} hits",
                        players.len(),
                        hits.len()
                    );
                    for p in &players {
                        if p.id == player_id {
                            println!("  self: pos=({:.2},{:.2},{:.2}) health={}", p.x, p.y, p.z, p.health);
                        }
                    }
                }
                Err(e) => println!("failed to decode snapshot: {e}"),
            }
        }

        sleep(Duration::from_millis(16)).await;
    }

    println!("test client finished");
    Ok(())
}
