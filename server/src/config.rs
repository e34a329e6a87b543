//! Server configuration: every tunable is environment-first with a command
//! line override, per the deployment contract in `DESIGN.md`.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Authoritative FPS room server")]
pub struct Config {
    /// TCP port players connect to.
    #[arg(long, env = "PORT", default_value_t = 9001)]
    pub port: u16,

    /// Interface to bind the game and health listeners on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Simulation ticks per second.
    #[arg(long, env = "TICK_RATE", default_value_t = 60)]
    pub tick_rate: u32,

    /// Players admitted to a single room before a new one is opened.
    #[arg(long, env = "MAX_PLAYERS_PER_ROOM", default_value_t = 16)]
    pub max_players_per_room: usize,

    /// Rooms the supervisor will open concurrently before rejecting joins.
    #[arg(long, env = "MAX_ROOMS", default_value_t = 10)]
    pub max_rooms: usize,

    /// Rewind window hit validation is allowed to reach into, milliseconds.
    #[arg(long, env = "MAX_LAG_COMPENSATION", default_value_t = 400)]
    pub max_lag_compensation_ms: u64,

    /// Seed every room's obstacle field is generated from.
    #[arg(long, env = "MAP_SEED", default_value_t = 12345)]
    pub map_seed: u32,

    /// Connection string for the stats database. Unset falls back to an
    /// in-memory store with a logged warning at startup.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port the `/health` liveness endpoint listens on.
    #[arg(long, env = "HEALTH_PORT", default_value_t = 9002)]
    pub health_port: u16,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.host, self.health_port)
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }
}
