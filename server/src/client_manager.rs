//! Idle-connection detection for the network layer. Narrowed down from the
//! teacher's `ClientManager`, which keyed a whole room's worth of pending
//! input queues by socket address: a room now owns its players and their
//! input queues directly, so the one concern left here is noticing when a
//! single TCP connection has gone quiet.

use std::time::{Duration, Instant};

pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct IdleTimer {
    last_seen: Instant,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self { last_seen: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn is_timed_out(&self) -> bool {
        self.last_seen.elapsed() > IDLE_TIMEOUT
    }
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new()
    }
}
