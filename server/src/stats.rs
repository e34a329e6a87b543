//! User-stats persistence, external to the simulation core. The tick loop
//! never touches this: only the admission and disconnect boundary does, and
//! only to read or accumulate totals that outlive a single room.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
}

pub trait StatsStore: Send + Sync {
    fn get_user(&self, id: u32) -> Option<UserRecord>;
    fn create_user(&self, name: &str) -> UserRecord;
    fn update_stats(&self, id: u32, kills: u32, deaths: u32);
    fn get_leaderboard(&self, limit: usize) -> Vec<UserRecord>;
}

/// Fallback used whenever `DATABASE_URL` is unset. Gameplay never blocks on
/// this: a write that would fail against a real database here simply can't
/// fail, since it's just a guarded `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryStats {
    users: Mutex<HashMap<u32, UserRecord>>,
    next_id: Mutex<u32>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }
}

impl StatsStore for InMemoryStats {
    fn get_user(&self, id: u32) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    fn create_user(&self, name: &str) -> UserRecord {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        let record = UserRecord { id, name: name.to_string(), kills: 0, deaths: 0 };
        self.users.lock().unwrap().insert(id, record.clone());
        record
    }

    fn update_stats(&self, id: u32, kills: u32, deaths: u32) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.kills += kills;
            user.deaths += deaths;
        }
    }

    fn get_leaderboard(&self, limit: usize) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.kills.cmp(&a.kills));
        users.truncate(limit);
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_user() {
        let store = InMemoryStats::new();
        let user = store.create_user("alice");
        assert_eq!(store.get_user(user.id).unwrap().name, "alice");
    }

    #[test]
    fn unknown_user_is_none() {
        let store = InMemoryStats::new();
        assert!(store.get_user(999).is_none());
    }

    #[test]
    fn leaderboard_sorted_by_kills_descending() {
        let store = InMemoryStats::new();
        let a = store.create_user("a");
        let b = store.create_user("b");
        store.update_stats(a.id, 5, 1);
        store.update_stats(b.id, 10, 2);
        let board = store.get_leaderboard(10);
        assert_eq!(board[0].id, b.id);
        assert_eq!(board[1].id, a.id);
    }

    #[test]
    fn leaderboard_respects_limit() {
        let store = InMemoryStats::new();
        for i in 0..5 {
            store.create_user(&format!("p{i}"));
        }
        assert_eq!(store.get_leaderboard(2).len(), 2);
    }
}
