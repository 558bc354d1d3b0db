//! In-memory matchmaking pools.
//!
//! Entries are keyed by the exact (time control, time limit, increment)
//! tuple, so players with different clock settings never meet. Matching is
//! a FIFO scan for the first waiting entry within the requester's declared
//! rating window - no aging, no backoff, no best-fit. State lives only in
//! this instance and dies with the process.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::entities::games::TimeControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub time_control: TimeControl,
    pub time_limit: i32,
    pub time_increment: i32,
}

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub conn_id: Uuid,
    pub player_id: i64,
    pub rating: i32,
    pub enqueued_at: Instant,
}

impl QueueEntry {
    pub fn new(conn_id: Uuid, player_id: i64, rating: i32) -> Self {
        Self {
            conn_id,
            player_id,
            rating,
            enqueued_at: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub enum JoinOutcome {
    /// Paired with a waiting opponent; both entries have left the pool.
    Matched { opponent: QueueEntry },
    /// Appended to the pool at the given 1-indexed position.
    Queued { position: usize },
}

#[derive(Default)]
pub struct Matchmaker {
    pools: Mutex<HashMap<PoolKey, Vec<QueueEntry>>>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the pool for `key`, pairing with the first waiting entry whose
    /// rating differs from the requester's by at most `rating_range`.
    pub fn join(&self, key: PoolKey, entry: QueueEntry, rating_range: i32) -> JoinOutcome {
        let mut pools = self.pools.lock();
        let pool = pools.entry(key).or_default();

        let found = pool
            .iter()
            .position(|waiting| (waiting.rating - entry.rating).abs() <= rating_range);

        match found {
            Some(idx) => {
                let opponent = pool.remove(idx);
                if pool.is_empty() {
                    pools.remove(&key);
                }
                debug!(
                    player_id = entry.player_id,
                    opponent_id = opponent.player_id,
                    waited_ms = opponent.enqueued_at.elapsed().as_millis() as u64,
                    "matchmaking pair found"
                );
                JoinOutcome::Matched { opponent }
            }
            None => {
                pool.push(entry);
                JoinOutcome::Queued {
                    position: pool.len(),
                }
            }
        }
    }

    /// Remove the connection's entry from one pool. Always succeeds; leaving
    /// a pool you are not in is not an error.
    pub fn leave(&self, key: &PoolKey, conn_id: Uuid) {
        let mut pools = self.pools.lock();
        if let Some(pool) = pools.get_mut(key) {
            pool.retain(|entry| entry.conn_id != conn_id);
            if pool.is_empty() {
                pools.remove(key);
            }
        }
    }

    /// Purge the connection from every pool, whatever key it queued under.
    pub fn remove_connection(&self, conn_id: Uuid) {
        let mut pools = self.pools.lock();
        pools.retain(|_, pool| {
            pool.retain(|entry| entry.conn_id != conn_id);
            !pool.is_empty()
        });
    }

    pub fn pool_len(&self, key: &PoolKey) -> usize {
        self.pools.lock().get(key).map_or(0, Vec::len)
    }
}
