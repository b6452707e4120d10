use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::core::leaderboard::{Leaderboard, ScoreRecord};
use crate::core::submission::ValidationError;

type SharedLeaderboard = Arc<Mutex<Leaderboard>>;

/// Process-wide handle on the in-memory leaderboard. Clones share the same data.
///
/// Every operation holds the lock for its whole duration, so a submission
/// (append, eviction and timestamping) and a query (sort and take) never
/// observe each other half-way.
#[derive(Clone, Debug)]
pub struct ScoreStore {
    data: SharedLeaderboard,
}

impl ScoreStore {
    pub fn new() -> ScoreStore {
        ScoreStore::from_leaderboard(Leaderboard::new())
    }

    pub fn with_capacity(capacity: usize) -> ScoreStore {
        ScoreStore::from_leaderboard(Leaderboard::with_capacity(capacity))
    }

    fn from_leaderboard(leaderboard: Leaderboard) -> ScoreStore {
        ScoreStore {
            data: Arc::new(Mutex::new(leaderboard)),
        }
    }

    // A panic while holding the lock cannot leave the deque half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Leaderboard> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit(&self, name: &str, score: i64) -> Result<ScoreRecord, ValidationError> {
        self.lock().submit(name, score, Utc::now())
    }

    pub fn query(&self, limit: usize) -> Vec<ScoreRecord> {
        self.lock().ranked(limit)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}
