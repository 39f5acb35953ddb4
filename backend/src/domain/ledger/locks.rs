//! In-process lock table for ledger operations.
//!
//! Pair operations take the posting lock shared and the (user, posting) pair
//! lock exclusively, so operations on different pairs of one posting run in
//! parallel while posting deletion, which takes the posting lock
//! exclusively, waits for all of them. Entries are dropped from the table
//! once the last guard referencing them is released.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::warn;

use crate::domain::{Error, PostingId, UserId};

type PairKey = (UserId, PostingId);

struct LockTable<K, L> {
    entries: Mutex<HashMap<K, Arc<L>>>,
}

impl<K: Eq + Hash + Copy, L: Default> LockTable<K, L> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: K) -> Arc<L> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_default())
    }

    fn release(&self, key: K) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries
            .get(&key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            entries.remove(&key);
        }
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Lock table shared by every ledger handle in the process.
pub struct LedgerLocks {
    postings: LockTable<PostingId, RwLock<()>>,
    pairs: LockTable<PairKey, tokio::sync::Mutex<()>>,
    timeout: Duration,
}

impl LedgerLocks {
    /// Create an empty lock table whose acquisitions give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            postings: LockTable::new(),
            pairs: LockTable::new(),
            timeout,
        }
    }

    /// Acquire the guard serialising operations on one (user, posting) pair.
    ///
    /// # Errors
    /// Returns [`crate::domain::ErrorCode::ServiceUnavailable`] when the wait
    /// exceeds the configured timeout.
    pub async fn pair(
        self: &Arc<Self>,
        user_id: UserId,
        posting_id: PostingId,
    ) -> Result<PairGuard, Error> {
        let posting_lock = self.postings.entry(posting_id);
        let acquired = tokio::time::timeout(self.timeout, posting_lock.read_owned()).await;
        let posting = match acquired {
            Ok(guard) => guard,
            Err(_) => {
                self.postings.release(posting_id);
                return Err(self.timed_out(&posting_id.to_string()));
            }
        };

        let pair_lock = self.pairs.entry((user_id, posting_id));
        let acquired = tokio::time::timeout(self.timeout, pair_lock.lock_owned()).await;
        let pair = match acquired {
            Ok(guard) => guard,
            Err(_) => {
                drop(posting);
                self.pairs.release((user_id, posting_id));
                self.postings.release(posting_id);
                return Err(self.timed_out(&format!("{user_id}/{posting_id}")));
            }
        };

        Ok(PairGuard {
            locks: Arc::clone(self),
            key: (user_id, posting_id),
            pair: Some(pair),
            posting: Some(posting),
        })
    }

    /// Acquire exclusive access to a posting, waiting for in-flight pair
    /// operations on it to finish.
    ///
    /// # Errors
    /// Returns [`crate::domain::ErrorCode::ServiceUnavailable`] when the wait
    /// exceeds the configured timeout.
    pub async fn posting_exclusive(
        self: &Arc<Self>,
        posting_id: PostingId,
    ) -> Result<PostingGuard, Error> {
        let posting_lock = self.postings.entry(posting_id);
        let acquired = tokio::time::timeout(self.timeout, posting_lock.write_owned()).await;
        match acquired {
            Ok(guard) => Ok(PostingGuard {
                locks: Arc::clone(self),
                posting_id,
                guard: Some(guard),
            }),
            Err(_) => {
                self.postings.release(posting_id);
                Err(self.timed_out(&posting_id.to_string()))
            }
        }
    }

    /// Number of live lock entries; used to check entries are released.
    pub fn live_entries(&self) -> usize {
        self.postings.len() + self.pairs.len()
    }

    fn timed_out(&self, resource: &str) -> Error {
        warn!(
            resource,
            timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            "ledger lock wait timed out"
        );
        Error::service_unavailable("application ledger is busy; retry later")
    }
}

/// Held while a pair operation runs.
pub struct PairGuard {
    locks: Arc<LedgerLocks>,
    key: PairKey,
    pair: Option<OwnedMutexGuard<()>>,
    posting: Option<OwnedRwLockReadGuard<()>>,
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        self.pair.take();
        self.posting.take();
        self.locks.pairs.release(self.key);
        self.locks.postings.release(self.key.1);
    }
}

/// Held while a posting is being deleted.
pub struct PostingGuard {
    locks: Arc<LedgerLocks>,
    posting_id: PostingId,
    guard: Option<OwnedRwLockWriteGuard<()>>,
}

impl Drop for PostingGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.postings.release(self.posting_id);
    }
}
