//! Per-row mutation rights.
//!
//! Every product and account in use has one [`RwLock`] in the [`LockTable`]. A
//! settlement takes the exclusive side of each row it touches; consistent reads
//! take the shared side. Rights are always acquired in [`LockKey`] order (all
//! products ascending by id, then the account), which rules out lock cycles
//! between concurrent attempts.
//!
//! The whole acquisition runs under one deadline. If it expires, every guard
//! taken so far is dropped before the error is returned.

use crate::model::{AccountId, ProductId};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, warn};

/// A lockable row. The derived `Ord` is the global acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    Product(ProductId),
    Account(AccountId),
}

impl Display for LockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockKey::Product(id) => write!(f, "{id}"),
            LockKey::Account(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LockError {
    #[error("Timed out after {waited:?} waiting for {key}")]
    Timeout { key: LockKey, waited: Duration },
}

enum Guard {
    Shared(OwnedRwLockReadGuard<()>),
    Exclusive(OwnedRwLockWriteGuard<()>),
}

type Rows = Arc<Mutex<HashMap<LockKey, Arc<RwLock<()>>>>>;

fn lock_rows(
    rows: &Mutex<HashMap<LockKey, Arc<RwLock<()>>>>,
) -> MutexGuard<'_, HashMap<LockKey, Arc<RwLock<()>>>> {
    rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Rights held on a set of rows. Dropping it releases them all.
///
/// On release, a row lock nobody else holds or waits for is removed from the
/// table.
pub struct LockSet {
    keys: Vec<LockKey>,
    mode: LockMode,
    guards: Vec<Guard>,
    rows: Rows,
}

impl LockSet {
    /// Keys in acquisition order.
    pub fn keys(&self) -> &[LockKey] {
        &self.keys
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockSet {
    fn drop(&mut self) {
        // Guards own a handle to their row; release them before counting.
        self.guards.clear();
        let mut rows = lock_rows(&self.rows);
        for key in &self.keys {
            // Handles are only cloned under this mutex, so a count of one
            // means no holder and no waiter.
            if rows.get(key).is_some_and(|row| Arc::strong_count(row) == 1) {
                rows.remove(key);
            }
        }
    }
}

impl std::fmt::Debug for LockSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockSet")
            .field("keys", &self.keys)
            .field("mode", &self.mode)
            .finish()
    }
}

/// One lock per row in use.
pub struct LockTable {
    rows: Rows,
    timeout: Duration,
}

impl LockTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Rows currently held or waited on.
    pub fn len(&self) -> usize {
        lock_rows(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(&self, key: LockKey) -> Arc<RwLock<()>> {
        let mut rows = lock_rows(&self.rows);
        Arc::clone(rows.entry(key).or_insert_with(|| Arc::new(RwLock::new(()))))
    }

    pub async fn shared(
        &self,
        keys: impl IntoIterator<Item = LockKey>,
    ) -> Result<LockSet, LockError> {
        self.acquire(keys, LockMode::Shared).await
    }

    pub async fn exclusive(
        &self,
        keys: impl IntoIterator<Item = LockKey>,
    ) -> Result<LockSet, LockError> {
        self.acquire(keys, LockMode::Exclusive).await
    }

    /// Acquires `mode` rights on every key, in global order, within the
    /// table's timeout. Duplicate keys are taken once.
    pub async fn acquire(
        &self,
        keys: impl IntoIterator<Item = LockKey>,
        mode: LockMode,
    ) -> Result<LockSet, LockError> {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        // Keys are pushed before waiting, so a timed out or cancelled
        // acquisition still prunes the row it was blocked on.
        let mut set = LockSet {
            keys: Vec::with_capacity(keys.len()),
            mode,
            guards: Vec::with_capacity(keys.len()),
            rows: Arc::clone(&self.rows),
        };
        let acquisition = tokio::time::timeout(self.timeout, async {
            for key in &keys {
                set.keys.push(*key);
                let row = self.row(*key);
                let guard = match mode {
                    LockMode::Shared => Guard::Shared(row.read_owned().await),
                    LockMode::Exclusive => Guard::Exclusive(row.write_owned().await),
                };
                set.guards.push(guard);
            }
        })
        .await;

        match (acquisition, set.keys.last().copied()) {
            (Ok(()), _) | (Err(_), None) => {
                debug!(?keys, ?mode, "Rights acquired");
                Ok(set)
            }
            (Err(_), Some(key)) => {
                warn!(%key, ?mode, waited = ?self.timeout, "Lock timeout");
                Err(LockError::Timeout {
                    key,
                    waited: self.timeout,
                })
            }
        }
    }
}
