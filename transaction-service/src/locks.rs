//! Per-account guards for balance mutations
//!
//! An exclusive guard must be held for every account from the moment its
//! balance is read for mutation until the mutation is persisted. When one
//! transaction touches two accounts the guards are taken in ascending id
//! order regardless of source/destination role, so two opposite-direction
//! transfers between the same pair cannot deadlock. Acquisition is bounded:
//! a timeout surfaces as a retryable contention error instead of hanging.

use std::sync::Arc;
use std::time::Duration;

use common::error::{Error, Result};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of per-account mutual-exclusion guards
pub struct AccountLocks {
    /// Guards by account ID
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// Guards held for the duration of one transaction's atomic unit.
///
/// Dropping releases every guard and removes registry entries that no other
/// task holds or waits on, so the registry tracks the accounts currently in
/// flight rather than every account ever touched.
pub struct AccountGuards<'a> {
    registry: &'a AccountLocks,
    ids: Vec<i64>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl std::fmt::Debug for AccountGuards<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountGuards").field("ids", &self.ids).finish()
    }
}

impl Drop for AccountGuards<'_> {
    fn drop(&mut self) {
        // Release the guards before inspecting reference counts
        self.guards.clear();
        for id in &self.ids {
            // A count of one means the registry holds the only reference:
            // no holder and no waiter. `remove_if` re-checks under the
            // shard lock, so a concurrent `lock_for` cannot slip in between.
            self.registry
                .locks
                .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

impl AccountLocks {
    /// Create a new lock registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, account_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire guards for the given accounts in ascending id order.
    ///
    /// The ids are sorted and deduplicated here, so callers cannot introduce
    /// an inconsistent acquisition order.
    pub async fn acquire(
        &self,
        account_ids: &[i64],
        timeout: Duration,
    ) -> Result<AccountGuards<'_>> {
        let mut ids = account_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        // Filling the guard set as we go means a timeout part-way through
        // releases (and evicts) whatever was already acquired.
        let mut acquired = AccountGuards {
            registry: self,
            guards: Vec::with_capacity(ids.len()),
            ids,
        };
        for &id in &acquired.ids {
            let lock = self.lock_for(id);
            debug!("Acquiring guard for account {}", id);
            let guard = tokio::time::timeout(timeout, lock.lock_owned())
                .await
                .map_err(|_| {
                    Error::Contention(format!(
                        "Timed out acquiring guard for account {} after {:?}",
                        id, timeout
                    ))
                })?;
            acquired.guards.push(guard);
        }

        Ok(acquired)
    }
}

impl Default for AccountLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_and_release() {
        let locks = AccountLocks::new();
        let guards = locks.acquire(&[2, 1], Duration::from_millis(100)).await.unwrap();
        drop(guards);

        // Reacquirable after release
        let _guards = locks.acquire(&[1, 2], Duration::from_millis(100)).await.unwrap();
    }

    #[tokio::test]
    async fn registry_does_not_retain_released_entries() {
        let locks = AccountLocks::new();

        let guards = locks.acquire(&[1, 2], Duration::from_millis(100)).await.unwrap();
        assert_eq!(locks.locks.len(), 2);
        drop(guards);
        assert!(locks.locks.is_empty());

        // A held entry survives another task's timed-out attempt on it
        let held = locks.acquire(&[5], Duration::from_millis(100)).await.unwrap();
        locks.acquire(&[5], Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(locks.locks.len(), 1);
        drop(held);
        assert!(locks.locks.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_do_not_self_deadlock() {
        let locks = AccountLocks::new();
        let _guards = locks.acquire(&[7, 7], Duration::from_millis(100)).await.unwrap();
    }

    #[tokio::test]
    async fn contention_surfaces_after_timeout() {
        let locks = AccountLocks::new();
        let _held = locks.acquire(&[5], Duration::from_millis(100)).await.unwrap();

        let err = locks
            .acquire(&[5], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Contention(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn opposite_direction_acquisition_completes() {
        let locks = Arc::new(AccountLocks::new());
        let timeout = Duration::from_secs(1);

        // Two tasks locking the same pair in opposite caller order; the
        // ordered acquisition inside `acquire` keeps them deadlock-free.
        let mut handles = Vec::new();
        for ids in [[10_i64, 20], [20, 10]] {
            let locks = locks.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    let _guards = locks.acquire(&ids, timeout).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
