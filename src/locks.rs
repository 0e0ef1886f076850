//! Per-server lock registry
//!
//! Route changes on a server are serialized through one lock per server
//! identity. Locks are created on first use and kept for the lifetime of
//! the registry; the registry-wide mutex only guards lookup-or-insert.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Lock held for the whole stop/mutate/start span of one server
pub type ServerLock = Arc<Mutex<()>>;

#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, ServerLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for `server_id`, created if absent
    ///
    /// Concurrent callers for the same server always get the same instance.
    pub async fn acquire(&self, server_id: &str) -> ServerLock {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(server_id) {
            return Arc::clone(lock);
        }

        debug!("Creating lock for server {}", server_id);
        let lock = ServerLock::default();
        locks.insert(server_id.to_string(), Arc::clone(&lock));
        lock
    }

    /// Wait for exclusive access to `server_id`; released when the guard drops
    pub async fn lock(&self, server_id: &str) -> OwnedMutexGuard<()> {
        self.acquire(server_id).await.lock_owned().await
    }

    /// Number of servers with a registered lock
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_server_same_lock() {
        let registry = LockRegistry::new();
        let first = registry.acquire("srv1").await;
        let second = registry.acquire("srv1").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_yields_one_instance() {
        let registry = Arc::new(LockRegistry::new());
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.acquire("srv1").await })
            })
            .collect();

        let mut locks = Vec::new();
        for handle in handles {
            locks.push(handle.await.unwrap());
        }
        assert!(locks.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_servers_do_not_block() {
        let registry = LockRegistry::new();
        let _held = registry.lock("srv1").await;

        let other = tokio::time::timeout(Duration::from_millis(100), registry.lock("srv2")).await;
        assert!(other.is_ok());

        let same = tokio::time::timeout(Duration::from_millis(50), registry.lock("srv1")).await;
        assert!(same.is_err());
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let registry = LockRegistry::new();
        {
            let _guard = registry.lock("srv1").await;
        }
        let again = tokio::time::timeout(Duration::from_millis(50), registry.lock("srv1")).await;
        assert!(again.is_ok());
        assert!(!registry.is_empty().await);
    }
}
