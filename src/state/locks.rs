use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of per-document mutexes serializing read-modify-write cycles within this process.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`; the guard releases it on drop.
    pub async fn lock(&self, key: String) -> OwnedMutexGuard<()> {
        let mutex = self.inner.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    pub async fn lock_game(&self, name: &str) -> OwnedMutexGuard<()> {
        self.lock(format!("game::{name}")).await
    }

    pub async fn lock_channel(&self, name: &str) -> OwnedMutexGuard<()> {
        self.lock(format!("channel::{name}")).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock_game("mk64").await;

        let contended = timeout(Duration::from_millis(50), locks.lock_game("mk64")).await;
        assert!(contended.is_err());

        drop(guard);
        let reacquired = timeout(Duration::from_millis(50), locks.lock_game("mk64")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn games_and_channels_do_not_share_keys() {
        let locks = KeyedLocks::new();
        let _game = locks.lock_game("mk64").await;
        let channel = timeout(Duration::from_millis(50), locks.lock_channel("mk64")).await;
        assert!(channel.is_ok());
    }
}
