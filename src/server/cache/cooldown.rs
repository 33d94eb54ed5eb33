use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Member and resource a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub member_id: u64,
    /// Community, channel or other resource the notification refers to
    pub resource_id: u64,
}

/// Suppresses repeated notifications for the same key within a window.
///
/// Kept behind a trait so the in-memory map can be swapped for a shared store when the
/// bot runs on more than one process.
#[async_trait]
pub trait CooldownCache: Send + Sync {
    /// Claims the key for the cooldown window.
    ///
    /// # Returns
    /// `true` if no unexpired entry existed and the key is now recorded, `false` if a
    /// notification for the key was already sent within the window.
    async fn try_acquire(&self, key: &CooldownKey) -> bool;
}

/// Cooldown cache holding expiry instants in memory.
///
/// Expired entries are pruned lazily whenever a key is acquired.
#[derive(Clone)]
pub struct InMemoryCooldownCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<CooldownKey, Instant>>>,
}

impl InMemoryCooldownCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CooldownCache for InMemoryCooldownCache {
    async fn try_acquire(&self, key: &CooldownKey) -> bool {
        let now = Instant::now();

        if let Some(expires_at) = self.entries.read().await.get(key) {
            if *expires_at > now {
                return false;
            }
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);

        // Another task may have claimed the key between the read and the write lock.
        if entries.contains_key(key) {
            return false;
        }

        entries.insert(*key, now + self.ttl);
        true
    }
}
