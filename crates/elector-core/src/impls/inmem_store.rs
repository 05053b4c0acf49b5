//! InMemoryStore - 同一プロセス内で共有する CoordinationStore
//!
//! # 実装詳細
//! - HashMap<String, Entry> を Mutex で排他制御（1 回のロック内で check-and-set するので try_lock は原子的）
//! - 各 Entry は `expires_at` を持ち、失効済みは「存在しない」として扱う
//! - 時刻は Clock から取る（テストでは ManualClock で TTL 切れを再現）
//! - `namespace()` で同じバックエンドを別の key prefix で共有できる

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{LOCK_KEY, MASTER_KEY};
use crate::domain::errors::StoreError;
use crate::domain::ids::RunnerId;
use crate::ports::{Clock, CoordinationStore, SystemClock};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// InMemoryStore は開発・テスト用の CoordinationStore
///
/// # 使用例
/// ```ignore
/// let store = InMemoryStore::new();
/// let billing = store.namespace("billing:");
/// let runner = Runner::new(RunnerId::new("a")?, billing);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore<C = SystemClock> {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    prefix: String,
    clock: C,
}

impl InMemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> InMemoryStore<C> {
    /// 任意の Clock で作成（prefix は "elector:"）
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            prefix: "elector:".to_string(),
            clock,
        }
    }

    /// 同じバックエンドを共有し、key prefix だけが異なるハンドルを返す
    pub fn namespace(&self, prefix: impl Into<String>) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            prefix: prefix.into(),
            clock: self.clock.clone(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("in-memory store poisoned: {e}")))
    }

    fn deadline(&self, now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, StoreError> {
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| StoreError::Backend(format!("ttl out of range: {ttl:?}")))
    }
}

#[async_trait]
impl<C: Clock + Clone> CoordinationStore for InMemoryStore<C> {
    async fn set_master(&self, id: &RunnerId, ttl: Duration) -> Result<(), StoreError> {
        let now = self.clock.now();
        let expires_at = self.deadline(now, ttl)?;
        let key = self.key(MASTER_KEY);
        let mut entries = self.lock_entries()?;
        entries.insert(
            key,
            Entry {
                value: id.as_str().to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get_master(&self) -> Result<Option<RunnerId>, StoreError> {
        let now = self.clock.now();
        let key = self.key(MASTER_KEY);
        let entries = self.lock_entries()?;
        let Some(entry) = entries.get(&key).filter(|e| e.is_live(now)) else {
            return Ok(None);
        };
        // 空文字は「master なし」と同じ扱い
        Ok(RunnerId::new(entry.value.clone()).ok())
    }

    async fn try_lock(&self, ttl: Duration) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let expires_at = self.deadline(now, ttl)?;
        let key = self.key(LOCK_KEY);
        let mut entries = self.lock_entries()?;
        if entries.get(&key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key,
            Entry {
                value: "1".to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn unlock(&self) -> Result<(), StoreError> {
        let key = self.key(LOCK_KEY);
        self.lock_entries()?.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ManualClock;
    use chrono::TimeZone;

    fn manual_store() -> (InMemoryStore<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        (InMemoryStore::with_clock(clock.clone()), clock)
    }

    fn id(name: &str) -> RunnerId {
        RunnerId::new(name).unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_master() {
        let (store, _) = manual_store();
        assert_eq!(store.get_master().await.unwrap(), None);
    }

    #[tokio::test]
    async fn master_expires_after_ttl() {
        let (store, clock) = manual_store();
        store.set_master(&id("a"), Duration::from_secs(10)).await.unwrap();

        clock.advance(Duration::from_secs(9));
        assert_eq!(store.get_master().await.unwrap(), Some(id("a")));

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.get_master().await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_master_overwrites_unconditionally() {
        let (store, _) = manual_store();
        store.set_master(&id("a"), Duration::from_secs(10)).await.unwrap();
        store.set_master(&id("b"), Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.get_master().await.unwrap(), Some(id("b")));
    }

    #[tokio::test]
    async fn try_lock_is_exclusive_until_unlock() {
        let (store, _) = manual_store();
        assert!(store.try_lock(Duration::from_secs(5)).await.unwrap());
        assert!(!store.try_lock(Duration::from_secs(5)).await.unwrap());

        store.unlock().await.unwrap();
        assert!(store.try_lock(Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn stale_lock_can_be_reacquired() {
        let (store, clock) = manual_store();
        assert!(store.try_lock(Duration::from_secs(5)).await.unwrap());

        clock.advance(Duration::from_secs(5));
        assert!(store.try_lock(Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn unlock_without_lock_is_a_no_op() {
        let (store, _) = manual_store();
        store.unlock().await.unwrap();
        assert!(store.try_lock(Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let (store, _) = manual_store();
        let billing = store.namespace("billing:");
        let search = store.namespace("search:");

        assert!(billing.try_lock(Duration::from_secs(5)).await.unwrap());
        assert!(search.try_lock(Duration::from_secs(5)).await.unwrap());

        billing.set_master(&id("a"), Duration::from_secs(10)).await.unwrap();
        assert_eq!(search.get_master().await.unwrap(), None);
        assert_eq!(
            store.namespace("billing:").get_master().await.unwrap(),
            Some(id("a"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_try_lock_has_single_winner() {
        let store = Arc::new(InMemoryStore::new());
        let mut joins = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            joins.push(tokio::spawn(async move {
                store.try_lock(Duration::from_secs(30)).await.unwrap()
            }));
        }

        let mut winners = 0;
        for join in joins {
            if join.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
