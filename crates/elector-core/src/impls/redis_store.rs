//! RedisStore - 本番用の CoordinationStore
//!
//! # キーとコマンド
//! - master: `SET <prefix>master <id> PX <ms>` / `GET <prefix>master`
//! - lock:   `SET <prefix>locker 1 NX PX <ms>` / `DEL <prefix>locker`
//!
//! `SET NX` はサーバ側で原子的なので、クラスタ全体で lease の作成者は 1 つだけになります。
//! TTL の失効判定も Redis に任せます。

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use super::{LOCK_KEY, MASTER_KEY};
use crate::domain::errors::StoreError;
use crate::domain::ids::RunnerId;
use crate::ports::CoordinationStore;

/// RedisStore は ConnectionManager 越しに Redis を使う
///
/// # 使用例
/// ```ignore
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let store = RedisStore::connect(client, "billing:").await?;
/// ```
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// client から ConnectionManager を作って接続
    pub async fn connect(client: redis::Client, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let conn = client.get_connection_manager().await?;
        Ok(Self::new(conn, prefix))
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

/// Redis の PX は 1ms 未満を受け付けないので切り上げる
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn set_master(&self, id: &RunnerId, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(self.key(MASTER_KEY))
            .arg(id.as_str())
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_master(&self) -> Result<Option<RunnerId>, StoreError> {
        let mut conn = self.conn.clone();
        let name: Option<String> = redis::cmd("GET")
            .arg(self.key(MASTER_KEY))
            .query_async(&mut conn)
            .await?;
        Ok(name.and_then(|n| RunnerId::new(n).ok()))
    }

    async fn try_lock(&self, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // NX が成立しなければ nil が返る
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(LOCK_KEY))
            .arg(1)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn unlock(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(self.key(LOCK_KEY))
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}
