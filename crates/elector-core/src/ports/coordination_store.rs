//! CoordinationStore port - 選出状態を保持する共有ストア
//!
//! CoordinationStore はクラスタ内で唯一の共有可変リソースです。
//! master レコードと相互排他 lease（lock）はどちらも TTL 付きでここに置かれ、
//! Runner 自身は呼び出しをまたいで何も保持しません。
//!
//! # 実装
//! - **InMemoryStore**: 同一プロセス内の複数 runner 用（テスト・デモ）
//! - **RedisStore**: 本番用

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::StoreError;
use crate::domain::ids::RunnerId;

/// CoordinationStore は Runner が使う 4 つの操作
///
/// # 必須の意味論
/// - `set_master`: 無条件で上書きし、`ttl` 後に失効させる
/// - `get_master`: 未設定または失効済みなら `None`（失効判定はストア側）
/// - `try_lock`: 存在しない場合だけ lease を作成する。クラスタ全体で原子的であること
/// - `unlock`: lease を無条件で削除する。ベストエフォート（失敗しても lease の TTL が安全網）
///
/// キーの名前空間はストア実装の設定で決めます（Runner は関知しない）。
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    async fn set_master(&self, id: &RunnerId, ttl: Duration) -> Result<(), StoreError>;

    async fn get_master(&self) -> Result<Option<RunnerId>, StoreError>;

    async fn try_lock(&self, ttl: Duration) -> Result<bool, StoreError>;

    async fn unlock(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: CoordinationStore + ?Sized> CoordinationStore for Arc<S> {
    async fn set_master(&self, id: &RunnerId, ttl: Duration) -> Result<(), StoreError> {
        (**self).set_master(id, ttl).await
    }

    async fn get_master(&self) -> Result<Option<RunnerId>, StoreError> {
        (**self).get_master().await
    }

    async fn try_lock(&self, ttl: Duration) -> Result<bool, StoreError> {
        (**self).try_lock(ttl).await
    }

    async fn unlock(&self) -> Result<(), StoreError> {
        (**self).unlock().await
    }
}

#[async_trait]
impl<'a, S: CoordinationStore + ?Sized> CoordinationStore for &'a S {
    async fn set_master(&self, id: &RunnerId, ttl: Duration) -> Result<(), StoreError> {
        (**self).set_master(id, ttl).await
    }

    async fn get_master(&self) -> Result<Option<RunnerId>, StoreError> {
        (**self).get_master().await
    }

    async fn try_lock(&self, ttl: Duration) -> Result<bool, StoreError> {
        (**self).try_lock(ttl).await
    }

    async fn unlock(&self) -> Result<(), StoreError> {
        (**self).unlock().await
    }
}
