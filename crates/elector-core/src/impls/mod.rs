//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: 同一プロセス内の共有ストア（テスト・デモ用）
//! - **RedisStore**: 本番用（`SET NX PX` による lease）
//!
//! どちらも `<prefix>master` と `<prefix>locker` の 2 キーだけを使います。

pub mod inmem_store;
pub mod redis_store;

pub use self::inmem_store::InMemoryStore;
pub use self::redis_store::RedisStore;

pub(crate) const MASTER_KEY: &str = "master";
pub(crate) const LOCK_KEY: &str = "locker";
