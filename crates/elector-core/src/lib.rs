//! elector-core
//!
//! Lease-based leader election over a shared key-value store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RunnerId, RoundOutcome, ElectionConfig, errors）
//! - **ports**: 抽象化レイヤー（CoordinationStore, Clock, IdGenerator）
//! - **app**: 選出ロジック（Runner, ElectionLoop）
//! - **impls**: ストア実装（InMemoryStore, RedisStore）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{ElectionLoop, Runner};
pub use domain::{ConfigError, ElectionConfig, IdentityError, RoundOutcome, RunnerId, StoreError};
pub use impls::{InMemoryStore, RedisStore};
pub use ports::CoordinationStore;
