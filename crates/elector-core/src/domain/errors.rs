//! Errors - エラー型
//!
//! # 分類
//! - **StoreError**: CoordinationStore の失敗（通信・シリアライズ・ストア側障害）。
//!   Runner は解釈せずそのまま呼び出し元へ返す
//! - **ConfigError**: ElectionConfig の検証エラー
//! - **IdentityError**: RunnerId の構築エラー
//!
//! 競合（lock が取れない、別の master がいる）はエラーではありません。
//! `RoundOutcome` の値として表現します。

use thiserror::Error;

/// StoreError はストア操作の失敗
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// ConfigError は設定値の検証エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error(
        "master_ttl_ms ({master_ttl_ms}) must exceed tick_interval_ms ({tick_interval_ms}), \
         otherwise the incumbent master loses its claim between ticks"
    )]
    MasterTtlTooShort {
        master_ttl_ms: u64,
        tick_interval_ms: u64,
    },

    #[error("key_prefix must not be empty")]
    EmptyKeyPrefix,

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("runner identity must not be empty")]
    Empty,
}
