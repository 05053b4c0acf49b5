//! ElectionConfig - 選出ラウンドの TTL と tick 間隔
//!
//! # 制約
//! - `lock_ttl`: 1 ラウンド（ストア往復 + task 実行）より十分長いこと。
//!   短すぎるとラウンド途中で lease が切れ、別の runner が master レコードを競合して書ける
//! - `master_ttl`: tick 間隔より長いこと。短いと現 master が毎 tick で master を失い取り直す
//!
//! lock_ttl の妥当性は task の実行時間に依存するため、ここでは検証しません。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::errors::ConfigError;

/// ElectionConfig は runner と ElectionLoop が使う設定
///
/// # 使用例
/// ```ignore
/// let config = ElectionConfig::from_json_str(r#"{ "master_ttl_ms": 10000 }"#)?;
/// runner.attempt(config.lock_ttl(), config.master_ttl(), || async {}).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// 相互排他 lease の最大保持時間
    pub lock_ttl_ms: u64,

    /// 獲得した master の有効期間
    pub master_ttl_ms: u64,

    /// ElectionLoop が attempt を呼ぶ間隔
    pub tick_interval_ms: u64,

    /// ストアキーの名前空間（例: "billing:" → "billing:master", "billing:locker"）
    pub key_prefix: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            lock_ttl_ms: 5_000,
            master_ttl_ms: 6_000,
            tick_interval_ms: 2_000,
            key_prefix: "elector:".to_string(),
        }
    }
}

impl ElectionConfig {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_millis(self.lock_ttl_ms)
    }

    pub fn master_ttl(&self) -> Duration {
        Duration::from_millis(self.master_ttl_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("lock_ttl_ms", self.lock_ttl_ms),
            ("master_ttl_ms", self.master_ttl_ms),
            ("tick_interval_ms", self.tick_interval_ms),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroDuration { field: *field });
        }
        if self.master_ttl_ms <= self.tick_interval_ms {
            return Err(ConfigError::MasterTtlTooShort {
                master_ttl_ms: self.master_ttl_ms,
                tick_interval_ms: self.tick_interval_ms,
            });
        }
        if self.key_prefix.is_empty() {
            return Err(ConfigError::EmptyKeyPrefix);
        }
        Ok(())
    }

    /// JSON 文字列から読み込み、検証する（省略されたフィールドはデフォルト値）
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
