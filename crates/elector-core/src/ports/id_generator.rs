//! IdGenerator port - runner 名の生成
//!
//! 自然な一意名（ホスト名 + pid など）を持たない呼び出し元のために、
//! 分散環境で調整なしに一意な RunnerId を生成します。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（`runner-<ULID>`）

use crate::domain::ids::RunnerId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は RunnerId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_runner_id(&self) -> RunnerId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_runner_id(&self) -> RunnerId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        RunnerId::from_non_empty(format!("runner-{ulid}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ManualClock, SystemClock};
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_runner_id();
        let id2 = id_gen.generate_runner_id();

        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("runner-"));
    }

    #[test]
    fn timestamp_part_comes_from_clock() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(ManualClock::new(fixed_time));

        let id = id_gen.generate_runner_id();
        let ulid = Ulid::from_str(id.as_str().trim_start_matches("runner-")).unwrap();

        assert_eq!(ulid.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}
