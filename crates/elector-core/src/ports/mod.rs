//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（Redis など）や環境（時刻）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ストアが source of truth（正本）。Runner はキャッシュしない
//! - 実装はコンストラクタで注入する（継承ではなく依存性注入）

pub mod clock;
pub mod coordination_store;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::coordination_store::CoordinationStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
