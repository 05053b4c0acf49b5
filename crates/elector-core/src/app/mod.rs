//! App - アプリケーション層
//!
//! ports を組み合わせて選出プロトコルを実装します。
//!
//! # 主要コンポーネント
//! - **Runner**: 1 回の選出ラウンド（lock → get → decide → set → unlock）
//! - **ElectionLoop**: Runner を一定間隔で駆動する呼び出し側ループ

pub mod election_loop;
pub mod runner;

// 主要な型を再エクスポート
pub use self::election_loop::ElectionLoop;
pub use self::runner::Runner;
