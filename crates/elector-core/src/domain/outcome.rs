//! RoundOutcome - 1 ラウンドの選出結果
//!
//! 競合はエラーではありません。lease が取れなかった場合も、別の runner が
//! master だった場合も `Ok(..)` の値として返ります。

use serde::{Deserialize, Serialize};

use super::ids::RunnerId;

/// RoundOutcome は `Runner::attempt` 1 回の判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// lease はクラスタ内の別のラウンドが保持中
    LockContended,

    /// lease は取れたが、別の有効な identity が master
    PeerIsMaster { master: RunnerId },

    /// 有効な master がいなかったので task を実行し、master を獲得した
    Claimed,

    /// すでに自分が master だったので task を実行し、期限を延長した
    Renewed,
}

impl RoundOutcome {
    /// このラウンドで task を実行したか（= ラウンド後に自分が master か）
    pub fn ran_task(&self) -> bool {
        matches!(self, RoundOutcome::Claimed | RoundOutcome::Renewed)
    }
}
