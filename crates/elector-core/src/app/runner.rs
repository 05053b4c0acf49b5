//! Runner - 1 回の呼び出しで 1 ラウンドの選出を行う
//!
//! # フロー（`Runner::attempt`）
//! 1. `try_lock(lock_ttl)`。取れなければ何もせず即座に返す
//! 2. `get_master()`
//! 3. 空または自分自身なら task を実行し、`set_master(自分, master_ttl)`。
//!    別の有効な identity なら何もしない
//! 4. 1 で lease を取れた場合、すべての出口（エラー・task の panic を含む）で `unlock()`
//!
//! Runner は呼び出しをまたいで状態を持ちません（ストアが唯一の正本）。
//! 再試行の間隔は呼び出し側（`ElectionLoop`）が決めます。

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::domain::{ElectionConfig, RoundOutcome, RunnerId, StoreError};
use crate::ports::CoordinationStore;

/// Runner は 1 つの identity と 1 つのストアハンドルに束縛された選出者
///
/// # 使用例
/// ```ignore
/// let runner = Runner::new(RunnerId::new("worker-1")?, store);
/// let outcome = runner
///     .attempt(Duration::from_secs(5), Duration::from_secs(10), || async {
///         refresh_schedules().await;
///     })
///     .await?;
/// ```
///
/// 同じ runner で `attempt` を重ねて呼んでも意味はないので、逐次的に駆動すること。
#[derive(Debug, Clone)]
pub struct Runner<S> {
    id: RunnerId,
    store: S,
}

impl<S: CoordinationStore> Runner<S> {
    pub fn new(id: RunnerId, store: S) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> &RunnerId {
        &self.id
    }

    /// 1 ラウンドの選出を実行
    ///
    /// `task` は master レコードを書く前に最後まで実行され、当選したラウンドごと
    /// （claim と renew の両方）に呼ばれます。任期ごとに 1 回だけ実行したい場合は
    /// task 側で冪等にすること。
    ///
    /// ストアのエラーはそのまま返します。lease を取れた場合は、エラーでも
    /// task の panic でも `unlock()` してから返します（panic は unlock 後に再送出）。
    /// unlock の失敗はログに出すだけです（lease の TTL が上限になるため）。
    ///
    /// # Cancel safety
    /// cancel-safe ではありません。ラウンドの途中で future を drop すると
    /// （`tokio::time::timeout` など）unlock は呼ばれず、lease は `lock_ttl` が
    /// 切れるまで残ります。`ElectionLoop` はラウンドの途中で止めません。
    pub async fn attempt<F, Fut>(
        &self,
        lock_ttl: Duration,
        master_ttl: Duration,
        task: F,
    ) -> Result<RoundOutcome, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if !self.store.try_lock(lock_ttl).await? {
            debug!(runner = %self.id, "election lease held elsewhere");
            return Ok(RoundOutcome::LockContended);
        }

        let result = AssertUnwindSafe(self.decide(master_ttl, task))
            .catch_unwind()
            .await;

        if let Err(e) = self.store.unlock().await {
            warn!(runner = %self.id, error = %e, "failed to release election lease");
        }

        match result {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// `config` の TTL で [`Runner::attempt`] を呼ぶ
    pub async fn attempt_with<F, Fut>(
        &self,
        config: &ElectionConfig,
        task: F,
    ) -> Result<RoundOutcome, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.attempt(config.lock_ttl(), config.master_ttl(), task)
            .await
    }

    async fn decide<F, Fut>(&self, master_ttl: Duration, task: F) -> Result<RoundOutcome, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let outcome = match self.store.get_master().await? {
            None => RoundOutcome::Claimed,
            Some(master) if master == self.id => RoundOutcome::Renewed,
            Some(master) => {
                debug!(runner = %self.id, %master, "peer holds mastership");
                return Ok(RoundOutcome::PeerIsMaster { master });
            }
        };

        task().await;
        self.store.set_master(&self.id, master_ttl).await?;

        match outcome {
            RoundOutcome::Claimed => info!(runner = %self.id, ?master_ttl, "claimed mastership"),
            _ => debug!(runner = %self.id, ?master_ttl, "renewed mastership"),
        }
        Ok(outcome)
    }
}
