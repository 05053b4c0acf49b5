//! ElectionLoop - attempt を一定間隔で呼ぶ呼び出し側ループ
//!
//! # フロー
//! 1. `tick_interval` ごとに `Runner::attempt` を 1 回呼ぶ
//! 2. 結果を watch チャネルに流す（`subscribe()` で観測できる）
//! 3. ストアエラーはログに出して次の tick で再試行（ループ内でバックオフはしない）
//! 4. task の panic はそのラウンドだけを終わらせる（lease は Runner が解放済み）。ループは続く
//!
//! Runner 自体は決してブロックもスケジュールもしません。キャンセルはこのループが持ちます。

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::runner::Runner;
use crate::domain::{ElectionConfig, RoundOutcome};
use crate::ports::CoordinationStore;

/// ElectionLoop のハンドル
/// - `request_shutdown()` でループを止める（実行中のラウンドは最後まで走る）
/// - `shutdown_and_join()` で終了を待てる
pub struct ElectionLoop {
    shutdown_tx: watch::Sender<bool>,
    outcome_rx: watch::Receiver<Option<RoundOutcome>>,
    join: JoinHandle<()>,
}

impl ElectionLoop {
    /// `runner` を `config.tick_interval()` ごとに駆動するタスクを spawn する
    ///
    /// `task` は当選したラウンドごとに呼ばれる（claim と renew の両方）。
    pub fn spawn<S, F, Fut>(runner: Runner<S>, config: ElectionConfig, task: F) -> Self
    where
        S: CoordinationStore + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let runner = Arc::new(runner);

        let join = tokio::spawn(async move {
            election_loop(runner, config, task, shutdown_rx, outcome_tx).await;
        });

        Self {
            shutdown_tx,
            outcome_rx,
            join,
        }
    }

    /// 直近ラウンドの結果（エラーだったラウンドは反映されない）
    pub fn subscribe(&self) -> watch::Receiver<Option<RoundOutcome>> {
        self.outcome_rx.clone()
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            warn!(error = %e, "election loop task ended abnormally");
        }
    }
}

async fn election_loop<S, F, Fut>(
    runner: Arc<Runner<S>>,
    config: ElectionConfig,
    task: F,
    mut shutdown_rx: watch::Receiver<bool>,
    outcome_tx: watch::Sender<Option<RoundOutcome>>,
) where
    S: CoordinationStore,
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = time::interval(config.tick_interval());
    // 遅れた tick はまとめて撃たない（ラウンドが詰まっても連打しない）
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら止める
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let round = AssertUnwindSafe(runner.attempt_with(&config, &task))
            .catch_unwind()
            .await;

        match round {
            Ok(Ok(outcome)) => {
                debug!(
                    runner = %runner.id(),
                    ?outcome,
                    master = outcome.ran_task(),
                    "election round finished"
                );
                outcome_tx.send_replace(Some(outcome));
            }
            Ok(Err(e)) => {
                warn!(runner = %runner.id(), error = %e, "election round failed");
            }
            Err(payload) => {
                error!(
                    runner = %runner.id(),
                    panic = panic_message(&*payload),
                    "election task panicked"
                );
            }
        }
    }

    debug!(runner = %runner.id(), "election loop stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
