use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use elector_core::ports::{IdGenerator, SystemClock, UlidGenerator};
use elector_core::{CoordinationStore, ElectionConfig, ElectionLoop, InMemoryStore, RedisStore, Runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 当選回数を数えるだけのデモ task
fn announce(name: String, wins: Arc<AtomicU32>) -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
    move || {
        let n = wins.fetch_add(1, Ordering::Relaxed) + 1;
        info!(runner = %name, wins = n, "running as master");
        std::future::ready(())
    }
}

/// runner を `count` 個起動する（各 runner が別プロセスのつもり）
fn spawn_runners<S>(store: S, config: &ElectionConfig, count: usize) -> Vec<ElectionLoop>
where
    S: CoordinationStore + Clone + 'static,
{
    let ids = UlidGenerator::new(SystemClock);
    let mut loops = Vec::with_capacity(count);
    for _ in 0..count {
        let id = ids.generate_runner_id();
        let task = announce(id.to_string(), Arc::new(AtomicU32::new(0)));
        loops.push(ElectionLoop::spawn(Runner::new(id, store.clone()), config.clone(), task));
    }
    loops
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (A) 設定: 第 1 引数に JSON ファイルがあれば読む
    let config = match std::env::args().nth(1) {
        Some(path) => ElectionConfig::from_json_file(path)?,
        None => ElectionConfig::default(),
    };
    config.validate()?;

    let count = match std::env::var("ELECTOR_RUNNERS") {
        Ok(raw) => raw.parse::<usize>()?,
        Err(_) => 10,
    };

    // (B) ストア: REDIS_URL があれば Redis、なければプロセス内の共有ストア
    let loops = match std::env::var("REDIS_URL") {
        Ok(url) => {
            info!(prefix = %config.key_prefix, "using redis store");
            let client = redis::Client::open(url)?;
            let store = RedisStore::connect(client, config.key_prefix.clone()).await?;
            spawn_runners(store, &config, count)
        }
        Err(_) => {
            info!(prefix = %config.key_prefix, "using in-memory store");
            let store = InMemoryStore::new().namespace(config.key_prefix.clone());
            spawn_runners(store, &config, count)
        }
    };
    info!(runners = count, ?config, "election loops started");

    // (C) Ctrl-C まで回す
    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    for l in &loops {
        l.request_shutdown();
    }
    for l in loops {
        l.shutdown_and_join().await;
    }
    Ok(())
}
