//! 並列 selfplay ランナー
//!
//! ワーカーごとにスレッドを1本立て、2本のプロセス内エンジンで `games` 局指す。
//! 結果は `WorkerPool::record` で集計し、crossbeam チャネル経由でメインスレッドが JSONL に書く。
//! watchdog スレッドは各ワーカーの締切を巡回して応答遅延を警告する。

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel as chan;
use log::{debug, error, info, warn};

use rchess_workers::WorkerPool;

use crate::common::jsonl::JsonlSink;

use super::config::SelfplayConfig;
use super::engine::EngineHandle;
use super::game::{GameConfig, run_game};
use super::types::{GameRecord, SelfplayReport};

enum WorkerMessage {
    Game(Box<GameRecord>),
    Failed { worker: usize, error: String },
}

/// 全ワーカーを走らせ、1局ごとに1レコードを `sink` へ書く。
///
/// 1ワーカーの失敗は他のワーカーに波及しない。失敗したワーカーは
/// `SelfplayReport::failed_workers` に入る。
pub fn run_selfplay<W: Write>(
    cfg: &SelfplayConfig,
    sink: &mut JsonlSink<W>,
) -> Result<SelfplayReport> {
    cfg.validate()?;
    let pool = Arc::new(WorkerPool::new(cfg.workers));
    let (result_tx, result_rx) = chan::unbounded::<WorkerMessage>();

    let start = Instant::now();
    let mut handles = Vec::with_capacity(cfg.workers);
    for id in 0..cfg.workers {
        let pool = Arc::clone(&pool);
        let tx = result_tx.clone();
        let cfg = cfg.clone();
        let handle = thread::Builder::new()
            .name(format!("selfplay-{id}"))
            .spawn(move || {
                if let Err(e) = worker_main(id, &cfg, &pool, &tx) {
                    let _ = tx.send(WorkerMessage::Failed {
                        worker: id,
                        error: format!("{e:#}"),
                    });
                }
            })
            .context("failed to spawn worker thread")?;
        handles.push((id, handle));
    }
    // メインスレッドは result_tx を持たないので drop
    drop(result_tx);

    let (stop_tx, stop_rx) = chan::bounded::<()>(0);
    let watchdog = {
        let pool = Arc::clone(&pool);
        let interval = cfg.watchdog_interval();
        thread::Builder::new()
            .name("selfplay-watchdog".to_string())
            .spawn(move || watchdog_main(&pool, &stop_rx, interval))
            .context("failed to spawn watchdog thread")?
    };

    let mut games = 0u64;
    let mut failed_workers = Vec::new();
    for msg in result_rx.iter() {
        match msg {
            WorkerMessage::Game(record) => {
                sink.write(&record).context("failed to write game record")?;
                games += 1;
                debug!(
                    "worker {} game {}: {} ({}) {}",
                    record.worker,
                    record.game,
                    record.outcome.label(),
                    record.reason,
                    record.tally
                );
            }
            WorkerMessage::Failed { worker, error } => {
                error!("worker {worker} failed: {error}");
                failed_workers.push(worker);
            }
        }
    }
    sink.flush()?;

    for (id, handle) in handles {
        if handle.join().is_err() {
            error!("worker {id} panicked");
            failed_workers.push(id);
        }
    }
    drop(stop_tx);
    let overdue_events = watchdog.join().map_err(|_| anyhow!("watchdog thread panicked"))?;

    let pool = Arc::try_unwrap(pool).map_err(|_| anyhow!("worker pool is still shared"))?;
    let tally = pool.shutdown();
    failed_workers.sort_unstable();
    failed_workers.dedup();
    info!(
        "selfplay finished: {games} games in {:.1}s, {tally}",
        start.elapsed().as_secs_f64()
    );

    Ok(SelfplayReport {
        tally,
        games,
        failed_workers,
        overdue_events,
    })
}

fn worker_main(
    id: usize,
    cfg: &SelfplayConfig,
    pool: &WorkerPool,
    tx: &chan::Sender<WorkerMessage>,
) -> Result<()> {
    let worker = pool.worker(id);
    let _busy = pool.enter(worker);

    let (seed_a, seed_b) = cfg.engine_seeds(id);
    let mut first = EngineHandle::spawn(format!("w{id}-a"), seed_a)?;
    let mut second = EngineHandle::spawn(format!("w{id}-b"), seed_b)?;
    let game_cfg = GameConfig {
        depth: cfg.depth,
        max_plies: cfg.max_plies,
        move_deadline: cfg.move_deadline(),
    };

    for game in 0..cfg.games {
        // 先後は1局ごとに入れ替える
        let first_is_white = game % 2 == 0;
        let result = run_game(&mut first, &mut second, first_is_white, &game_cfg, worker.deadline())
            .with_context(|| format!("worker {id} game {game}"))?;
        let tally = pool.record(worker, result.outcome);
        let record = GameRecord::new(id, game, result, tally);
        if tx.send(WorkerMessage::Game(Box::new(record))).is_err() {
            // 受信側が先に終了した
            break;
        }
    }
    Ok(())
}

/// `stop_rx` が切断されるまで `interval` ごとに締切を巡回する。検出回数を返す。
fn watchdog_main(
    pool: &WorkerPool,
    stop_rx: &chan::Receiver<()>,
    interval: Duration,
) -> u64 {
    let mut events = 0u64;
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(chan::RecvTimeoutError::Timeout) => {
                for (id, engine) in pool.overdue(Instant::now()) {
                    warn!("worker {id}: engine {engine} is past its move deadline");
                    events += 1;
                }
            }
            Ok(()) | Err(chan::RecvTimeoutError::Disconnected) => break,
        }
    }
    events
}
