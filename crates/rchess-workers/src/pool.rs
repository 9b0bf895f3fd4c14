//! 勝敗集計プール
//!
//! ワーカー（=並行セッション）ごとに wld カウンタを持ち、`record` で1局分を加算して
//! 全ワーカーの合計を返す。加算と再集計は単一のプール全体ロックの下で行うので、
//! 並行呼び出しでも更新は失われず、返る合計は常に一貫したスナップショットになる。

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};

use crate::deadline::Deadline;
use crate::lock_or_recover;
use crate::outcome::{Outcome, Tally};

/// 1ワーカー分のスロット
#[derive(Debug)]
pub struct Worker {
    id: usize,
    deadline: Deadline,
}

impl Worker {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}

/// 全ワーカーのスロットを所有するプール。ハーネスは `Arc<WorkerPool>` で共有する。
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    // 全ワーカーの wld をまとめて1つのロックで守る
    wld: Mutex<Vec<[u64; 3]>>,
    busy: AtomicUsize,
}

impl WorkerPool {
    /// `count` 個のワーカーを id `0..count` で確保する。
    pub fn new(count: usize) -> Self {
        let workers = (0..count)
            .map(|id| Worker {
                id,
                deadline: Deadline::new(),
            })
            .collect();
        debug!("worker pool created: count={count}");
        Self {
            workers,
            wld: Mutex::new(vec![[0; 3]; count]),
            busy: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// # Panics
    /// `id` が範囲外なら panic する。
    pub fn worker(&self, id: usize) -> &Worker {
        &self.workers[id]
    }

    /// ワーカーに1局分の結果を加算し、全ワーカー合計を返す。
    ///
    /// # Panics
    /// 他のプールのワーカーを渡した場合は panic する（呼び出し側の契約違反）。
    pub fn record(&self, worker: &Worker, outcome: Outcome) -> Tally {
        self.check_owned(worker);
        let mut wld = lock_or_recover(&self.wld);
        wld[worker.id][outcome.index()] += 1;
        sum(&wld)
    }

    /// 加算せずに現在の合計を返す。
    pub fn totals(&self) -> Tally {
        sum(&lock_or_recover(&self.wld))
    }

    /// 1ワーカー分の集計
    pub fn worker_counts(&self, worker: &Worker) -> Tally {
        self.check_owned(worker);
        Tally::from_wld(lock_or_recover(&self.wld)[worker.id])
    }

    /// 期限切れのワーカーを `(id, エンジン名)` で列挙する。
    ///
    /// 各ワーカーの締切ロックだけを順に取り、プール全体ロックは取らない。
    pub fn overdue(&self, now: Instant) -> Vec<(usize, String)> {
        self.workers
            .iter()
            .filter_map(|w| w.deadline.overdue(now).map(|name| (w.id, name)))
            .collect()
    }

    /// 対局中のワーカー数
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    /// ワーカーを対局中にする。guard を drop すると戻る。
    pub fn enter(&self, worker: &Worker) -> BusyGuard<'_> {
        self.check_owned(worker);
        let now_busy = self.busy.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("worker {} busy (busy={now_busy})", worker.id);
        BusyGuard {
            busy: &self.busy,
            worker_id: worker.id,
        }
    }

    /// プールを破棄し、最終集計を返す。全ワーカーの停止後に呼ぶこと。
    pub fn shutdown(self) -> Tally {
        let wld = self.wld.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (id, counts) in wld.iter().enumerate() {
            debug!("worker {id}: {}", Tally::from_wld(*counts));
        }
        let total = sum(&wld);
        info!("worker pool shut down: workers={} total={total}", self.workers.len());
        total
    }

    fn check_owned(&self, worker: &Worker) {
        assert!(
            self.workers.get(worker.id).is_some_and(|w| std::ptr::eq(w, worker)),
            "worker {} does not belong to this pool",
            worker.id
        );
    }
}

fn sum(wld: &[[u64; 3]]) -> Tally {
    let mut total = [0u64; 3];
    for counts in wld {
        for (t, c) in total.iter_mut().zip(counts) {
            *t += c;
        }
    }
    Tally::from_wld(total)
}

/// `WorkerPool::enter` の戻り値
#[must_use = "the worker is marked idle again when the guard is dropped"]
pub struct BusyGuard<'a> {
    busy: &'a AtomicUsize,
    worker_id: usize,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let left = self.busy.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("worker {} idle (busy={left})", self.worker_id);
    }
}
