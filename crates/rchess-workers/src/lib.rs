//! 並列対局ハーネス用の勝敗集計。
//!
//! - [`WorkerPool`]: ワーカーごとの wld カウンタと、単一ロックでの原子的な集計
//! - [`Deadline`]: ワーカーごとの応答期限（watchdog 用）
//! - [`Outcome`] / [`Tally`]: 結果と集計値

pub mod deadline;
pub mod outcome;
pub mod pool;

pub use deadline::Deadline;
pub use outcome::{Outcome, Tally};
pub use pool::{BusyGuard, Worker, WorkerPool};

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a previous holder panicked
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::error!("Mutex was poisoned, attempting recovery");
            poisoned.into_inner()
        }
    }
}
