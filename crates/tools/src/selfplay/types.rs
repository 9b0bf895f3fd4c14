use serde::Serialize;

use rchess_workers::{Outcome, Tally};

use super::game::GameResult;

/// JSONL の1行（1局分）
#[derive(Serialize, Debug, Clone)]
pub struct GameRecord {
    pub worker: usize,
    pub game: u32,
    /// ワーカーの1本目のエンジンから見た結果
    pub outcome: Outcome,
    pub reason: &'static str,
    pub plies: u32,
    pub first_white: bool,
    pub moves: Vec<String>,
    /// この局を加算した直後の全ワーカー合計
    pub tally: Tally,
}

impl GameRecord {
    pub fn new(worker: usize, game: u32, result: GameResult, tally: Tally) -> Self {
        Self {
            worker,
            game,
            outcome: result.outcome,
            reason: result.reason.label(),
            plies: result.plies,
            first_white: result.first_is_white,
            moves: result.moves,
            tally,
        }
    }
}

/// ハーネス全体の結果
#[derive(Debug, Clone)]
pub struct SelfplayReport {
    pub tally: Tally,
    pub games: u64,
    /// エラーで途中終了したワーカー id
    pub failed_workers: Vec<usize>,
    /// watchdog が検出した期限切れの回数
    pub overdue_events: u64,
}
