use std::time::{Duration, Instant};

use anyhow::Result;
use log::debug;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, Position};

use rchess_workers::{Deadline, Outcome};

use super::engine::EngineHandle;

/// ゲーム設定
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub depth: i32,
    pub max_plies: u32,
    /// 1手あたりの応答期限。watchdog が監視する。
    pub move_deadline: Duration,
}

/// 終局理由
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    MaxPlies,
    /// 合法手があるのに空の bestmove を返した
    NoMove,
    IllegalMove,
}

impl EndReason {
    pub fn label(self) -> &'static str {
        match self {
            EndReason::Checkmate => "checkmate",
            EndReason::Stalemate => "stalemate",
            EndReason::InsufficientMaterial => "insufficient_material",
            EndReason::MaxPlies => "max_plies",
            EndReason::NoMove => "no_move",
            EndReason::IllegalMove => "illegal_move",
        }
    }
}

/// 対局結果。`outcome` は `first` 側から見た結果。
#[derive(Clone, Debug)]
pub struct GameResult {
    pub outcome: Outcome,
    pub reason: EndReason,
    pub plies: u32,
    pub first_is_white: bool,
    pub moves: Vec<String>,
}

/// 1局を実行する。
///
/// - `first`, `second`: エンジン（事前に spawn 済み）
/// - `first_is_white`: `first` が白番か
/// - `deadline`: 各手の探索前に設定し、応答後に解除する
pub fn run_game(
    first: &mut EngineHandle,
    second: &mut EngineHandle,
    first_is_white: bool,
    config: &GameConfig,
    deadline: &Deadline,
) -> Result<GameResult> {
    let mut board = Chess::default();
    let mut moves: Vec<String> = Vec::new();

    // 白から見た結果
    let (white_result, reason) = loop {
        if let Some(end) = adjudicate(&board) {
            break end;
        }
        if moves.len() as u32 >= config.max_plies {
            break (Outcome::Draw, EndReason::MaxPlies);
        }

        let white_to_move = board.turn() == Color::White;
        let engine = if white_to_move == first_is_white {
            &mut *first
        } else {
            &mut *second
        };
        // 手番側が反則したときの白視点の結果
        let mover_loses = if white_to_move { Outcome::Loss } else { Outcome::Win };

        deadline.set(&engine.label, Instant::now() + config.move_deadline);
        let reply = engine.search(&moves, config.depth);
        deadline.clear();
        let best = reply?;

        if best.is_empty() {
            debug!("{} returned an empty bestmove", engine.label);
            break (mover_loses, EndReason::NoMove);
        }
        let Some(m) = best.parse::<UciMove>().ok().and_then(|u| u.to_move(&board).ok()) else {
            debug!("{} played illegal move {best}", engine.label);
            break (mover_loses, EndReason::IllegalMove);
        };
        board.play_unchecked(m);
        moves.push(m.to_uci(CastlingMode::Standard).to_string());
    };

    let outcome = if first_is_white { white_result } else { white_result.flip() };
    Ok(GameResult {
        outcome,
        reason,
        plies: moves.len() as u32,
        first_is_white,
        moves,
    })
}

/// 盤面だけで決まる終局判定（白視点）
fn adjudicate(board: &Chess) -> Option<(Outcome, EndReason)> {
    if board.is_checkmate() {
        let white_result = if board.turn() == Color::White { Outcome::Loss } else { Outcome::Win };
        return Some((white_result, EndReason::Checkmate));
    }
    if board.is_stalemate() {
        return Some((Outcome::Draw, EndReason::Stalemate));
    }
    if board.is_insufficient_material() {
        return Some((Outcome::Draw, EndReason::InsufficientMaterial));
    }
    None
}
