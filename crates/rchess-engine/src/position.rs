use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Move, Position};

use crate::command::PositionSource;
use crate::error::{SessionError, SessionResult};

/// 平手初期局面
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN を castling mode に従って局面へ変換する。
pub fn parse_fen(fen: &str, mode: CastlingMode) -> SessionResult<Chess> {
    let invalid = |reason: String| SessionError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen =
        fen.parse().map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    parsed.into_position(mode).map_err(|e| invalid(e.to_string()))
}

/// 指し手列を順に適用する。
///
/// 受け取った局面を scratch として in-place で進め、全手が通った場合だけ返す。
pub fn apply_moves(mut pos: Chess, moves: &[String]) -> SessionResult<Chess> {
    for (ply, token) in moves.iter().enumerate() {
        let invalid = |reason: String| SessionError::InvalidMove {
            mv: token.clone(),
            ply,
            reason,
        };
        let uci: UciMove =
            token.parse().map_err(|e: shakmaty::uci::ParseUciMoveError| invalid(e.to_string()))?;
        let m = uci.to_move(&pos).map_err(|e| invalid(e.to_string()))?;
        pos.play_unchecked(m);
    }
    Ok(pos)
}

/// `position` コマンドの内容から新しい局面を組み立てる。
pub fn build_position(
    source: &PositionSource,
    moves: &[String],
    mode: CastlingMode,
) -> SessionResult<Chess> {
    let base = match source {
        PositionSource::StartPos => parse_fen(START_FEN, mode)?,
        PositionSource::Fen(fen) => parse_fen(fen, mode)?,
    };
    apply_moves(base, moves)
}

/// Long algebraic notation (Chess960 では king-takes-rook 表記)
pub fn move_to_lan(m: &Move, mode: CastlingMode) -> String {
    m.to_uci(mode).to_string()
}

#[cfg(test)]
pub(crate) fn same_position(a: &Chess, b: &Chess) -> bool {
    a.board() == b.board()
        && a.turn() == b.turn()
        && a.castles().castling_rights() == b.castles().castling_rights()
        && a.halfmoves() == b.halfmoves()
        && a.fullmoves() == b.fullmoves()
        && a.legal_moves() == b.legal_moves()
}
