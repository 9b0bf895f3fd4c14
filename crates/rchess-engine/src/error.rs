//! セッション単位のエラー型
//!
//! 局面・指し手の不正はコマンド単位で拒否し、セッションは継続する。
//! 出力チャネルの I/O エラーだけはセッションを終了させる。

/// Session-level errors
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// `position` lacks `startpos` / `fen`
    #[error("position command must start with 'startpos' or 'fen' (got {0:?})")]
    MissingPositionSource(Option<String>),

    /// FEN could not be parsed or describes an impossible position
    #[error("illegal FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Move token is malformed or illegal in the current position
    #[error("invalid move '{mv}' at ply {ply}: {reason}")]
    InvalidMove { mv: String, ply: usize, reason: String },

    /// Output channel failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// コマンド拒否で済むエラーかどうか。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Io(_))
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
