//! Minimal random-mover UCI engine.
//!
//! 対局ハーネスの負荷試験・回帰試験に使う決定的なテスト用エンジン。
//! 評価は行わず、合法手からランダムに選んだ PV とランダムなスコアを返す。
//! 同じ seed と同じコマンド列なら出力はバイト単位で一致する。

pub mod command;
pub mod error;
pub mod io;
pub mod options;
pub mod position;
pub mod search;
pub mod session;

pub use command::{GoParams, PositionSource, UciCommand, parse_command};
pub use error::{SessionError, SessionResult};
pub use options::UciOptions;
pub use search::SearchReport;
pub use session::{DEFAULT_ENGINE_NAME, Flow, Session, SessionConfig, SessionState, run_script};
