//! 1セッション分のコマンドインタプリタ
//!
//! 入力1行ごとに状態を更新し、応答を書いてから次の行を読む同期ループ。
//! 並行性は持たない（1スレッド1セッション）。

use std::io::{BufRead, Write};

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use shakmaty::{CastlingMode, Chess};

use crate::command::{UciCommand, parse_command};
use crate::error::{SessionError, SessionResult};
use crate::io::uci_println;
use crate::options::{UciOptions, handle_setoption, send_id_and_options};
use crate::position::build_position;
use crate::search::{SearchReport, run_go};

pub const DEFAULT_ENGINE_NAME: &str = "rchess-engine";

/// セッション起動時の設定
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// `id name` で返す名前
    pub engine_name: String,
    /// true なら局面・指し手エラーでセッションを終了する
    pub strict: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine_name: DEFAULT_ENGINE_NAME.to_string(),
            strict: false,
        }
    }
}

/// 1コマンド処理後にループを続けるかどうか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// セッション状態（局面・オプション・探索深さ）
#[derive(Clone, Debug)]
pub struct SessionState {
    pub position: Chess,
    /// `position` を受けた時点の castling 表記。`go` の出力はこれに従う。
    pub castling_mode: CastlingMode,
    pub opts: UciOptions,
    /// 前回の `go depth` を保持する。未設定なら 0。
    pub depth: i32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            position: Chess::default(),
            castling_mode: CastlingMode::Standard,
            opts: UciOptions::default(),
            depth: 0,
        }
    }
}

/// UCI セッション。乱数生成器はセッションが所有し、外から注入できる。
pub struct Session<G = Xoshiro256PlusPlus> {
    state: SessionState,
    rng: G,
    config: SessionConfig,
    last_search: Option<SearchReport>,
}

impl Session<Xoshiro256PlusPlus> {
    /// seed から決定的なセッションを作る。
    pub fn with_seed(seed: u64, config: SessionConfig) -> Self {
        Self::new(Xoshiro256PlusPlus::seed_from_u64(seed), config)
    }
}

impl<G: Rng> Session<G> {
    pub fn new(rng: G, config: SessionConfig) -> Self {
        Self {
            state: SessionState::default(),
            rng,
            config,
            last_search: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 直近の `go` の結果
    pub fn last_search(&self) -> Option<&SearchReport> {
        self.last_search.as_ref()
    }

    /// 1行を処理する。
    ///
    /// 局面・指し手エラーは `Err` で返し、その場合セッション状態は変化しない。
    pub fn execute<W: Write + ?Sized>(&mut self, line: &str, out: &mut W) -> SessionResult<Flow> {
        let Some(cmd) = parse_command(line)? else {
            if !line.trim().is_empty() {
                debug!("Ignoring command: {}", line.trim());
            }
            return Ok(Flow::Continue);
        };

        match cmd {
            UciCommand::Uci => {
                send_id_and_options(out, &self.config.engine_name, &self.state.opts)?;
            }
            UciCommand::IsReady => uci_println(out, "readyok")?,
            UciCommand::SetOption { name, value } => {
                handle_setoption(&mut self.state.opts, &name, value.as_deref());
            }
            UciCommand::Position { source, moves } => {
                let mode = self.state.opts.castling_mode();
                let pos = build_position(&source, &moves, mode)?;
                self.state.position = pos;
                self.state.castling_mode = mode;
            }
            UciCommand::Go(params) => {
                if let Some(d) = params.depth {
                    self.state.depth = d;
                }
                let report = run_go(
                    out,
                    &self.state.position,
                    self.state.depth,
                    &mut self.rng,
                    self.state.castling_mode,
                )?;
                self.last_search = Some(report);
            }
            UciCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// 入力が尽きるか `quit` を受けるまで読み続ける。
    ///
    /// 非 strict モードでは局面・指し手エラーをログに残してコマンドを拒否し、継続する。
    /// UTF-8 として不正なバイトは置換文字にして読み進める。
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> SessionResult<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            match self.execute(&line, &mut out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => {
                    info!("quit received");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() && !self.config.strict => {
                    warn!("rejected '{}': {e}", line.trim());
                }
                Err(e) => return Err(e),
            }
        }
        debug!("input closed");
        Ok(())
    }
}

/// 与えたスクリプトを seed 固定で流し、出力を文字列で返す（テスト・ハーネス用）。
pub fn run_script(seed: u64, config: SessionConfig, script: &str) -> SessionResult<String> {
    let mut session = Session::with_seed(seed, config);
    let mut out = Vec::new();
    session.run(script.as_bytes(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
