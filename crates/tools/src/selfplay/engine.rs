use anyhow::{Context, Result, bail};
use log::trace;

use rchess_engine::{Flow, Session, SessionConfig};

/// プロセス内で動かす1本のエンジン。
///
/// 外部プロセスの代わりに `Session` へ直接コマンド行を渡し、応答行を回収する。
pub struct EngineHandle {
    session: Session,
    buf: Vec<u8>,
    pub label: String,
}

impl EngineHandle {
    /// セッションを作り、`uci` / `isready` のハンドシェイクまで済ませる。
    pub fn spawn(label: String, seed: u64) -> Result<Self> {
        let config = SessionConfig {
            engine_name: label.clone(),
            strict: true,
        };
        let mut engine = Self {
            session: Session::with_seed(seed, config),
            buf: Vec::new(),
            label,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&mut self) -> Result<()> {
        let lines = self.send("uci")?;
        if lines.last().map(String::as_str) != Some("uciok") {
            bail!("{}: no uciok in handshake: {lines:?}", self.label);
        }
        self.sync_ready()
    }

    pub fn sync_ready(&mut self) -> Result<()> {
        let lines = self.send("isready")?;
        if lines != ["readyok"] {
            bail!("{}: unexpected isready reply: {lines:?}", self.label);
        }
        Ok(())
    }

    /// 1行送って応答行を返す。
    pub fn send(&mut self, line: &str) -> Result<Vec<String>> {
        self.buf.clear();
        trace!("{} < {line}", self.label);
        let flow = self
            .session
            .execute(line, &mut self.buf)
            .with_context(|| format!("{}: command rejected: {line}", self.label))?;
        if flow == Flow::Quit {
            bail!("{}: session quit unexpectedly", self.label);
        }
        let text = String::from_utf8_lossy(&self.buf);
        Ok(text.lines().map(str::to_string).collect())
    }

    /// 平手からの指し手列で局面を送り、`go depth` の bestmove を返す。
    ///
    /// 合法手がない場合は空文字列。
    pub fn search(&mut self, moves: &[String], depth: i32) -> Result<String> {
        let position = if moves.is_empty() {
            "position startpos".to_string()
        } else {
            format!("position startpos moves {}", moves.join(" "))
        };
        self.send(&position)?;
        let lines = self.send(&format!("go depth {depth}"))?;
        let last = lines.last().with_context(|| format!("{}: no reply to go", self.label))?;
        let Some(rest) = last.strip_prefix("bestmove") else {
            bail!("{}: expected bestmove, got '{last}'", self.label);
        };
        Ok(rest.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_performs_handshake() {
        let mut engine = EngineHandle::spawn("probe".to_string(), 1).unwrap();
        assert_eq!(engine.send("uci").unwrap()[0], "id name probe");
        engine.sync_ready().unwrap();
    }

    #[test]
    fn search_returns_a_move_from_startpos() {
        let mut engine = EngineHandle::spawn("probe".to_string(), 2).unwrap();
        let mv = engine.search(&[], 2).unwrap();
        assert_eq!(mv.len(), 4, "unexpected move '{mv}'");

        let mv = engine.search(&["e2e4".to_string()], 1).unwrap();
        assert!(!mv.is_empty());
    }

    #[test]
    fn illegal_history_is_an_error() {
        let mut engine = EngineHandle::spawn("probe".to_string(), 3).unwrap();
        let err = engine.search(&["e2e5".to_string()], 1).unwrap_err();
        assert!(format!("{err:#}").contains("e2e5"));
    }
}
