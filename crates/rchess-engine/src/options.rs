use std::io::{self, Write};

use log::debug;
use shakmaty::CastlingMode;

use crate::io::uci_println;

/// 唯一サポートするオプション名
pub const OPT_CHESS960: &str = "UCI_Chess960";

/// セッションでネゴシエートされたオプション
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UciOptions {
    pub chess960: bool,
}

impl UciOptions {
    pub fn castling_mode(&self) -> CastlingMode {
        CastlingMode::from_chess960(self.chess960)
    }
}

/// `uci` への応答: id, option, uciok の3行。
pub fn send_id_and_options<W: Write + ?Sized>(
    out: &mut W,
    engine_name: &str,
    opts: &UciOptions,
) -> io::Result<()> {
    uci_println(out, &format!("id name {engine_name}"))?;
    uci_println(
        out,
        &format!("option name {OPT_CHESS960} type check default {}", opts.chess960),
    )?;
    uci_println(out, "uciok")
}

/// `setoption` を適用する。未知の名前や値なしは無視。
pub fn handle_setoption(opts: &mut UciOptions, name: &str, value: Option<&str>) {
    match (name, value) {
        (OPT_CHESS960, Some(v)) => {
            opts.chess960 = v == "true";
            debug!("setoption {OPT_CHESS960}={}", opts.chess960);
        }
        _ => debug!("Ignoring setoption name={name} value={value:?}"),
    }
}
