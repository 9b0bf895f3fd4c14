use std::io::{self, Write};

/// UCIプロトコルに沿って1行を出力し、即座に flush するヘルパ。
///
/// ハーネスは応答を同期的に読むため、バッファに残すとデッドロックする。
pub fn uci_println<W: Write + ?Sized>(out: &mut W, s: &str) -> io::Result<()> {
    writeln!(out, "{s}")?;
    out.flush()
}
