//! 対局記録の JSONL 出力
//!
//! 1レコード1行で書く。出力先は `-` なら標準出力、拡張子 `.gz` なら gzip、それ以外は通常ファイル。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

/// 書き終わりの処理を持つ出力先
pub trait Finish: Write {
    /// バッファを書き切る。gzip ならトレーラまで書く。
    fn finish(self: Box<Self>) -> io::Result<()>;
}

impl Finish for io::Stdout {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

impl Finish for BufWriter<File> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

impl Finish for GzEncoder<BufWriter<File>> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        let mut inner = GzEncoder::finish(*self)?;
        inner.flush()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Plain(PathBuf),
    Gzip(PathBuf),
}

impl Destination {
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            return Destination::Stdout;
        }
        let gz = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        if gz {
            Destination::Gzip(path.to_path_buf())
        } else {
            Destination::Plain(path.to_path_buf())
        }
    }

    /// 出力先を開く。ファイルは作り直す。
    pub fn open(&self) -> io::Result<JsonlSink<Box<dyn Finish>>> {
        let out: Box<dyn Finish> = match self {
            Destination::Stdout => Box::new(io::stdout()),
            Destination::Plain(path) => Box::new(BufWriter::new(File::create(path)?)),
            Destination::Gzip(path) => Box::new(GzEncoder::new(
                BufWriter::new(File::create(path)?),
                Compression::default(),
            )),
        };
        Ok(JsonlSink::new(out))
    }
}

/// レコードを1行ずつ書くシンク
pub struct JsonlSink<W: Write> {
    out: W,
    records: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, records: 0 }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// これまでに書いたレコード数
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonlSink<Box<dyn Finish>> {
    /// 出力を閉じ、書いたレコード数を返す。
    pub fn close(self) -> io::Result<u64> {
        let records = self.records;
        self.out.finish()?;
        Ok(records)
    }
}
