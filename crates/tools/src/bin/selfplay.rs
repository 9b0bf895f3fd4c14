/// rchess-engine のプロセス内並列 selfplay。
///
/// ワーカーごとに2本のセッションを対局させ、1局1行の JSONL を出力する。
/// 勝敗はワーカー1本目のエンジンから見た値で、全ワーカー分を集計して最後に表示する。
///
/// # 使用例
///
/// ```shell
/// cargo run -p tools --release --bin selfplay -- \
///   --workers 8 --games 20 --depth 4 --seed 1 --out runs/selfplay.jsonl.gz
/// ```
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser as _;

use tools::common::jsonl::Destination;
use tools::selfplay::{SelfplayConfig, run_selfplay};

#[derive(clap::Parser, Debug)]
#[command(about = "parallel in-process selfplay for rchess-engine sessions")]
struct Cli {
    /// TOML config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Games per worker
    #[arg(long)]
    games: Option<u32>,

    /// Search depth sent with every `go`
    #[arg(long)]
    depth: Option<i32>,

    /// Maximum plies per game before it is scored as a draw
    #[arg(long)]
    max_plies: Option<u32>,

    /// Base seed; each engine derives its own from this and its worker id
    #[arg(long)]
    seed: Option<u64>,

    /// Per-move response deadline watched by the watchdog (ms)
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// JSONL output ("-" for stdout, ".gz" suffix for gzip)
    #[arg(long, default_value = "-")]
    out: PathBuf,
}

impl Cli {
    fn resolve_config(&self) -> Result<SelfplayConfig> {
        let mut cfg = match &self.config {
            Some(path) => SelfplayConfig::load(path)?,
            None => SelfplayConfig::default(),
        };
        if let Some(v) = self.workers {
            cfg.workers = v;
        }
        if let Some(v) = self.games {
            cfg.games = v;
        }
        if let Some(v) = self.depth {
            cfg.depth = v;
        }
        if let Some(v) = self.max_plies {
            cfg.max_plies = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.deadline_ms {
            cfg.deadline_ms = v;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;

    let mut sink = Destination::from_path(&cli.out)
        .open()
        .with_context(|| format!("failed to open {}", cli.out.display()))?;
    let report = run_selfplay(&cfg, &mut sink)?;
    sink.close().with_context(|| format!("failed to close {}", cli.out.display()))?;

    eprintln!();
    eprintln!("=== Selfplay Complete ===");
    eprintln!("Workers: {}  Games: {}", cfg.workers, report.games);
    eprintln!("Result (first engine): {}", report.tally);
    if let Some(rate) = report.tally.score_rate() {
        eprintln!("Score rate: {:.1}%", rate * 100.0);
    }
    if report.overdue_events > 0 {
        eprintln!("Deadline warnings: {}", report.overdue_events);
    }
    eprintln!("=========================");

    if !report.failed_workers.is_empty() {
        bail!("workers failed: {:?}", report.failed_workers);
    }
    Ok(())
}
