use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use rchess_engine::{DEFAULT_ENGINE_NAME, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Random-mover UCI engine for harness testing")]
struct Cli {
    /// PRNG seed (same seed + same commands => identical output)
    #[arg(default_value_t = 0)]
    seed: u64,

    /// Exit with an error on an illegal FEN / move instead of rejecting the command
    #[arg(long)]
    strict: bool,

    /// Name reported by `id name`
    #[arg(long, default_value = DEFAULT_ENGINE_NAME)]
    name: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!("seed={} strict={} name={}", cli.seed, cli.strict, cli.name);

    let config = SessionConfig {
        engine_name: cli.name,
        strict: cli.strict,
    };
    let mut session = Session::with_seed(cli.seed, config);

    let stdin = io::stdin();
    // 各行は uci_println で flush されるので BufWriter でも応答は遅延しない
    let stdout = BufWriter::new(io::stdout().lock());
    session.run(stdin.lock(), stdout).context("session aborted")?;
    Ok(())
}
