use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// selfplay ハーネスの設定。TOML から読み、CLI で上書きする。
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SelfplayConfig {
    /// 並行ワーカー数
    pub workers: usize,
    /// ワーカーあたりの対局数
    pub games: u32,
    /// 各手の `go depth`
    pub depth: i32,
    /// この手数に達したら引き分け
    pub max_plies: u32,
    /// ワーカー id から各エンジンの seed を導く基準値
    pub seed: u64,
    /// 1手の応答期限（ミリ秒）
    pub deadline_ms: u64,
    /// watchdog の巡回間隔（ミリ秒）
    pub watchdog_poll_ms: u64,
}

impl Default for SelfplayConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            games: 10,
            depth: 4,
            max_plies: 200,
            seed: 0,
            deadline_ms: 1000,
            watchdog_poll_ms: 100,
        }
    }
}

impl SelfplayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.watchdog_poll_ms == 0 {
            bail!("watchdog_poll_ms must be positive");
        }
        Ok(())
    }

    pub fn move_deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_poll_ms)
    }

    /// ワーカー `id` の2本のエンジン用 seed
    pub fn engine_seeds(&self, id: usize) -> (u64, u64) {
        let base = self.seed.wrapping_add(2 * id as u64);
        (base, base.wrapping_add(1))
    }
}
