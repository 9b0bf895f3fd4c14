pub mod config;
pub mod engine;
pub mod game;
pub mod runner;
pub mod types;

pub use config::SelfplayConfig;
pub use engine::EngineHandle;
pub use game::{EndReason, GameConfig, GameResult, run_game};
pub use runner::run_selfplay;
pub use types::{GameRecord, SelfplayReport};
