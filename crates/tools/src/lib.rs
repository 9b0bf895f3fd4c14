pub mod common;
pub mod selfplay;
