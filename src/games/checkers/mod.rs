pub mod board;
pub mod plugin;

pub use plugin::{CheckersEngine, CheckersState};
