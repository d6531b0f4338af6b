pub mod deck;
pub mod plugin;
pub mod scoring;
pub mod types;

pub use plugin::HeartsEngine;
pub use types::{HeartsMove, HeartsSettings, HeartsState};
