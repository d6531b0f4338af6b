pub mod errors;
pub mod instance;
pub mod models;
pub mod plugin;
pub mod settings;
pub mod simulator;
pub mod turns;
