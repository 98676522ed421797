pub mod config;
pub mod sim;
pub mod simulator;
pub mod utils;

pub use simulator::{create_app, Simulator};
pub use utils::log;
