pub mod apps;
pub mod bridge;
pub mod builtin;
pub mod clock;
pub mod device;
pub mod diag;
pub mod error;
pub mod fifo;
pub mod simulator;
pub mod word;

pub use bridge::{Bridge, BridgeConfig, BridgeState};
pub use clock::{ClockPair, Domain, Edges};
pub use error::ConfigError;
pub use simulator::utils::log;
pub use word::{Word, WordFormat};
