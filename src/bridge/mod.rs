mod config;
mod fsm;
mod harness;
mod pins;

pub use config::BridgeConfig;
pub use fsm::{transition, BridgeController, BridgeState, ControlInputs, StateCycles, Strobes};
pub use harness::{Bridge, Peripheral};
pub use pins::FtPins;
