//! teleop-core: keyboard teleop loop for the rover
//!
//! Polls an [`InputSource`](rover_command::InputSource) at a fixed period,
//! encodes drive and arm commands, suppresses unchanged ones, and fans the
//! rest out to a WebSocket viewer and the rover's UDP command port.

mod error;
pub use error::{Result, TeleopError};

mod config;
pub use config::TeleopConfig;

mod teleop;
pub use teleop::{Emission, Teleop, TeleopState, TeleopSummary, TickOutcome};
