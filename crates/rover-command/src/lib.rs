//! rover-command: keyboard snapshots to rover drive/arm commands
//!
//! This crate maps a snapshot of held keys into a drive command (three wheels
//! per side) and an arm command (six joints), encodes them as the underscore
//! delimited text packets the rover firmware understands, and tracks the last
//! value sent per channel so unchanged commands are not re-sent. The default
//! build enables a `mock` scripted input source for tests and headless runs.

mod types;
pub use types::{ArmCommand, Channel, Command, DriveCommand, InputSnapshot, Key, PwmProfile};

mod error;
pub use error::{PacketError, Result};

mod encode;
pub use encode::{encode_arm, encode_drive};

mod packet;
pub use packet::CommandPacket;

mod tracker;
pub use tracker::ChangeTracker;

mod input;
pub use input::InputSource;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::ScriptedInput;
