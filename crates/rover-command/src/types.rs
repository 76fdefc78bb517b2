use core::fmt;
use serde::{Deserialize, Serialize};

/// Keys the teleop mapping reacts to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    W,
    S,
    A,
    D,
    Q,
    E,
    X,
    Z,
    R,
    F,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

impl Key {
    pub const ALL: [Key; 15] = [
        Key::W,
        Key::S,
        Key::A,
        Key::D,
        Key::Q,
        Key::E,
        Key::X,
        Key::Z,
        Key::R,
        Key::F,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Escape,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Keys held at the moment of one tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct InputSnapshot {
    held: u16,
}

impl InputSnapshot {
    /// Snapshot with nothing held.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_keys<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        keys.into_iter().collect()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.held == 0
    }

    pub fn press(&mut self, key: Key) {
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.held &= !key.bit();
    }

    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|k| self.is_held(*k))
    }
}

impl FromIterator<Key> for InputSnapshot {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        let mut snap = Self::empty();
        for key in iter {
            snap.press(key);
        }
        snap
    }
}

/// Duty-cycle constants shared by the drive and arm mappings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmProfile {
    pub forward: u8,
    pub reverse: u8,
    pub center: u8,
    /// Analog stick threshold. Reserved; the key mapping is digital.
    pub deadzone: f32,
}

impl Default for PwmProfile {
    fn default() -> Self {
        Self {
            forward: 148,
            reverse: 108,
            center: 128,
            deadzone: 0.1,
        }
    }
}

/// Wheel power for three motors per side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DriveCommand {
    pub right: [u8; 3],
    pub left: [u8; 3],
}

impl DriveCommand {
    pub fn uniform(right: u8, left: u8) -> Self {
        Self {
            right: [right; 3],
            left: [left; 3],
        }
    }

    pub fn neutral(profile: &PwmProfile) -> Self {
        Self::uniform(profile.center, profile.center)
    }
}

/// Manipulator arm joint power.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ArmCommand {
    pub shoulder: u8,
    pub wrist_right: u8,
    pub wrist_left: u8,
    pub claw: u8,
    pub gantry: u8,
    pub elbow: u8,
}

impl ArmCommand {
    pub fn neutral(profile: &PwmProfile) -> Self {
        let c = profile.center;
        Self {
            shoulder: c,
            wrist_right: c,
            wrist_left: c,
            claw: c,
            gantry: c,
            elbow: c,
        }
    }
}

/// Independent command streams, each with its own change detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Channel {
    Drive,
    Arm,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Drive => f.write_str("drive"),
            Channel::Arm => f.write_str("arm"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Command {
    Drive(DriveCommand),
    Arm(ArmCommand),
}

impl Command {
    pub fn channel(&self) -> Channel {
        match self {
            Command::Drive(_) => Channel::Drive,
            Command::Arm(_) => Channel::Arm,
        }
    }
}

impl From<DriveCommand> for Command {
    fn from(cmd: DriveCommand) -> Self {
        Command::Drive(cmd)
    }
}

impl From<ArmCommand> for Command {
    fn from(cmd: ArmCommand) -> Self {
        Command::Arm(cmd)
    }
}
