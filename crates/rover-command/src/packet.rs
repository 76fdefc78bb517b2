use crate::{ArmCommand, Channel, Command, DriveCommand, PacketError, Result};
use core::fmt;

const SEP: char = '_';
const FIELDS: usize = 6;

/// Textual wire packet: `D_r0_r1_r2_l0_l1_l2` or `A_elbow_wr_wl_claw_gantry_shoulder`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandPacket {
    channel: Channel,
    text: String,
}

impl CommandPacket {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for CommandPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&Command> for CommandPacket {
    fn from(cmd: &Command) -> Self {
        let (tag, fields) = match cmd {
            Command::Drive(d) => (
                'D',
                [d.right[0], d.right[1], d.right[2], d.left[0], d.left[1], d.left[2]],
            ),
            Command::Arm(a) => (
                'A',
                [a.elbow, a.wrist_right, a.wrist_left, a.claw, a.gantry, a.shoulder],
            ),
        };
        let mut text = String::with_capacity(2 + FIELDS * 4);
        text.push(tag);
        for v in fields {
            text.push(SEP);
            text.push_str(&v.to_string());
        }
        Self {
            channel: cmd.channel(),
            text,
        }
    }
}

impl From<Command> for CommandPacket {
    fn from(cmd: Command) -> Self {
        Self::from(&cmd)
    }
}

impl From<DriveCommand> for CommandPacket {
    fn from(cmd: DriveCommand) -> Self {
        Self::from(Command::Drive(cmd))
    }
}

impl From<ArmCommand> for CommandPacket {
    fn from(cmd: ArmCommand) -> Self {
        Self::from(Command::Arm(cmd))
    }
}

impl Command {
    /// Decode a packet by field position. Inverse of [`CommandPacket::from`].
    pub fn parse(text: &str) -> Result<Command> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PacketError::Empty);
        }
        let mut parts = text.split(SEP);
        let tag = parts.next().unwrap_or_default();
        let mut values = [0u8; FIELDS];
        let mut count = 0usize;
        for (i, raw) in parts.enumerate() {
            if i >= FIELDS {
                count += 1;
                continue;
            }
            values[i] = raw.parse::<u8>().map_err(|_| PacketError::InvalidField {
                index: i,
                value: raw.to_string(),
            })?;
            count += 1;
        }

        match tag {
            "D" | "A" if count != FIELDS => Err(PacketError::FieldCount {
                expected: FIELDS,
                found: count,
            }),
            "D" => Ok(Command::Drive(DriveCommand {
                right: [values[0], values[1], values[2]],
                left: [values[3], values[4], values[5]],
            })),
            "A" => Ok(Command::Arm(ArmCommand {
                elbow: values[0],
                wrist_right: values[1],
                wrist_left: values[2],
                claw: values[3],
                gantry: values[4],
                shoulder: values[5],
            })),
            other => Err(PacketError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_arm, encode_drive, InputSnapshot, Key, PwmProfile};

    #[test]
    fn test_drive_wire_format() {
        let cmd = DriveCommand {
            right: [148, 148, 148],
            left: [108, 108, 108],
        };
        let pkt = CommandPacket::from(cmd);
        assert_eq!(pkt.as_str(), "D_148_148_148_108_108_108");
        assert_eq!(pkt.channel(), Channel::Drive);
    }

    #[test]
    fn test_arm_wire_field_order() {
        let cmd = ArmCommand {
            shoulder: 1,
            wrist_right: 2,
            wrist_left: 3,
            claw: 4,
            gantry: 5,
            elbow: 6,
        };
        let pkt = CommandPacket::from(cmd);
        assert_eq!(pkt.as_str(), "A_6_2_3_4_5_1");
        assert_eq!(pkt.channel(), Channel::Arm);
    }

    #[test]
    fn test_parse_reconstructs_encoded_values() {
        let p = PwmProfile::default();
        let snapshots = [
            InputSnapshot::empty(),
            InputSnapshot::from_keys([Key::W]),
            InputSnapshot::from_keys([Key::W, Key::A]),
            InputSnapshot::from_keys([Key::S, Key::D, Key::Q, Key::Up]),
            InputSnapshot::from_keys([Key::Right, Key::Z, Key::F]),
        ];
        for snap in snapshots {
            let drive = Command::Drive(encode_drive(&snap, &p));
            let arm = Command::Arm(encode_arm(&snap, &p));
            for cmd in [drive, arm] {
                let pkt = CommandPacket::from(&cmd);
                assert_eq!(Command::parse(pkt.as_str()).unwrap(), cmd);
            }
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse(""), Err(PacketError::Empty)));
        assert!(matches!(
            Command::parse("X_1_2_3_4_5_6"),
            Err(PacketError::UnknownKind(k)) if k == "X"
        ));
        assert!(matches!(
            Command::parse("D_1_2_3"),
            Err(PacketError::FieldCount { expected: 6, found: 3 })
        ));
        assert!(matches!(
            Command::parse("A_1_2_3_4_5_6_7"),
            Err(PacketError::FieldCount { expected: 6, found: 7 })
        ));
        assert!(matches!(
            Command::parse("D_1_2_300_4_5_6"),
            Err(PacketError::InvalidField { index: 2, .. })
        ));
    }

    #[test]
    fn test_parse_tolerates_trailing_newline() {
        let cmd = Command::parse("D_128_128_128_128_128_128\n").unwrap();
        assert_eq!(cmd, Command::Drive(DriveCommand::uniform(128, 128)));
    }
}
