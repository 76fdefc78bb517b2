use crate::{ArmCommand, Command, DriveCommand};

/// Last transmitted value per channel.
///
/// A command is emitted only when it differs from what was last committed for
/// its channel. Commit happens after every emit attempt, delivered or not.
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    drive: Option<DriveCommand>,
    arm: Option<ArmCommand>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_emit(&self, cmd: &Command) -> bool {
        match cmd {
            Command::Drive(d) => self.drive.as_ref() != Some(d),
            Command::Arm(a) => self.arm.as_ref() != Some(a),
        }
    }

    pub fn commit(&mut self, cmd: &Command) {
        match *cmd {
            Command::Drive(d) => self.drive = Some(d),
            Command::Arm(a) => self.arm = Some(a),
        }
    }

    pub fn last_drive(&self) -> Option<&DriveCommand> {
        self.drive.as_ref()
    }

    pub fn last_arm(&self) -> Option<&ArmCommand> {
        self.arm.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PwmProfile;

    #[test]
    fn test_first_value_always_emits() {
        let t = ChangeTracker::new();
        let p = PwmProfile::default();
        assert!(t.should_emit(&Command::Drive(DriveCommand::neutral(&p))));
        assert!(t.should_emit(&Command::Arm(ArmCommand::neutral(&p))));
    }

    #[test]
    fn test_repeat_is_suppressed() {
        let mut t = ChangeTracker::new();
        let cmd = Command::Drive(DriveCommand::uniform(148, 148));
        t.commit(&cmd);
        assert!(!t.should_emit(&cmd));
        assert!(t.should_emit(&Command::Drive(DriveCommand::uniform(148, 108))));
    }

    #[test]
    fn test_channels_are_independent() {
        let mut t = ChangeTracker::new();
        let p = PwmProfile::default();
        let drive = Command::Drive(DriveCommand::neutral(&p));
        t.commit(&drive);

        assert!(!t.should_emit(&drive));
        assert!(t.should_emit(&Command::Arm(ArmCommand::neutral(&p))));
        assert_eq!(t.last_drive(), Some(&DriveCommand::neutral(&p)));
        assert_eq!(t.last_arm(), None);
    }

    #[test]
    fn test_commit_overwrites_previous_value() {
        let mut t = ChangeTracker::new();
        let first = Command::Drive(DriveCommand::uniform(148, 148));
        let second = Command::Drive(DriveCommand::uniform(108, 148));
        t.commit(&first);
        t.commit(&second);
        assert_eq!(t.last_drive(), Some(&DriveCommand::uniform(108, 148)));
        assert!(t.should_emit(&first));
        assert!(!t.should_emit(&second));
    }
}
