use crate::{ArmCommand, DriveCommand, InputSnapshot, Key, PwmProfile};

/// Map held keys to wheel power.
///
/// `W`/`S` drive both sides straight. `A`/`D` tank-turn and are applied after
/// straight motion, so a turn key always wins. Within a pair the first key
/// listed wins when both are held.
pub fn encode_drive(snapshot: &InputSnapshot, profile: &PwmProfile) -> DriveCommand {
    let (fwd, rev) = (profile.forward, profile.reverse);
    let mut cmd = DriveCommand::neutral(profile);

    if snapshot.is_held(Key::W) {
        cmd = DriveCommand::uniform(fwd, fwd);
    } else if snapshot.is_held(Key::S) {
        cmd = DriveCommand::uniform(rev, rev);
    }

    if snapshot.is_held(Key::A) {
        cmd = DriveCommand::uniform(fwd, rev);
    } else if snapshot.is_held(Key::D) {
        cmd = DriveCommand::uniform(rev, fwd);
    }

    cmd
}

/// Map held keys to arm joint power.
///
/// Gantry moves are expressed through the wrist pair, and wrist rotation is
/// applied afterwards so it overrides gantry on both wrists. The `gantry`
/// field is not driven by any key.
pub fn encode_arm(snapshot: &InputSnapshot, profile: &PwmProfile) -> ArmCommand {
    let (fwd, rev) = (profile.forward, profile.reverse);
    let mut cmd = ArmCommand::neutral(profile);

    if let Some(v) = pair(snapshot, Key::Q, Key::E, fwd, rev) {
        cmd.claw = v;
    }
    if let Some(v) = pair(snapshot, Key::X, Key::Z, fwd, rev) {
        cmd.elbow = v;
    }

    if snapshot.is_held(Key::Up) {
        cmd.wrist_right = fwd;
        cmd.wrist_left = rev;
    } else if snapshot.is_held(Key::Down) {
        cmd.wrist_right = rev;
        cmd.wrist_left = fwd;
    }

    if snapshot.is_held(Key::Left) {
        cmd.wrist_right = rev;
        cmd.wrist_left = rev;
    } else if snapshot.is_held(Key::Right) {
        cmd.wrist_right = fwd;
        cmd.wrist_left = fwd;
    }

    if let Some(v) = pair(snapshot, Key::R, Key::F, fwd, rev) {
        cmd.shoulder = v;
    }

    cmd
}

fn pair(snapshot: &InputSnapshot, first: Key, second: Key, a: u8, b: u8) -> Option<u8> {
    if snapshot.is_held(first) {
        Some(a)
    } else if snapshot.is_held(second) {
        Some(b)
    } else {
        None
    }
}
