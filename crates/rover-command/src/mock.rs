use crate::{InputSnapshot, InputSource};

/// Plays back a fixed list of snapshots, one per tick.
///
/// Once the script runs out it either starts over (`looping`) or keeps
/// returning the last frame and requests quit.
pub struct ScriptedInput {
    frames: Vec<InputSnapshot>,
    cursor: usize,
    looping: bool,
    released: bool,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = InputSnapshot>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            cursor: 0,
            looping: false,
            released: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.cursor >= self.frames.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl InputSource for ScriptedInput {
    fn snapshot(&mut self) -> InputSnapshot {
        if self.frames.is_empty() {
            return InputSnapshot::empty();
        }
        if self.looping && self.cursor >= self.frames.len() {
            self.cursor = 0;
        }
        let idx = self.cursor.min(self.frames.len() - 1);
        if self.cursor < self.frames.len() {
            self.cursor += 1;
        }
        self.frames[idx]
    }

    fn quit_requested(&mut self) -> bool {
        self.is_exhausted()
    }

    fn release(&mut self) {
        self.released = true;
        tracing::debug!("scripted input released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;

    #[test]
    fn test_plays_frames_in_order_then_quits() {
        let w = InputSnapshot::from_keys([Key::W]);
        let mut input = ScriptedInput::new([InputSnapshot::empty(), w]);
        assert!(!input.quit_requested());
        assert_eq!(input.snapshot(), InputSnapshot::empty());
        assert_eq!(input.snapshot(), w);
        assert!(input.quit_requested());
        assert_eq!(input.snapshot(), w);
    }

    #[test]
    fn test_looping_never_quits() {
        let w = InputSnapshot::from_keys([Key::W]);
        let mut input = ScriptedInput::new([w, InputSnapshot::empty()]).looping();
        for _ in 0..5 {
            input.snapshot();
            assert!(!input.quit_requested());
        }
        input.snapshot();
        assert_eq!(input.snapshot(), w);
    }

    #[test]
    fn test_empty_script() {
        let mut input = ScriptedInput::new([]);
        assert!(input.quit_requested());
        assert!(input.snapshot().is_empty());
        input.release();
        assert!(input.is_released());
    }
}
