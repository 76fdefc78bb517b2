use crate::InputSnapshot;

/// A source of held-key snapshots, e.g. a keyboard hook or a game window.
pub trait InputSource: Send {
    /// Keys held right now. Called once per tick.
    fn snapshot(&mut self) -> InputSnapshot;

    /// True once the user asked to quit. Checked once per idle period.
    fn quit_requested(&mut self) -> bool;

    /// Release the underlying device. Called once when the loop stops.
    fn release(&mut self) {}
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn snapshot(&mut self) -> InputSnapshot {
        (**self).snapshot()
    }

    fn quit_requested(&mut self) -> bool {
        (**self).quit_requested()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
