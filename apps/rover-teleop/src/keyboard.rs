use parking_lot::Mutex;
use rdev::{listen, EventType, Key as RdevKey};
use rover_command::{InputSnapshot, InputSource, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use teleop_core::TeleopError;

const STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Global keyboard hook that tracks which teleop keys are held.
///
/// `Escape` requests quit. The hook thread cannot be joined (the OS listener
/// blocks forever), so `release` only detaches it from this source.
pub struct KeyboardInput {
    held: Arc<Mutex<InputSnapshot>>,
    quit: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

impl KeyboardInput {
    pub fn open() -> Result<Self, TeleopError> {
        let held = Arc::new(Mutex::new(InputSnapshot::empty()));
        let quit = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicBool::new(true));
        let (err_tx, err_rx) = mpsc::channel::<String>();

        let (h, q, a) = (held.clone(), quit.clone(), active.clone());
        thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                let result = listen(move |event| {
                    if !a.load(Ordering::Relaxed) {
                        return;
                    }
                    match event.event_type {
                        EventType::KeyPress(k) => {
                            if let Some(key) = map_key(k) {
                                if key == Key::Escape {
                                    q.store(true, Ordering::Relaxed);
                                }
                                h.lock().press(key);
                            }
                        }
                        EventType::KeyRelease(k) => {
                            if let Some(key) = map_key(k) {
                                h.lock().release(key);
                            }
                        }
                        _ => {}
                    }
                });
                let reason = match result {
                    Ok(()) => "keyboard listener exited".to_string(),
                    Err(e) => format!("{e:?}"),
                };
                let _ = err_tx.send(reason);
            })
            .map_err(|e| TeleopError::InputUnavailable(e.to_string()))?;

        // The hook either fails right away or blocks for the life of the process.
        match err_rx.recv_timeout(STARTUP_GRACE) {
            Ok(reason) => Err(TeleopError::InputUnavailable(reason)),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::info!("keyboard hook installed (Esc to quit)");
                Ok(Self { held, quit, active })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(TeleopError::InputUnavailable(
                "keyboard listener thread exited".to_string(),
            )),
        }
    }
}

impl InputSource for KeyboardInput {
    fn snapshot(&mut self) -> InputSnapshot {
        *self.held.lock()
    }

    fn quit_requested(&mut self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }

    fn release(&mut self) {
        self.active.store(false, Ordering::Relaxed);
        *self.held.lock() = InputSnapshot::empty();
        tracing::debug!("keyboard hook released");
    }
}

fn map_key(key: RdevKey) -> Option<Key> {
    let mapped = match key {
        RdevKey::KeyW => Key::W,
        RdevKey::KeyS => Key::S,
        RdevKey::KeyA => Key::A,
        RdevKey::KeyD => Key::D,
        RdevKey::KeyQ => Key::Q,
        RdevKey::KeyE => Key::E,
        RdevKey::KeyX => Key::X,
        RdevKey::KeyZ => Key::Z,
        RdevKey::KeyR => Key::R,
        RdevKey::KeyF => Key::F,
        RdevKey::UpArrow => Key::Up,
        RdevKey::DownArrow => Key::Down,
        RdevKey::LeftArrow => Key::Left,
        RdevKey::RightArrow => Key::Right,
        RdevKey::Escape => Key::Escape,
        _ => return None,
    };
    Some(mapped)
}
