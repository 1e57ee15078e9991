/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Edge-triggered taps (only fire on initial press)
///   - Press-and-hold with a release edge
///   - Mouse drags in terminal cell coordinates
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Grace period before the first autorepeat arrives.
const FIRST_REPEAT_TIMEOUT: Duration = Duration::from_millis(700);

/// Left-button mouse activity, in terminal cells (column, row).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pointer {
    Down(u16, u16),
    Drag(u16, u16),
    Up(u16, u16),
}

#[derive(Clone, Copy, Debug)]
struct KeyHold {
    last: Instant,
    repeated: bool,
}

impl KeyHold {
    fn alive(&self, now: Instant) -> bool {
        let limit = if self.repeated { HOLD_TIMEOUT } else { FIRST_REPEAT_TIMEOUT };
        now.duration_since(self.last) < limit
    }
}

pub struct InputState {
    /// Last Press/Repeat event for each held key.
    held: HashMap<KeyCode, KeyHold>,

    /// Keys that went "not held" → "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Keys that went "held" → "not held" during the last drain.
    fresh_releases: Vec<KeyCode>,

    /// Mouse activity from the last drain, in arrival order.
    pub pointer: Vec<Pointer>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            fresh_releases: Vec::with_capacity(8),
            pointer: Vec::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.handle(ev, Instant::now()),
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }

        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.fresh_releases.clear();
        self.pointer.clear();
        self.raw_events.clear();
    }

    fn handle(&mut self, ev: Event, now: Instant) {
        match ev {
            Event::Key(key) => {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        if self.held.remove(&key.code).is_some() {
                            self.fresh_releases.push(key.code);
                        }
                    }
                    KeyEventKind::Release => {
                        // Rely on timeout-based expiry instead
                    }
                    _ => {
                        let was_held = self.held.get(&key.code).is_some_and(|h| h.alive(now));
                        self.held.insert(key.code, KeyHold { last: now, repeated: was_held });
                        if !was_held {
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
            Event::Mouse(m) => {
                let at = (m.column, m.row);
                match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => self.pointer.push(Pointer::Down(at.0, at.1)),
                    MouseEventKind::Drag(MouseButton::Left) => self.pointer.push(Pointer::Drag(at.0, at.1)),
                    MouseEventKind::Up(MouseButton::Left) => self.pointer.push(Pointer::Up(at.0, at.1)),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        let releases = &mut self.fresh_releases;
        self.held.retain(|code, hold| {
            let alive = hold.alive(now);
            if !alive {
                releases.push(*code);
            }
            alive
        });
    }

    /// Is this key currently held down?
    #[cfg(test)]
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains_key(&code)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn was_released(&self, code: KeyCode) -> bool {
        self.fresh_releases.contains(&code)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
