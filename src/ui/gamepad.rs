/// Gamepad input and rumble using gilrs.
///
/// Mapping:
///   A (South)             →  Tap / hold / confirm
///   B (East) / Select     →  Back
///   Start                 →  Confirm
///   D-pad / Left Stick    →  Menu navigation
///
/// Rumble is the haptics backend: pulse sequences are queued with due
/// times and fired from `update()`, so a multi-pulse cue never blocks.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use std::time::Instant;

use crate::domain::cue::{Pulse, PulseStep};
use crate::sim::ports::Haptics;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical buttons the app reads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    Start,
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl Btn {
    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            Button::DPadUp    => Some(Btn::Up),
            Button::DPadDown  => Some(Btn::Down),
            Button::DPadLeft  => Some(Btn::Left),
            Button::DPadRight => Some(Btn::Right),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) plus press/release edges.
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
    just_released: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        if !held && self.held {
            self.just_released = true;
        }
        self.held = held;
    }
}

// ── Rumble queue ──

/// Rumble strength and length for one pulse: (strong, weak, ms).
pub fn rumble_profile(pulse: Pulse) -> (u16, u16, u64) {
    match pulse {
        Pulse::Light => (0, 24_000, 40),
        Pulse::Medium => (28_000, 20_000, 60),
        Pulse::Heavy => (52_000, 30_000, 90),
        Pulse::Success => (36_000, 36_000, 140),
    }
}

/// Pulses waiting for their due time, in milliseconds since the
/// gamepad layer started.
#[derive(Default, Debug)]
pub struct PulseQueue {
    pending: Vec<(u64, Pulse)>,
}

impl PulseQueue {
    pub fn push(&mut self, now_ms: u64, steps: &[PulseStep]) {
        self.pending.extend(steps.iter().map(|s| (now_ms + s.at_ms, s.pulse)));
    }

    /// Remove and return every pulse due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<Pulse> {
        let mut due: Vec<(u64, Pulse)> = Vec::new();
        self.pending.retain(|&(at, pulse)| {
            if at <= now_ms {
                due.push((at, pulse));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(at, _)| at);
        due.into_iter().map(|(_, p)| p).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

// ── Gamepad ──

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    /// Effects stop when dropped; kept until their play time is over.
    #[cfg(feature = "gamepad")]
    effects: Vec<(u64, gilrs::ff::Effect)>,

    buttons: [BtnState; 8],
    stick: [BtnState; 4],
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    rumble: PulseQueue,
    epoch: Instant,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            #[cfg(feature = "gamepad")]
            effects: Vec::new(),
            buttons: [BtnState::default(); 8],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            rumble: PulseQueue::default(),
            epoch: Instant::now(),
            connected,
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Poll events and fire due rumble pulses. Call once per frame.
    pub fn update(&mut self) {
        self.clear_edges();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        let now = self.now_ms();
        for pulse in self.rumble.drain_due(now) {
            self.fire(pulse, now);
        }
        #[cfg(feature = "gamepad")]
        self.effects.retain(|(until, _)| *until > now);
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Stick as digital directions: up, down, left, right
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[0].set(y > STICK_DEADZONE);
        self.stick[1].set(y < -STICK_DEADZONE);
        self.stick[2].set(x < -STICK_DEADZONE);
        self.stick[3].set(x > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn fire(&mut self, pulse: Pulse, now_ms: u64) {
        use gilrs::ff::{BaseEffect, BaseEffectType, EffectBuilder, Replay, Ticks};

        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let ids: Vec<_> = gilrs.gamepads()
            .filter(|(_, pad)| pad.is_ff_supported())
            .map(|(id, _)| id)
            .collect();
        if ids.is_empty() {
            return;
        }

        let (strong, weak, ms) = rumble_profile(pulse);
        let scheduling = Replay { play_for: Ticks::from_ms(ms as u32), ..Default::default() };
        let built = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong { magnitude: strong },
                scheduling,
                envelope: Default::default(),
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak { magnitude: weak },
                scheduling,
                envelope: Default::default(),
            })
            .gamepads(&ids)
            .finish(gilrs);

        match built {
            Ok(effect) => match effect.play() {
                Ok(()) => self.effects.push((now_ms + ms, effect)),
                Err(e) => log::warn!("rumble failed: {e}"),
            },
            Err(e) => log::warn!("rumble effect rejected: {e}"),
        }
    }

    #[cfg(not(feature = "gamepad"))]
    fn fire(&mut self, _pulse: Pulse, _now_ms: u64) {}

    // ── Queries ──

    pub fn pressed(&self, btn: Btn) -> bool {
        self.buttons[btn_index(btn)].just_pressed
    }

    pub fn released(&self, btn: Btn) -> bool {
        self.buttons[btn_index(btn)].just_released
    }

    pub fn confirm_pressed(&self) -> bool {
        self.pressed(Btn::A) || self.pressed(Btn::Start)
    }

    pub fn back_pressed(&self) -> bool {
        self.pressed(Btn::B) || self.pressed(Btn::Select)
    }

    /// Menu direction edge from the d-pad or stick: (dx, dy).
    pub fn nav_pressed(&self) -> Option<(i32, i32)> {
        let dir = |b: Btn, s: usize| self.pressed(b) || self.stick[s].just_pressed;
        if dir(Btn::Up, 0) { return Some((0, -1)); }
        if dir(Btn::Down, 1) { return Some((0, 1)); }
        if dir(Btn::Left, 2) { return Some((-1, 0)); }
        if dir(Btn::Right, 3) { return Some((1, 0)); }
        None
    }

    // ── Internal ──

    fn clear_edges(&mut self) {
        for b in self.buttons.iter_mut().chain(self.stick.iter_mut()) {
            b.just_pressed = false;
            b.just_released = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(self.stick.iter_mut()) {
            b.set(false);
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

impl Haptics for GamepadState {
    fn play(&mut self, steps: &[PulseStep]) {
        if !self.connected {
            return;
        }
        let now = self.now_ms();
        self.rumble.push(now, steps);
    }
}
