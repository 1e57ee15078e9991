/// Capabilities the session talks to: haptics, audio, navigation.
///
/// `step()` only produces events. `dispatch()` is the single place that
/// turns them into device calls, so the frame loop passes real backends
/// and tests pass recorders.

use crate::domain::activity::ActivityId;
use crate::domain::cue::{self, CueKind, PulseStep, ToneStep};
use crate::domain::mood::MoodId;

use super::event::GameEvent;

/// Drone level relative to the master volume.
const AMBIENT_GAIN: f32 = 0.05;

/// Screens the app can move to.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    MoodPicker,
    ActivityPicker { mood: MoodId },
    Activity { mood: MoodId, activity: ActivityId },
    Result { mood: MoodId, quote: String, activity: ActivityId },
}

pub trait Haptics {
    fn play(&mut self, steps: &[PulseStep]);
}

pub trait Audio {
    fn play(&mut self, steps: &[ToneStep], volume: f32);

    /// Start the quiet background drone; replaces any running one.
    fn ambient(&mut self, _freqs: [f32; 3], _volume: f32) {}

    fn stop_ambient(&mut self) {}
}

pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Borrowed backends for one dispatch call.
pub struct Ports<'a> {
    pub haptics: &'a mut dyn Haptics,
    pub audio: &'a mut dyn Audio,
    pub nav: &'a mut dyn Navigator,
    pub volume: f32,
}

/// Route step events to the devices.
pub fn dispatch(events: &[GameEvent], mood: MoodId, ports: &mut Ports<'_>) {
    for event in events {
        match event {
            GameEvent::Started { mood, .. } => {
                ports.audio.ambient(cue::ambient(*mood), ports.volume * AMBIENT_GAIN);
            }
            GameEvent::Action => {
                ports.haptics.play(&cue::haptics(mood, CueKind::Tap));
                ports.audio.play(&cue::tones(mood, CueKind::Tap), ports.volume);
            }
            GameEvent::Completed { mood, activity, quote } => {
                ports.audio.stop_ambient();
                ports.haptics.play(&cue::haptics(*mood, CueKind::Complete));
                ports.audio.play(&cue::tones(*mood, CueKind::Complete), ports.volume);
                ports.nav.navigate(Route::Result {
                    mood: *mood,
                    quote: quote.clone(),
                    activity: *activity,
                });
            }
            _ => {}
        }
    }
}

// ── No-op backends ──

/// Silent, still backend for disabled devices.
#[derive(Default)]
pub struct NullDevice;

impl Haptics for NullDevice {
    fn play(&mut self, _steps: &[PulseStep]) {}
}

impl Audio for NullDevice {
    fn play(&mut self, _steps: &[ToneStep], _volume: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayConfig;
    use crate::domain::cue::Pulse;
    use crate::sim::step;
    use crate::sim::world::{PlayerAction, SessionState};

    #[derive(Default)]
    struct Recorder {
        pulses: Vec<Vec<PulseStep>>,
        tones: Vec<Vec<ToneStep>>,
        ambient: Vec<[f32; 3]>,
        ambient_stopped: usize,
    }

    impl Haptics for Recorder {
        fn play(&mut self, steps: &[PulseStep]) {
            self.pulses.push(steps.to_vec());
        }
    }

    impl Audio for Recorder {
        fn play(&mut self, steps: &[ToneStep], _volume: f32) {
            self.tones.push(steps.to_vec());
        }
        fn ambient(&mut self, freqs: [f32; 3], _volume: f32) {
            self.ambient.push(freqs);
        }
        fn stop_ambient(&mut self) {
            self.ambient_stopped += 1;
        }
    }

    #[derive(Default)]
    struct RouteLog(Vec<Route>);

    impl Navigator for RouteLog {
        fn navigate(&mut self, route: Route) {
            self.0.push(route);
        }
    }

    fn run(events: &[GameEvent], mood: MoodId) -> (Recorder, Recorder, RouteLog) {
        let mut haptics = Recorder::default();
        let mut audio = Recorder::default();
        let mut nav = RouteLog::default();
        let mut ports = Ports { haptics: &mut haptics, audio: &mut audio, nav: &mut nav, volume: 0.5 };
        dispatch(events, mood, &mut ports);
        (haptics, audio, nav)
    }

    #[test]
    fn action_plays_mood_tap_cue() {
        let (h, a, nav) = run(&[GameEvent::Action], MoodId::Energy);
        assert_eq!(h.pulses, vec![cue::haptics(MoodId::Energy, CueKind::Tap)]);
        assert_eq!(a.tones, vec![cue::tones(MoodId::Energy, CueKind::Tap)]);
        assert!(nav.0.is_empty());
    }

    #[test]
    fn completion_navigates_to_result_once() {
        let mut s = SessionState::seeded(
            MoodId::Love,
            ActivityId::Hold,
            &PlayConfig { capture_radius: 40.0, session_seconds: 2 },
            5,
        );
        let mut all = step::start(&mut s, 0);
        all.extend(step::step(&mut s, 1000, &[PlayerAction::HoldStart]));
        all.extend(step::step(&mut s, 5000, &[PlayerAction::HoldEnd]));
        all.extend(step::step(&mut s, 9000, &[]));

        let (h, a, nav) = run(&all, MoodId::Love);
        assert_eq!(a.ambient, vec![cue::ambient(MoodId::Love)]);
        assert_eq!(a.ambient_stopped, 1);
        assert_eq!(h.pulses.len(), 1);
        assert_eq!(h.pulses[0][0].pulse, Pulse::Medium);
        assert_eq!(nav.0.len(), 1);
        match &nav.0[0] {
            Route::Result { mood, quote, activity } => {
                assert_eq!(*mood, MoodId::Love);
                assert_eq!(*activity, ActivityId::Hold);
                assert_eq!(Some(quote), s.quote.as_ref());
            }
            other => panic!("unexpected route {other:?}"),
        }
    }

    #[test]
    fn quiet_events_touch_nothing() {
        let (h, a, nav) = run(
            &[GameEvent::Beat { at_ms: 600 }, GameEvent::CountdownTick { remaining: 3 }],
            MoodId::Calm,
        );
        assert!(h.pulses.is_empty());
        assert!(a.tones.is_empty());
        assert!(nav.0.is_empty());
    }
}
