/// SessionState: everything one running activity owns.
///
/// Created when the activity screen opens, dropped when it closes.
/// Dropping the state is the teardown: clocks, scheduled callbacks and
/// effects all live inside it, so nothing can fire for a closed screen.
///
/// ## Lifecycle
///
///   Idle ──start()──▶ Running ──countdown hits 0──▶ Completed
///
/// Completed is terminal: `step()` returns no events and mutates nothing.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::PlayConfig;
use crate::domain::activity::ActivityId;
use crate::domain::geometry::Point;
use crate::domain::mood::MoodId;
use crate::domain::particle::{ParticleSpec, ShardSpec};
use crate::domain::path::SwipePath;
use crate::domain::pattern::Pattern;
use crate::domain::scoring::TapScore;

use super::clock::{BeatClock, Countdown, PhaseClock};
use super::scheduler::Scheduler;
use super::session::Accumulator;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// Logical play area. Geometry (paths, patterns, capture radius) is in
/// these units; the renderer scales them to the terminal.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub const DEFAULT: Arena = Arena { width: 400.0, height: 700.0 };

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// One discrete user gesture, delivered in order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlayerAction {
    Tap,
    HoldStart,
    HoldEnd,
    /// Pointer pressed / moved / released in arena units.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
}

/// Short-lived feedback text ("Parfait!", "Complete!").
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub text: &'static str,
    pub at_ms: u64,
    pub fade_ms: u64,
}

/// Particles from one tap.
#[derive(Clone, Debug)]
pub struct Burst {
    pub spawned_ms: u64,
    pub particles: Vec<ParticleSpec>,
}

impl Burst {
    pub fn expires_ms(&self) -> u64 {
        self.spawned_ms
            + self.particles.iter()
                .map(|p| p.delay_ms + p.lifetime_ms)
                .max()
                .unwrap_or(0)
    }
}

/// Combo milestone explosion.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub spawned_ms: u64,
    pub combo: u32,
    pub shards: Vec<ShardSpec>,
}

impl Explosion {
    pub const SHOW_MS: u64 = 1000;
}

// ── Per-activity state ──

#[derive(Clone, Debug)]
pub struct TapGame {
    pub clock: BeatClock,
    pub last_score: Option<TapScore>,
    pub bursts: Vec<Burst>,
    pub explosion: Option<Explosion>,
}

#[derive(Clone, Debug)]
pub struct BreatheGame {
    pub clock: PhaseClock,
}

#[derive(Clone, Debug)]
pub struct HoldGame {
    pub required_ms: u64,
    /// Press start while a hold is in progress.
    pub held_since: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DrawGame {
    /// `None` between a completed pattern and its replacement.
    pub pattern: Option<Pattern>,
    pub stroke: Vec<Point>,
    pub drawing: bool,
    pub last_similarity: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct SwipeGame {
    pub path: Option<SwipePath>,
    pub dragging: bool,
}

#[derive(Clone, Debug)]
pub enum MiniGame {
    Tap(TapGame),
    Breathe(BreatheGame),
    Hold(HoldGame),
    Draw(DrawGame),
    Swipe(SwipeGame),
}

impl MiniGame {
    pub fn new(activity: ActivityId, mood: MoodId) -> Self {
        match activity {
            ActivityId::Tap => MiniGame::Tap(TapGame {
                clock: BeatClock::new(mood.beat_interval_ms()),
                last_score: None,
                bursts: Vec::new(),
                explosion: None,
            }),
            ActivityId::Breathe => {
                let b = mood.breath();
                MiniGame::Breathe(BreatheGame { clock: PhaseClock::new(b.inhale_ms, b.exhale_ms) })
            }
            ActivityId::Hold => MiniGame::Hold(HoldGame {
                required_ms: mood.hold_required_ms(),
                held_since: None,
            }),
            ActivityId::Draw => MiniGame::Draw(DrawGame {
                pattern: None,
                stroke: Vec::new(),
                drawing: false,
                last_similarity: None,
            }),
            ActivityId::Swipe => MiniGame::Swipe(SwipeGame { path: None, dragging: false }),
        }
    }

    /// Next clock boundary owned by the game itself.
    pub fn next_due(&self) -> Option<u64> {
        match self {
            MiniGame::Tap(g) => g.clock.next_due(),
            MiniGame::Breathe(g) => g.clock.next_due(),
            _ => None,
        }
    }

    /// Stop every clock and drop in-progress gestures.
    pub fn halt(&mut self) {
        match self {
            MiniGame::Tap(g) => g.clock.stop(),
            MiniGame::Breathe(g) => g.clock.stop(),
            MiniGame::Hold(g) => g.held_since = None,
            MiniGame::Draw(g) => {
                g.stroke.clear();
                g.drawing = false;
            }
            MiniGame::Swipe(g) => g.dragging = false,
        }
    }
}

// ── Session ──

pub struct SessionState {
    pub mood: MoodId,
    pub activity: ActivityId,
    pub phase: Phase,
    pub countdown: Countdown,
    pub stats: Accumulator,
    pub game: MiniGame,
    pub scheduler: Scheduler,
    pub arena: Arena,
    pub capture_radius: f64,
    pub feedback: Option<Feedback>,
    /// Set once, on completion.
    pub quote: Option<String>,
    pub rng: StdRng,
    next_id: u64,
}

impl SessionState {
    pub fn new(mood: MoodId, activity: ActivityId, play: &PlayConfig) -> Self {
        Self::with_rng(mood, activity, play, StdRng::from_os_rng())
    }

    /// Deterministic session for tests and replays.
    pub fn seeded(mood: MoodId, activity: ActivityId, play: &PlayConfig, seed: u64) -> Self {
        Self::with_rng(mood, activity, play, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mood: MoodId, activity: ActivityId, play: &PlayConfig, rng: StdRng) -> Self {
        let duration = if play.session_seconds > 0 {
            play.session_seconds
        } else {
            activity.info().duration_secs
        };
        SessionState {
            mood,
            activity,
            phase: Phase::Idle,
            countdown: Countdown::new(duration),
            stats: Accumulator::new(),
            game: MiniGame::new(activity, mood),
            scheduler: Scheduler::new(),
            arena: Arena::DEFAULT,
            capture_radius: play.capture_radius,
            feedback: None,
            quote: None,
            rng,
            next_id: 1,
        }
    }

    /// Fresh id for patterns, paths and particles.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reserve a block of `n` consecutive ids; returns the first.
    pub fn reserve_ids(&mut self, n: usize) -> u64 {
        let first = self.next_id;
        self.next_id += n as u64;
        first
    }

    pub fn set_feedback(&mut self, text: &'static str, now_ms: u64, fade_ms: u64) {
        self.feedback = Some(Feedback { text, at_ms: now_ms, fade_ms });
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}
