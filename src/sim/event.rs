/// Events emitted during a simulation step.
/// The presentation layer consumes these for feedback, sound and routing.

use crate::domain::activity::ActivityId;
use crate::domain::mood::MoodId;
use crate::domain::pattern::ShapeKind;
use crate::domain::scoring::{DrawGrade, TapScore};

use super::clock::BreathPhase;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Session went Idle → Running.
    Started { mood: MoodId, activity: ActivityId },
    /// Visual beat pulse; `at_ms` is the expected boundary time.
    Beat { at_ms: u64 },
    CountdownTick { remaining: u32 },
    PhaseChanged { phase: BreathPhase },
    BreathCycle { cycles: u32 },
    TapScored(TapScore),
    ComboMilestone { combo: u32 },
    HoldStarted,
    HoldReleased { held_ms: u64, success: bool },
    StrokeScored { similarity: f64, grade: DrawGrade, points: u32 },
    PatternSpawned { kind: ShapeKind },
    WaypointCollected { index: usize, finished: bool },
    PathSpawned,
    /// A user action the mood "tap" cue responds to.
    Action,
    /// Session went Running → Completed. Emitted exactly once.
    Completed { mood: MoodId, activity: ActivityId, quote: String },
}
