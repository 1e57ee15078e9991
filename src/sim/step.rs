/// The step function: advances a session to `now` and applies input.
///
/// Processing order:
///   1. Timers, in chronological order across every source
///      (game clock → scheduler → countdown on equal timestamps)
///   2. Countdown reaching zero completes the session and stops here
///   3. Player actions, in delivery order
///   4. Expired effects (particles, feedback text) are pruned
///
/// After completion nothing is processed: `step` returns no events.

use crate::domain::activity::ActivityId;
use crate::domain::particle::{burst_count, explosion, tap_burst};
use crate::domain::path::SwipePath;
use crate::domain::pattern::{random_pattern, PATTERN_SIZE};
use crate::domain::quote::pick_quote;
use crate::domain::scoring::{
    self, evaluate_tap, hold_succeeds, is_combo_milestone, milestone_burst, DrawGrade,
    BREATH_CYCLE_POINTS, HOLD_POINTS, WAYPOINT_POINTS,
};
use super::event::GameEvent;
use super::scheduler::Delayed;
use super::session::ComboDelta;
use super::world::{Burst, Explosion, MiniGame, Phase, PlayerAction, SessionState};

/// Delay before a fully collected path is replaced.
pub const PATH_REGEN_MS: u64 = 1000;
/// Delay before a completed pattern is replaced.
pub const PATTERN_REGEN_MS: u64 = 800;

const FEEDBACK_SHORT_MS: u64 = 400;
const FEEDBACK_LONG_MS: u64 = 700;

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

/// Idle → Running: start every clock and lay out the first target.
pub fn start(world: &mut SessionState, now_ms: u64) -> Vec<GameEvent> {
    if world.phase != Phase::Idle {
        return vec![];
    }
    let mut events = vec![GameEvent::Started { mood: world.mood, activity: world.activity }];

    world.phase = Phase::Running;
    world.stats.reset();
    world.countdown.start(now_ms);

    match &mut world.game {
        MiniGame::Tap(g) => g.clock.start(now_ms),
        MiniGame::Breathe(g) => g.clock.start(now_ms),
        _ => {}
    }
    match world.activity {
        ActivityId::Draw => spawn_pattern(world, &mut events),
        ActivityId::Swipe => spawn_path(world, &mut events),
        _ => {}
    }

    log::debug!(
        "session started: {} / {} for {}s",
        world.mood.as_str(), world.activity.as_str(), world.countdown.duration_secs,
    );
    events
}

pub fn step(world: &mut SessionState, now_ms: u64, actions: &[PlayerAction]) -> Vec<GameEvent> {
    if world.phase != Phase::Running {
        return vec![];
    }
    let mut events = Vec::new();

    resolve_timers(world, now_ms, &mut events);
    if world.phase != Phase::Running {
        return events;
    }

    for &action in actions {
        resolve_action(world, now_ms, action, &mut events);
    }

    prune_effects(world, now_ms);
    events
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Declaration order is the tie-break order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum TimerSource {
    Game,
    Scheduler,
    Countdown,
}

fn next_timer(world: &SessionState, now_ms: u64) -> Option<(u64, TimerSource)> {
    [
        (world.game.next_due(), TimerSource::Game),
        (world.scheduler.next_due(), TimerSource::Scheduler),
        (world.countdown.next_due(), TimerSource::Countdown),
    ]
    .into_iter()
    .filter_map(|(due, src)| due.filter(|d| *d <= now_ms).map(|d| (d, src)))
    .min()
}

fn resolve_timers(world: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    while let Some((due, source)) = next_timer(world, now_ms) {
        match source {
            TimerSource::Game => fire_game_clock(world, events),
            TimerSource::Scheduler => {
                if let Some(action) = world.scheduler.pop_due(due) {
                    fire_delayed(world, action, events);
                }
            }
            TimerSource::Countdown => {
                if let Some(remaining) = world.countdown.fire() {
                    events.push(GameEvent::CountdownTick { remaining });
                    if remaining == 0 {
                        complete(world, events);
                        return;
                    }
                }
            }
        }
    }
}

fn fire_game_clock(world: &mut SessionState, events: &mut Vec<GameEvent>) {
    match &mut world.game {
        MiniGame::Tap(g) => {
            if let Some(at_ms) = g.clock.fire() {
                events.push(GameEvent::Beat { at_ms });
            }
        }
        MiniGame::Breathe(g) => {
            let Some(flip) = g.clock.fire() else { return };
            events.push(GameEvent::PhaseChanged { phase: flip.phase });
            if flip.cycle_done {
                world.stats.register_action(BREATH_CYCLE_POINTS, ComboDelta::Keep);
                world.stats.complete_unit();
                let cycles = world.stats.snapshot().completed_units;
                events.push(GameEvent::BreathCycle { cycles });
                events.push(GameEvent::Action);
            }
        }
        _ => {}
    }
}

fn fire_delayed(world: &mut SessionState, action: Delayed, events: &mut Vec<GameEvent>) {
    match action {
        Delayed::RegeneratePath => spawn_path(world, events),
        Delayed::RegeneratePattern => spawn_pattern(world, events),
    }
}

/// Running → Completed. Stops every clock, drops pending callbacks and
/// draws the closing quote.
fn complete(world: &mut SessionState, events: &mut Vec<GameEvent>) {
    world.phase = Phase::Completed;
    world.countdown.stop();
    world.game.halt();
    world.scheduler.cancel_all();

    let quote = pick_quote(&mut world.rng, world.mood);
    world.quote = Some(quote.clone());

    let snap = world.stats.snapshot();
    log::debug!(
        "session completed: score {} after {} actions, {} units",
        snap.score, snap.action_count, snap.completed_units,
    );
    events.push(GameEvent::Completed { mood: world.mood, activity: world.activity, quote });
}

// ══════════════════════════════════════════════════════════════
// Targets
// ══════════════════════════════════════════════════════════════

fn spawn_pattern(world: &mut SessionState, events: &mut Vec<GameEvent>) {
    let id = world.next_id();
    let center = world.arena.center();
    let pattern = random_pattern(&mut world.rng, id, center, PATTERN_SIZE);
    events.push(GameEvent::PatternSpawned { kind: pattern.kind });
    if let MiniGame::Draw(g) = &mut world.game {
        g.pattern = Some(pattern);
        g.stroke.clear();
        g.drawing = false;
    }
}

fn spawn_path(world: &mut SessionState, events: &mut Vec<GameEvent>) {
    let id = world.next_id();
    let arena = world.arena;
    let path = SwipePath::generate(&mut world.rng, id, arena.width, arena.height);
    events.push(GameEvent::PathSpawned);
    if let MiniGame::Swipe(g) = &mut world.game {
        g.path = Some(path);
    }
}

// ══════════════════════════════════════════════════════════════
// Actions
// ══════════════════════════════════════════════════════════════

fn resolve_action(world: &mut SessionState, now_ms: u64, action: PlayerAction, events: &mut Vec<GameEvent>) {
    match (world.activity, action) {
        (ActivityId::Tap, PlayerAction::Tap) => resolve_tap(world, now_ms, events),
        (ActivityId::Hold, PlayerAction::HoldStart) => resolve_hold_start(world, now_ms, events),
        (ActivityId::Hold, PlayerAction::HoldEnd) => resolve_hold_end(world, now_ms, events),
        (ActivityId::Draw, _) => resolve_draw(world, now_ms, action, events),
        (ActivityId::Swipe, _) => resolve_swipe(world, now_ms, action, events),
        _ => {}
    }
}

// ── Tap ──

fn resolve_tap(world: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    let first_id = world.reserve_ids(burst_count(world.mood));
    let particles = tap_burst(&mut world.rng, world.mood, first_id);
    let combo_before = world.stats.combo();

    let MiniGame::Tap(g) = &mut world.game else { return };
    let expected = g.clock.nearest_boundary(now_ms);
    let score = evaluate_tap(now_ms, expected, g.clock.interval_ms, combo_before);
    g.last_score = Some(score);
    g.bursts.push(Burst { spawned_ms: now_ms, particles });

    if is_combo_milestone(score.combo) {
        let (intensity, count) = milestone_burst(score.combo);
        g.explosion = Some(Explosion {
            spawned_ms: now_ms,
            combo: score.combo,
            shards: explosion(&mut world.rng, intensity, count),
        });
        events.push(GameEvent::ComboMilestone { combo: score.combo });
    }

    let delta = if score.tier.keeps_combo() { ComboDelta::Increment } else { ComboDelta::Reset };
    world.stats.register_action(score.points, delta);
    world.set_feedback(score.tier.feedback_text(), now_ms, FEEDBACK_SHORT_MS);
    events.push(GameEvent::TapScored(score));
    events.push(GameEvent::Action);
}

// ── Hold ──

fn resolve_hold_start(world: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    let MiniGame::Hold(g) = &mut world.game else { return };
    if g.held_since.is_none() {
        g.held_since = Some(now_ms);
        events.push(GameEvent::HoldStarted);
    }
}

fn resolve_hold_end(world: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    let MiniGame::Hold(g) = &mut world.game else { return };
    let Some(since) = g.held_since.take() else { return };
    let held_ms = now_ms.saturating_sub(since);
    let success = hold_succeeds(held_ms, g.required_ms);

    events.push(GameEvent::HoldReleased { held_ms, success });
    if success {
        world.stats.register_action(HOLD_POINTS, ComboDelta::Keep);
        world.stats.complete_unit();
        events.push(GameEvent::Action);
    }
}

// ── Draw ──

fn resolve_draw(world: &mut SessionState, now_ms: u64, action: PlayerAction, events: &mut Vec<GameEvent>) {
    let MiniGame::Draw(g) = &mut world.game else { return };
    match action {
        PlayerAction::PointerDown(p) => {
            if g.pattern.is_some() {
                g.drawing = true;
                g.stroke.clear();
                g.stroke.push(p);
            }
        }
        PlayerAction::PointerMove(p) => {
            if g.drawing {
                g.stroke.push(p);
            }
        }
        PlayerAction::PointerUp => {
            if !g.drawing {
                return;
            }
            g.drawing = false;
            let stroke = std::mem::take(&mut g.stroke);
            let Some(pattern) = g.pattern.as_ref() else { return };
            if stroke.is_empty() {
                return;
            }

            let similarity = pattern.trace_similarity(&stroke);
            let grade = DrawGrade::from_similarity(similarity);
            let points = scoring::draw_points(similarity);
            g.last_similarity = Some(similarity);

            world.stats.register_action(points, ComboDelta::Keep);
            if grade == DrawGrade::Excellent {
                g.pattern = None;
                world.stats.complete_unit();
                world.scheduler.schedule(now_ms + PATTERN_REGEN_MS, Delayed::RegeneratePattern);
            }
            world.set_feedback(grade.feedback_text(), now_ms, FEEDBACK_LONG_MS);
            events.push(GameEvent::StrokeScored { similarity, grade, points });
            events.push(GameEvent::Action);
        }
        _ => {}
    }
}

// ── Swipe ──

fn resolve_swipe(world: &mut SessionState, now_ms: u64, action: PlayerAction, events: &mut Vec<GameEvent>) {
    let radius = world.capture_radius;
    let MiniGame::Swipe(g) = &mut world.game else { return };
    match action {
        PlayerAction::PointerDown(p) | PlayerAction::PointerMove(p) => {
            g.dragging = true;
            let Some(path) = g.path.as_mut() else { return };
            let Some(got) = path.try_collect(p, radius) else { return };

            world.stats.award(WAYPOINT_POINTS);
            world.stats.complete_unit();
            events.push(GameEvent::WaypointCollected { index: got.index, finished: got.finished });
            if got.finished {
                world.scheduler.schedule(now_ms + PATH_REGEN_MS, Delayed::RegeneratePath);
                world.set_feedback("Complete!", now_ms, FEEDBACK_LONG_MS);
            } else {
                world.set_feedback("Parfait!", now_ms, FEEDBACK_SHORT_MS);
            }
        }
        PlayerAction::PointerUp => {
            if g.dragging {
                g.dragging = false;
                world.stats.register_action(0, ComboDelta::Keep);
                events.push(GameEvent::Action);
            }
        }
        _ => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Effects
// ══════════════════════════════════════════════════════════════

fn prune_effects(world: &mut SessionState, now_ms: u64) {
    if let Some(f) = &world.feedback {
        if now_ms >= f.at_ms + f.fade_ms {
            world.feedback = None;
        }
    }
    if let MiniGame::Tap(g) = &mut world.game {
        g.bursts.retain(|b| b.expires_ms() > now_ms);
        if let Some(e) = &g.explosion {
            if now_ms >= e.spawned_ms + Explosion::SHOW_MS {
                g.explosion = None;
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayConfig;
    use crate::domain::activity::ActivityId;
    use crate::domain::mood::MoodId;
    use crate::domain::scoring::Tier;
    use crate::sim::clock::BreathPhase;

    fn play(secs: u32) -> PlayConfig {
        PlayConfig { capture_radius: 40.0, session_seconds: secs }
    }

    fn session(mood: MoodId, activity: ActivityId, secs: u32) -> SessionState {
        let mut s = SessionState::seeded(mood, activity, &play(secs), 99);
        start(&mut s, 0);
        s
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    fn is_completed(e: &GameEvent) -> bool {
        matches!(e, GameEvent::Completed { .. })
    }

    // ── Lifecycle ──

    #[test]
    fn start_only_once() {
        let mut s = SessionState::seeded(MoodId::Calm, ActivityId::Tap, &play(5), 1);
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(start(&mut s, 0).len(), 1);
        assert_eq!(s.phase, Phase::Running);
        assert!(start(&mut s, 10).is_empty());
    }

    #[test]
    fn idle_session_ignores_steps() {
        let mut s = SessionState::seeded(MoodId::Calm, ActivityId::Tap, &play(5), 1);
        assert!(step(&mut s, 5000, &[PlayerAction::Tap]).is_empty());
        assert_eq!(s.stats.snapshot().action_count, 0);
    }

    #[test]
    fn countdown_completes_exactly_once() {
        let mut s = session(MoodId::Focus, ActivityId::Hold, 3);
        let mut completions = 0;
        for t in 1..=3 {
            let ev = step(&mut s, t * 1000, &[]);
            completions += count(&ev, is_completed);
            assert_eq!(s.countdown.remaining(), 3 - t as u32);
        }
        assert_eq!(completions, 1);
        assert_eq!(s.phase, Phase::Completed);
        assert!(s.quote.is_some());
        for t in 4..10 {
            assert!(step(&mut s, t * 1000, &[]).is_empty());
        }
        assert_eq!(s.countdown.remaining(), 0);
    }

    #[test]
    fn late_frame_catches_up_and_completes_once() {
        let mut s = session(MoodId::Calm, ActivityId::Breathe, 5);
        let ev = step(&mut s, 60_000, &[]);
        assert_eq!(count(&ev, |e| matches!(e, GameEvent::CountdownTick { .. })), 5);
        assert_eq!(count(&ev, is_completed), 1);
        assert!(matches!(ev.last(), Some(GameEvent::Completed { .. })));
    }

    #[test]
    fn completion_quote_belongs_to_mood() {
        let mut s = session(MoodId::Love, ActivityId::Tap, 1);
        let ev = step(&mut s, 1000, &[]);
        let quote = ev.iter().find_map(|e| match e {
            GameEvent::Completed { quote, mood, .. } => {
                assert_eq!(*mood, MoodId::Love);
                Some(quote.clone())
            }
            _ => None,
        }).unwrap();
        assert!(MoodId::Love.info().quotes.iter().any(|q| *q == quote));
    }

    #[test]
    fn actions_after_completion_are_ignored() {
        let mut s = session(MoodId::Energy, ActivityId::Tap, 1);
        // Completion and a tap in the same frame: the tap is dropped.
        let ev = step(&mut s, 1000, &[PlayerAction::Tap]);
        assert_eq!(count(&ev, is_completed), 1);
        assert_eq!(count(&ev, |e| matches!(e, GameEvent::TapScored(_))), 0);
        assert_eq!(s.stats.snapshot().action_count, 0);
    }

    #[test]
    fn timers_fire_in_chronological_order() {
        let mut s = session(MoodId::Energy, ActivityId::Tap, 60);
        let ev = step(&mut s, 2000, &[]);
        assert_eq!(ev, vec![
            GameEvent::Beat { at_ms: 600 },
            GameEvent::CountdownTick { remaining: 59 },
            GameEvent::Beat { at_ms: 1200 },
            GameEvent::Beat { at_ms: 1800 },
            GameEvent::CountdownTick { remaining: 58 },
        ]);
    }

    // ── Tap ──

    #[test]
    fn tap_on_beat_scores_perfect() {
        let mut s = session(MoodId::Calm, ActivityId::Tap, 60);
        let ev = step(&mut s, 1200, &[PlayerAction::Tap]);
        let score = ev.iter().find_map(|e| match e {
            GameEvent::TapScored(sc) => Some(*sc),
            _ => None,
        }).unwrap();
        assert_eq!(score.tier, Tier::Perfect);
        assert_eq!(score.points, 100);
        assert_eq!(count(&ev, |e| *e == GameEvent::Action), 1);
        assert_eq!(s.stats.snapshot().combo_streak, 1);
        assert_eq!(s.feedback.as_ref().map(|f| f.text), Some("Parfait!"));
    }

    #[test]
    fn combo_multiplies_and_resets() {
        let mut s = session(MoodId::Focus, ActivityId::Tap, 60);
        for k in 1..=4u64 {
            step(&mut s, k * 1000, &[PlayerAction::Tap]);
        }
        let snap = s.stats.snapshot();
        assert_eq!(snap.combo_streak, 4);
        // 100 + 110 + 120 + 130
        assert_eq!(snap.score, 460);

        // 400 ms off a 1000 ms beat → accuracy 60 → Ok, combo reset.
        step(&mut s, 5400, &[PlayerAction::Tap]);
        let snap = s.stats.snapshot();
        assert_eq!(snap.combo_streak, 0);
        assert_eq!(snap.score, 460 + 35); // floor(25 × 1.4)
        assert_eq!(snap.max_combo, 4);
    }

    #[test]
    fn combo_accumulator_matches_evaluator() {
        let mut s = session(MoodId::Dream, ActivityId::Tap, 60);
        let offsets = [0u64, 100, 700, 50, 20, 300, 0];
        for (k, off) in offsets.iter().enumerate() {
            let t = (k as u64 + 1) * 1500 + off;
            let ev = step(&mut s, t, &[PlayerAction::Tap]);
            let score = ev.iter().find_map(|e| match e {
                GameEvent::TapScored(sc) => Some(*sc),
                _ => None,
            }).unwrap();
            assert_eq!(score.combo, s.stats.snapshot().combo_streak);
            if score.tier.keeps_combo() {
                assert!(score.combo > 0);
            } else {
                assert_eq!(score.combo, 0);
            }
        }
    }

    #[test]
    fn fifth_perfect_tap_explodes() {
        let mut s = session(MoodId::Energy, ActivityId::Tap, 60);
        let mut milestones = 0;
        for k in 1..=5u64 {
            let ev = step(&mut s, k * 600, &[PlayerAction::Tap]);
            milestones += count(&ev, |e| matches!(e, GameEvent::ComboMilestone { combo: 5 }));
        }
        assert_eq!(milestones, 1);
        match &s.game {
            MiniGame::Tap(g) => {
                let e = g.explosion.as_ref().unwrap();
                assert_eq!(e.shards.len(), 25);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn tap_particles_expire() {
        let mut s = session(MoodId::Energy, ActivityId::Tap, 60);
        step(&mut s, 600, &[PlayerAction::Tap]);
        match &s.game {
            MiniGame::Tap(g) => assert_eq!(g.bursts[0].particles.len(), 12),
            _ => unreachable!(),
        }
        // 11 × 30 ms stagger + 1000 ms lifetime
        step(&mut s, 600 + 1330, &[]);
        match &s.game {
            MiniGame::Tap(g) => assert!(g.bursts.is_empty()),
            _ => unreachable!(),
        }
    }

    // ── Breathe ──

    #[test]
    fn breath_cycle_awards_once_per_inhale_exhale() {
        let mut s = session(MoodId::Calm, ActivityId::Breathe, 90);
        let ev = step(&mut s, 4000, &[]);
        assert!(ev.contains(&GameEvent::PhaseChanged { phase: BreathPhase::Exhale }));
        assert_eq!(s.stats.snapshot().completed_units, 0);

        step(&mut s, 9999, &[]);
        assert_eq!(s.stats.snapshot().completed_units, 0);

        let ev = step(&mut s, 10_000, &[]);
        assert!(ev.contains(&GameEvent::BreathCycle { cycles: 1 }));
        let snap = s.stats.snapshot();
        assert_eq!(snap.score, 50);
        assert_eq!(snap.action_count, 1);

        step(&mut s, 30_000, &[]);
        let snap = s.stats.snapshot();
        assert_eq!(snap.completed_units, 3);
        assert_eq!(snap.score, 150);
    }

    // ── Hold ──

    #[test]
    fn hold_of_exact_duration_succeeds() {
        let mut s = session(MoodId::Calm, ActivityId::Hold, 60);
        step(&mut s, 1000, &[PlayerAction::HoldStart]);
        let ev = step(&mut s, 6000, &[PlayerAction::HoldEnd]);
        assert!(ev.contains(&GameEvent::HoldReleased { held_ms: 5000, success: true }));
        let snap = s.stats.snapshot();
        assert_eq!(snap.score, 200);
        assert_eq!(snap.completed_units, 1);
        assert_eq!(snap.action_count, 1);
    }

    #[test]
    fn hold_released_at_98_percent_fails() {
        let mut s = session(MoodId::Calm, ActivityId::Hold, 60);
        step(&mut s, 1000, &[PlayerAction::HoldStart]);
        let ev = step(&mut s, 1000 + 4900, &[PlayerAction::HoldEnd]);
        assert!(ev.contains(&GameEvent::HoldReleased { held_ms: 4900, success: false }));
        assert_eq!(count(&ev, |e| *e == GameEvent::Action), 0);
        let snap = s.stats.snapshot();
        assert_eq!(snap.score, 0);
        assert_eq!(snap.completed_units, 0);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut s = session(MoodId::Energy, ActivityId::Hold, 60);
        assert!(step(&mut s, 500, &[PlayerAction::HoldEnd]).is_empty());
        // Repeated press keeps the first start time.
        step(&mut s, 1000, &[PlayerAction::HoldStart]);
        step(&mut s, 2000, &[PlayerAction::HoldStart]);
        let ev = step(&mut s, 4000, &[PlayerAction::HoldEnd]);
        assert!(ev.contains(&GameEvent::HoldReleased { held_ms: 3000, success: true }));
    }

    #[test]
    fn hold_in_progress_is_dropped_on_completion() {
        let mut s = session(MoodId::Energy, ActivityId::Hold, 2);
        step(&mut s, 100, &[PlayerAction::HoldStart]);
        step(&mut s, 2000, &[]);
        assert_eq!(s.phase, Phase::Completed);
        match &s.game {
            MiniGame::Hold(g) => assert!(g.held_since.is_none()),
            _ => unreachable!(),
        }
    }

    // ── Swipe ──

    fn active_waypoint(s: &SessionState) -> Option<crate::domain::geometry::Point> {
        match &s.game {
            MiniGame::Swipe(g) => {
                let path = g.path.as_ref()?;
                path.active_index().map(|i| path.waypoints[i].pos)
            }
            _ => None,
        }
    }

    #[test]
    fn swipe_collects_in_order_and_regenerates() {
        let mut s = session(MoodId::Love, ActivityId::Swipe, 60);
        let mut t = 100;
        for i in 0..8 {
            let pos = active_waypoint(&s).unwrap();
            let ev = step(&mut s, t, &[PlayerAction::PointerMove(pos)]);
            assert!(ev.contains(&GameEvent::WaypointCollected { index: i, finished: i == 7 }));
            t += 50;
        }
        assert_eq!(s.stats.snapshot().score, 800);
        assert_eq!(active_waypoint(&s), None);
        assert!(s.scheduler.is_pending(Delayed::RegeneratePath));

        let ev = step(&mut s, t - 50 + PATH_REGEN_MS, &[]);
        assert!(ev.contains(&GameEvent::PathSpawned));
        assert!(active_waypoint(&s).is_some());
        // Score survives the new path.
        assert_eq!(s.stats.snapshot().score, 800);
        assert_eq!(s.stats.snapshot().completed_units, 8);
    }

    #[test]
    fn swipe_drag_end_counts_one_action() {
        let mut s = session(MoodId::Calm, ActivityId::Swipe, 60);
        let far = crate::domain::geometry::Point::new(-1000.0, -1000.0);
        let ev = step(&mut s, 100, &[
            PlayerAction::PointerDown(far),
            PlayerAction::PointerMove(far),
            PlayerAction::PointerUp,
        ]);
        assert_eq!(count(&ev, |e| *e == GameEvent::Action), 1);
        assert_eq!(s.stats.snapshot().action_count, 1);
        assert_eq!(s.stats.snapshot().score, 0);
        // Up without a drag does nothing.
        assert!(step(&mut s, 200, &[PlayerAction::PointerUp]).is_empty());
    }

    #[test]
    fn pending_regeneration_is_cancelled_by_completion() {
        let mut s = session(MoodId::Calm, ActivityId::Swipe, 2);
        let mut t = 1100;
        for _ in 0..8 {
            let pos = active_waypoint(&s).unwrap();
            step(&mut s, t, &[PlayerAction::PointerMove(pos)]);
            t += 10;
        }
        assert!(s.scheduler.is_pending(Delayed::RegeneratePath));
        let ev = step(&mut s, 5000, &[]);
        assert_eq!(count(&ev, is_completed), 1);
        assert_eq!(count(&ev, |e| *e == GameEvent::PathSpawned), 0);
        assert_eq!(s.scheduler.len(), 0);
        assert!(step(&mut s, 9000, &[]).is_empty());
    }

    // ── Draw ──

    #[test]
    fn tracing_the_outline_completes_the_pattern() {
        let mut s = session(MoodId::Dream, ActivityId::Draw, 80);
        let outline = match &s.game {
            MiniGame::Draw(g) => g.pattern.as_ref().unwrap().outline.clone(),
            _ => unreachable!(),
        };
        let mut actions = vec![PlayerAction::PointerDown(outline[0])];
        actions.extend(outline[1..].iter().map(|p| PlayerAction::PointerMove(*p)));
        actions.push(PlayerAction::PointerUp);

        let ev = step(&mut s, 500, &actions);
        let grade = ev.iter().find_map(|e| match e {
            GameEvent::StrokeScored { grade, .. } => Some(*grade),
            _ => None,
        }).unwrap();
        assert_eq!(grade, DrawGrade::Excellent);
        assert_eq!(s.stats.snapshot().completed_units, 1);
        match &s.game {
            MiniGame::Draw(g) => assert!(g.pattern.is_none()),
            _ => unreachable!(),
        }

        let ev = step(&mut s, 500 + PATTERN_REGEN_MS, &[]);
        assert_eq!(count(&ev, |e| matches!(e, GameEvent::PatternSpawned { .. })), 1);
    }

    #[test]
    fn scribble_is_a_miss_and_keeps_the_pattern() {
        let mut s = session(MoodId::Focus, ActivityId::Draw, 80);
        let c = s.arena.center();
        let line: Vec<_> = (0..30)
            .map(|i| crate::domain::geometry::Point::new(c.x - 150.0 + 10.0 * i as f64, c.y + 200.0))
            .collect();
        let mut actions = vec![PlayerAction::PointerDown(line[0])];
        actions.extend(line[1..].iter().map(|p| PlayerAction::PointerMove(*p)));
        actions.push(PlayerAction::PointerUp);

        let ev = step(&mut s, 500, &actions);
        assert_eq!(count(&ev, |e| *e == GameEvent::Action), 1);
        assert_eq!(s.stats.snapshot().completed_units, 0);
        assert!(!s.scheduler.is_pending(Delayed::RegeneratePattern));
        match &s.game {
            MiniGame::Draw(g) => assert!(g.pattern.is_some()),
            _ => unreachable!(),
        }
    }
}
