/// Pull-based presentation snapshot.
///
/// The renderer never reaches into `SessionState`; it asks for an
/// `ActivityView` once per frame and draws that. Everything is in arena
/// units and plain fractions.

use crate::domain::activity::ActivityId;
use crate::domain::geometry::Point;
use crate::domain::mood::MoodId;
use crate::domain::path::Waypoint;
use crate::domain::pattern::Pattern;
use crate::domain::scoring::{hold_progress, TapScore};

use super::clock::BreathPhase;
use super::session::Snapshot;
use super::world::{MiniGame, SessionState};

/// One visible dot: arena position plus opacity.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Sprite {
    pub pos: Point,
    pub opacity: f64,
}

#[derive(Clone, Debug)]
pub enum BodyView<'a> {
    Tap {
        /// 0.0 on a beat, approaching 1.0 before the next.
        beat_phase: f64,
        last: Option<TapScore>,
        particles: Vec<Sprite>,
        shards: Vec<Sprite>,
        /// Combo shown while the milestone explosion is up.
        milestone: Option<u32>,
    },
    Breathe {
        phase: BreathPhase,
        fullness: f64,
    },
    Hold {
        holding: bool,
        progress: f64,
    },
    Draw {
        pattern: Option<&'a Pattern>,
        stroke: &'a [Point],
        similarity: Option<f64>,
    },
    Swipe {
        waypoints: &'a [Waypoint],
    },
}

#[derive(Clone, Debug)]
pub struct ActivityView<'a> {
    pub mood: MoodId,
    pub activity: ActivityId,
    pub remaining_secs: u32,
    /// Elapsed fraction of the session.
    pub progress: f64,
    pub stats: Snapshot,
    pub action_label: &'static str,
    pub feedback: Option<&'static str>,
    pub center: Point,
    pub body: BodyView<'a>,
}

pub fn activity_view(world: &SessionState, now_ms: u64) -> ActivityView<'_> {
    let stats = world.stats.snapshot();
    let center = world.arena.center();

    let body = match &world.game {
        MiniGame::Tap(g) => {
            let particles = g.bursts.iter()
                .flat_map(|b| {
                    let age = now_ms.saturating_sub(b.spawned_ms);
                    b.particles.iter().filter_map(move |p| {
                        p.offset_at(age).map(|off| Sprite {
                            pos: Point::new(center.x + off.x, center.y + off.y),
                            opacity: p.opacity_at(age),
                        })
                    })
                })
                .collect();

            let (shards, milestone) = match &g.explosion {
                Some(e) => {
                    let age = now_ms.saturating_sub(e.spawned_ms);
                    let shards = e.shards.iter()
                        .filter_map(|s| {
                            s.offset_at(age).map(|off| Sprite {
                                pos: Point::new(center.x + off.x, center.y + off.y),
                                opacity: 1.0 - age as f64 / s.duration_ms.max(1) as f64,
                            })
                        })
                        .collect();
                    (shards, Some(e.combo))
                }
                None => (Vec::new(), None),
            };

            BodyView::Tap {
                beat_phase: g.clock.beat_phase(now_ms),
                last: g.last_score,
                particles,
                shards,
                milestone,
            }
        }
        MiniGame::Breathe(g) => BodyView::Breathe {
            phase: g.clock.phase(),
            fullness: g.clock.fullness(now_ms),
        },
        MiniGame::Hold(g) => BodyView::Hold {
            holding: g.held_since.is_some(),
            progress: g.held_since
                .map(|since| hold_progress(now_ms.saturating_sub(since), g.required_ms))
                .unwrap_or(0.0),
        },
        MiniGame::Draw(g) => BodyView::Draw {
            pattern: g.pattern.as_ref(),
            stroke: &g.stroke,
            similarity: g.last_similarity,
        },
        MiniGame::Swipe(g) => BodyView::Swipe {
            waypoints: g.path.as_ref().map(|p| p.waypoints.as_slice()).unwrap_or(&[]),
        },
    };

    ActivityView {
        mood: world.mood,
        activity: world.activity,
        remaining_secs: world.countdown.remaining(),
        progress: world.countdown.progress(),
        stats,
        action_label: world.activity.action_label(stats.action_count),
        feedback: world.feedback.as_ref().map(|f| f.text),
        center,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayConfig;
    use crate::sim::step;
    use crate::sim::world::PlayerAction;

    fn running(mood: MoodId, activity: ActivityId) -> SessionState {
        let mut s = SessionState::seeded(mood, activity, &PlayConfig::default(), 3);
        step::start(&mut s, 0);
        s
    }

    #[test]
    fn header_tracks_countdown_and_actions() {
        let mut s = running(MoodId::Focus, ActivityId::Tap);
        step::step(&mut s, 6000, &[PlayerAction::Tap]);
        let v = activity_view(&s, 6000);
        assert_eq!(v.remaining_secs, 54);
        assert!((v.progress - 0.1).abs() < 1e-9);
        assert_eq!(v.stats.action_count, 1);
        assert_eq!(v.action_label, ActivityId::Tap.action_label(1));
        assert_eq!(v.feedback, Some("Parfait!"));
    }

    #[test]
    fn tap_particles_rise_from_center() {
        let mut s = running(MoodId::Calm, ActivityId::Tap);
        step::step(&mut s, 1200, &[PlayerAction::Tap]);
        let v = activity_view(&s, 1200 + 500);
        match v.body {
            BodyView::Tap { particles, .. } => {
                assert!(!particles.is_empty());
                assert!(particles.iter().all(|p| p.pos.y < v.center.y));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn hold_progress_fills_while_pressed() {
        let mut s = running(MoodId::Calm, ActivityId::Hold);
        step::step(&mut s, 1000, &[PlayerAction::HoldStart]);
        match activity_view(&s, 3500).body {
            BodyView::Hold { holding, progress } => {
                assert!(holding);
                assert!((progress - 0.5).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn swipe_view_exposes_waypoints() {
        let s = running(MoodId::Love, ActivityId::Swipe);
        match activity_view(&s, 0).body {
            BodyView::Swipe { waypoints } => {
                assert_eq!(waypoints.len(), 8);
                assert!(waypoints[0].active);
            }
            _ => unreachable!(),
        }
    }
}
