/// Swipe activity: waypoint chains.
///
/// A path is a fixed-length chain from the upper-left anchor to the
/// lower-right anchor of the play area, with horizontal jitter and a
/// sinusoidal vertical offset. Exactly one waypoint is active until the
/// whole chain is collected; collection only ever advances by one.

use rand::Rng;

use super::geometry::{full_turn, Point};

pub const PATH_LEN: usize = 8;
/// Drag must come strictly closer than this to collect the active waypoint.
pub const CAPTURE_RADIUS: f64 = 40.0;

const ANCHOR_START: f64 = 0.2;
const ANCHOR_END: f64 = 0.8;
const JITTER_X: f64 = 80.0;
const WAVE_Y: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct Waypoint {
    pub pos: Point,
    pub collected: bool,
    pub active: bool,
}

/// A waypoint just collected by a drag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Collected {
    pub index: usize,
    /// True if this was the final waypoint of the chain.
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct SwipePath {
    pub id: u64,
    pub waypoints: Vec<Waypoint>,
}

impl SwipePath {
    /// Build a fresh chain inside a `width × height` play area.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, id: u64, width: f64, height: f64) -> Self {
        let start = Point::new(width * ANCHOR_START, height * ANCHOR_START);
        let end = Point::new(width * ANCHOR_END, height * ANCHOR_END);

        let waypoints = (0..PATH_LEN)
            .map(|i| {
                let progress = i as f64 / (PATH_LEN - 1) as f64;
                let jitter = (rng.random::<f64>() - 0.5) * JITTER_X;
                let x = start.x + (end.x - start.x) * progress + jitter;
                let y = start.y + (end.y - start.y) * progress
                    + (progress * full_turn()).sin() * WAVE_Y;
                Waypoint { pos: Point::new(x, y), collected: false, active: i == 0 }
            })
            .collect();

        SwipePath { id, waypoints }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.waypoints.iter().position(|w| w.active)
    }

    #[cfg(test)]
    pub fn collected_count(&self) -> usize {
        self.waypoints.iter().filter(|w| w.collected).count()
    }

    pub fn is_finished(&self) -> bool {
        self.waypoints.iter().all(|w| w.collected)
    }

    /// Drag update at `pos`. Collects the active waypoint if the drag is
    /// within `radius`; at most one waypoint per call.
    pub fn try_collect(&mut self, pos: Point, radius: f64) -> Option<Collected> {
        let idx = self.active_index()?;
        if self.waypoints[idx].pos.distance(pos) >= radius {
            return None;
        }

        let wp = &mut self.waypoints[idx];
        wp.collected = true;
        wp.active = false;

        let finished = self.is_finished();
        if !finished {
            self.waypoints[idx + 1].active = true;
        }
        Some(Collected { index: idx, finished })
    }
}
