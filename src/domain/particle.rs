/// Particle parameter generators for tap feedback and combo explosions.
///
/// Only numbers live here: the renderer turns a spec plus elapsed time
/// into a position via `ParticleSpec::offset_at`.

use rand::Rng;

use super::geometry::{full_turn, Point};
use super::mood::MoodId;

/// How a mood's particles move once spawned.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MotionProfile {
    /// Upward travel over `rise_ms`.
    pub rise: f64,
    pub rise_ms: u64,
    /// Horizontal sway amplitude (0 = straight up).
    pub sway: f64,
    /// Delay after spawn before fading, and fade length.
    pub fade_delay_ms: u64,
    pub fade_ms: u64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ParticleSpec {
    pub id: u64,
    /// Horizontal start offset from the burst origin.
    pub x: f64,
    pub delay_ms: u64,
    pub lifetime_ms: u64,
    pub motion: MotionProfile,
}

/// One particle of a combo explosion, flying outward from the centre.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ShardSpec {
    pub angle: f64,
    pub distance: f64,
    pub size: f64,
    pub duration_ms: u64,
}

pub fn burst_count(mood: MoodId) -> usize {
    match mood {
        MoodId::Calm => 6,
        MoodId::Energy => 12,
        MoodId::Dream => 8,
        MoodId::Love => 10,
        MoodId::Focus => 4,
    }
}

fn stagger_ms(mood: MoodId) -> u64 {
    if mood == MoodId::Energy { 30 } else { 50 }
}

pub fn lifetime_ms(mood: MoodId) -> u64 {
    if mood == MoodId::Energy { 1000 } else { 3000 }
}

pub fn motion(mood: MoodId) -> MotionProfile {
    match mood {
        MoodId::Calm => MotionProfile { rise: 150.0, rise_ms: 1800, sway: 0.0, fade_delay_ms: 1000, fade_ms: 800 },
        MoodId::Energy => MotionProfile { rise: 200.0, rise_ms: 800, sway: 60.0, fade_delay_ms: 500, fade_ms: 300 },
        MoodId::Dream => MotionProfile { rise: 120.0, rise_ms: 2500, sway: 60.0, fade_delay_ms: 1500, fade_ms: 1000 },
        MoodId::Love => MotionProfile { rise: 160.0, rise_ms: 1600, sway: 20.0, fade_delay_ms: 1200, fade_ms: 600 },
        MoodId::Focus => MotionProfile { rise: 100.0, rise_ms: 1200, sway: 0.0, fade_delay_ms: 800, fade_ms: 400 },
    }
}

/// Particles spawned by one tap. Ids run from `first_id` upward.
pub fn tap_burst<R: Rng + ?Sized>(rng: &mut R, mood: MoodId, first_id: u64) -> Vec<ParticleSpec> {
    let stagger = stagger_ms(mood);
    let lifetime = lifetime_ms(mood);
    let motion = motion(mood);
    (0..burst_count(mood))
        .map(|i| ParticleSpec {
            id: first_id + i as u64,
            x: (rng.random::<f64>() - 0.5) * 100.0,
            delay_ms: i as u64 * stagger,
            lifetime_ms: lifetime,
            motion,
        })
        .collect()
}

/// Shards for a combo milestone, evenly spaced around the circle.
pub fn explosion<R: Rng + ?Sized>(rng: &mut R, intensity: f64, count: usize) -> Vec<ShardSpec> {
    (0..count)
        .map(|i| ShardSpec {
            angle: i as f64 / count as f64 * full_turn(),
            distance: 50.0 + rng.random::<f64>() * 100.0 * intensity,
            size: 4.0 + rng.random::<f64>() * 8.0 * intensity,
            duration_ms: 500 + (rng.random::<f64>() * 500.0) as u64,
        })
        .collect()
}

impl ParticleSpec {
    /// Offset from the burst origin `age_ms` after the burst, or `None`
    /// before the particle appears or after it has faded out.
    pub fn offset_at(&self, age_ms: u64) -> Option<Point> {
        if age_ms < self.delay_ms || age_ms >= self.delay_ms + self.lifetime_ms {
            return None;
        }
        let t = age_ms - self.delay_ms;
        if t >= self.motion.fade_delay_ms + self.motion.fade_ms {
            return None;
        }
        let rise_t = (t as f64 / self.motion.rise_ms.max(1) as f64).min(1.0);
        // Ease-out quad.
        let eased = 1.0 - (1.0 - rise_t) * (1.0 - rise_t);
        let sway = (rise_t * full_turn()).sin() * self.motion.sway * 0.5;
        Some(Point::new(self.x + sway, -self.motion.rise * eased))
    }

    /// Opacity 1.0 → 0.0 across the fade window.
    pub fn opacity_at(&self, age_ms: u64) -> f64 {
        let t = age_ms.saturating_sub(self.delay_ms);
        if t <= self.motion.fade_delay_ms {
            return 1.0;
        }
        let into_fade = (t - self.motion.fade_delay_ms) as f64;
        (1.0 - into_fade / self.motion.fade_ms.max(1) as f64).max(0.0)
    }
}

impl ShardSpec {
    pub fn offset_at(&self, age_ms: u64) -> Option<Point> {
        if age_ms >= self.duration_ms {
            return None;
        }
        let t = age_ms as f64 / self.duration_ms as f64;
        // Ease-out cubic.
        let eased = 1.0 - (1.0 - t).powi(3);
        Some(Point::new(
            self.angle.cos() * self.distance * eased,
            self.angle.sin() * self.distance * eased,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mood::ALL_MOODS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn burst_size_and_stagger_follow_mood() {
        let mut rng = StdRng::seed_from_u64(5);
        let energy = tap_burst(&mut rng, MoodId::Energy, 100);
        assert_eq!(energy.len(), 12);
        assert_eq!(energy[1].delay_ms, 30);
        assert_eq!(energy[0].lifetime_ms, 1000);
        assert_eq!(energy[11].id, 111);

        let focus = tap_burst(&mut rng, MoodId::Focus, 0);
        assert_eq!(focus.len(), 4);
        assert_eq!(focus[3].delay_ms, 150);
        assert_eq!(focus[0].lifetime_ms, 3000);
    }

    #[test]
    fn burst_spread_is_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        for mood in ALL_MOODS {
            for p in tap_burst(&mut rng, mood, 0) {
                assert!(p.x >= -50.0 && p.x < 50.0);
            }
        }
    }

    #[test]
    fn particle_rises_then_disappears() {
        let mut rng = StdRng::seed_from_u64(2);
        let p = tap_burst(&mut rng, MoodId::Calm, 0)[1];
        assert_eq!(p.offset_at(0), None); // still delayed
        let early = p.offset_at(p.delay_ms + 100).unwrap();
        let later = p.offset_at(p.delay_ms + 1500).unwrap();
        assert!(later.y < early.y);
        assert_eq!(p.offset_at(p.delay_ms + p.lifetime_ms), None);
        assert_eq!(p.opacity_at(p.delay_ms), 1.0);
        assert_eq!(p.opacity_at(p.delay_ms + 1800), 0.0);
    }

    #[test]
    fn explosion_shards_spread_evenly() {
        let mut rng = StdRng::seed_from_u64(8);
        let shards = explosion(&mut rng, 1.0, 20);
        assert_eq!(shards.len(), 20);
        let step = full_turn() / 20.0;
        for (i, s) in shards.iter().enumerate() {
            assert!((s.angle - step * i as f64).abs() < 1e-9);
            assert!(s.distance >= 50.0 && s.distance <= 150.0);
            assert!((500..1000).contains(&s.duration_ms));
        }
        assert_eq!(shards[0].offset_at(shards[0].duration_ms), None);
    }
}
