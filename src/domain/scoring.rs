/// Scoring rules for every activity.
///
/// Everything here is pure: callers feed timestamps or measurements in
/// and get points / tiers out. The session accumulator applies them.

// ── Constants ──

/// Accuracy (0–100) strictly above which a tap is Perfect.
pub const PERFECT_THRESHOLD: f64 = 90.0;
/// Accuracy strictly above which a tap is Good.
pub const GOOD_THRESHOLD: f64 = 70.0;
/// Accuracy strictly above which a tap is Ok. At or below: Miss.
pub const OK_THRESHOLD: f64 = 50.0;

pub const HOLD_POINTS: u32 = 200;
pub const BREATH_CYCLE_POINTS: u32 = 50;
pub const WAYPOINT_POINTS: u32 = 100;

/// Fraction of the required hold that counts as a full hold, in percent.
pub const HOLD_SUCCESS_PERCENT: u64 = 99;

/// Draw similarity strictly above which the pattern counts as completed.
pub const DRAW_COMPLETE_THRESHOLD: f64 = 0.7;
/// Draw similarity strictly above which the stroke is a partial success.
pub const DRAW_PARTIAL_THRESHOLD: f64 = 0.5;

/// Combo multiples that trigger an explosion.
pub const COMBO_MILESTONE: u32 = 5;

// ── Tap ──

/// Reward tier of a single tap, best to worst.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tier {
    Perfect,
    Good,
    Ok,
    Miss,
}

impl Tier {
    pub fn from_accuracy(accuracy: f64) -> Tier {
        if accuracy > PERFECT_THRESHOLD {
            Tier::Perfect
        } else if accuracy > GOOD_THRESHOLD {
            Tier::Good
        } else if accuracy > OK_THRESHOLD {
            Tier::Ok
        } else {
            Tier::Miss
        }
    }

    pub fn base_points(self) -> u32 {
        match self {
            Tier::Perfect => 100,
            Tier::Good => 50,
            Tier::Ok => 25,
            Tier::Miss => 0,
        }
    }

    /// Only the top two tiers keep the streak going.
    pub fn keeps_combo(self) -> bool {
        matches!(self, Tier::Perfect | Tier::Good)
    }

    pub fn feedback_text(self) -> &'static str {
        match self {
            Tier::Perfect => "Parfait!",
            Tier::Good => "Bien!",
            Tier::Ok => "Ok",
            Tier::Miss => "Raté",
        }
    }
}

/// Result of scoring one tap.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TapScore {
    pub accuracy: f64,
    pub tier: Tier,
    pub points: u32,
    pub combo: u32,
}

/// Timing accuracy in percent: 100 on the beat, falling linearly to 0
/// one full interval away.
pub fn accuracy(actual_ms: u64, expected_ms: u64, interval_ms: u64) -> f64 {
    if interval_ms == 0 {
        return 0.0;
    }
    let diff = actual_ms.abs_diff(expected_ms) as f64;
    (100.0 - diff / interval_ms as f64 * 100.0).max(0.0)
}

/// Combo multiplier applied to a base: `floor(base × (1 + combo × 0.1))`.
/// Computed in tenths so the floor is exact.
pub fn combo_points(base: u32, combo: u32) -> u32 {
    let scaled = base as u64 * (10 + combo as u64) / 10;
    scaled.min(u32::MAX as u64) as u32
}

/// Score a tap against its reference beat. `combo` is the streak before
/// this tap; the returned combo is the streak after it.
pub fn evaluate_tap(actual_ms: u64, expected_ms: u64, interval_ms: u64, combo: u32) -> TapScore {
    let acc = accuracy(actual_ms, expected_ms, interval_ms);
    let tier = Tier::from_accuracy(acc);
    let points = combo_points(tier.base_points(), combo);
    let combo = if tier.keeps_combo() { combo + 1 } else { 0 };
    TapScore { accuracy: acc, tier, points, combo }
}

/// Does reaching `combo` deserve a milestone explosion?
pub fn is_combo_milestone(combo: u32) -> bool {
    combo > 0 && combo % COMBO_MILESTONE == 0
}

/// Explosion parameters for a combo milestone: (intensity, particle count).
pub fn milestone_burst(combo: u32) -> (f64, usize) {
    let intensity = (combo as f64 / 10.0).min(3.0);
    let count = (20 + combo as usize).min(50);
    (intensity, count)
}

// ── Hold ──

/// A hold succeeds once it reaches 99% of the required duration.
pub fn hold_succeeds(held_ms: u64, required_ms: u64) -> bool {
    held_ms.saturating_mul(100) >= required_ms.saturating_mul(HOLD_SUCCESS_PERCENT)
}

/// Fill level of the hold ring, 0.0–1.0.
pub fn hold_progress(held_ms: u64, required_ms: u64) -> f64 {
    if required_ms == 0 {
        return 1.0;
    }
    (held_ms as f64 / required_ms as f64).clamp(0.0, 1.0)
}

// ── Draw ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawGrade {
    Excellent,
    Good,
    Retry,
}

impl DrawGrade {
    pub fn from_similarity(similarity: f64) -> DrawGrade {
        if similarity > DRAW_COMPLETE_THRESHOLD {
            DrawGrade::Excellent
        } else if similarity > DRAW_PARTIAL_THRESHOLD {
            DrawGrade::Good
        } else {
            DrawGrade::Retry
        }
    }

    pub fn feedback_text(self) -> &'static str {
        match self {
            DrawGrade::Excellent => "Excellent!",
            DrawGrade::Good => "Bien!",
            DrawGrade::Retry => "Recommence",
        }
    }
}

/// Points for a stroke: `floor(similarity × 100)`.
pub fn draw_points(similarity: f64) -> u32 {
    (similarity.clamp(0.0, 1.0) * 100.0).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_beat_is_perfect() {
        let s = evaluate_tap(1200, 1200, 1200, 0);
        assert_eq!(s.accuracy, 100.0);
        assert_eq!(s.tier, Tier::Perfect);
        assert_eq!(s.points, 100);
        assert_eq!(s.combo, 1);
    }

    #[test]
    fn top_tier_with_combo_three_awards_130() {
        let s = evaluate_tap(1000, 1000, 1000, 3);
        assert_eq!(s.points, 130);
        assert_eq!(s.combo, 4);
    }

    #[test]
    fn combo_points_floor() {
        assert_eq!(combo_points(25, 3), 32); // 32.5
        assert_eq!(combo_points(50, 1), 55);
        assert_eq!(combo_points(0, 9), 0);
    }

    #[test]
    fn tier_boundaries_are_strict() {
        assert_eq!(Tier::from_accuracy(90.0), Tier::Good);
        assert_eq!(Tier::from_accuracy(90.01), Tier::Perfect);
        assert_eq!(Tier::from_accuracy(70.0), Tier::Ok);
        assert_eq!(Tier::from_accuracy(50.0), Tier::Miss);
        assert_eq!(Tier::from_accuracy(0.0), Tier::Miss);
    }

    #[test]
    fn accuracy_is_monotone_in_distance() {
        let interval = 900;
        let mut prev = f64::MAX;
        for diff in (0..2000).step_by(7) {
            let a = accuracy(5000 + diff, 5000, interval);
            assert!(a <= prev);
            assert!(a >= 0.0);
            prev = a;
        }
    }

    #[test]
    fn accuracy_is_symmetric() {
        assert_eq!(accuracy(900, 1000, 1000), accuracy(1100, 1000, 1000));
    }

    #[test]
    fn low_tier_and_miss_reset_combo() {
        // 40% of interval off → accuracy 60 → Ok
        let ok = evaluate_tap(1400, 1000, 1000, 7);
        assert_eq!(ok.tier, Tier::Ok);
        assert_eq!(ok.combo, 0);
        // Multiplier still uses the combo before the reset.
        assert_eq!(ok.points, combo_points(25, 7));

        let miss = evaluate_tap(1500, 1000, 1000, 4);
        assert_eq!(miss.tier, Tier::Miss);
        assert_eq!(miss.points, 0);
        assert_eq!(miss.combo, 0);
    }

    #[test]
    fn good_tier_extends_combo() {
        // 20% off → accuracy 80 → Good
        let s = evaluate_tap(1200, 1000, 1000, 2);
        assert_eq!(s.tier, Tier::Good);
        assert_eq!(s.combo, 3);
        assert_eq!(s.points, 60);
    }

    #[test]
    fn hold_exact_duration_succeeds_and_98_percent_fails() {
        assert!(hold_succeeds(5000, 5000));
        assert!(hold_succeeds(4950, 5000));
        assert!(!hold_succeeds(4900, 5000));
        assert!(!hold_succeeds(0, 7000));
    }

    #[test]
    fn hold_progress_clamps() {
        assert_eq!(hold_progress(10_000, 5000), 1.0);
        assert!((hold_progress(2500, 5000) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn draw_grades() {
        assert_eq!(DrawGrade::from_similarity(0.71), DrawGrade::Excellent);
        assert_eq!(DrawGrade::from_similarity(0.7), DrawGrade::Good);
        assert_eq!(DrawGrade::from_similarity(0.5), DrawGrade::Retry);
        assert_eq!(draw_points(0.719), 71);
        assert_eq!(draw_points(1.5), 100);
    }

    #[test]
    fn milestones_every_five() {
        assert!(!is_combo_milestone(0));
        assert!(!is_combo_milestone(4));
        assert!(is_combo_milestone(5));
        assert!(is_combo_milestone(10));
        assert_eq!(milestone_burst(5), (0.5, 25));
        assert_eq!(milestone_burst(40), (3.0, 50));
    }
}
