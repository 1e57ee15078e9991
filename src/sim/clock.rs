/// Clocks driven by explicit millisecond timestamps.
///
/// Nothing here reads the wall clock. The step function asks each clock
/// for its next due time and fires it once `now` has reached it, so
/// boundaries are processed in order no matter how late a frame is.
/// A stopped clock reports no due time and can never fire again.

pub const SECOND_MS: u64 = 1000;

// ── Beat clock ──

/// Evenly spaced beat boundaries at `start + k × interval`.
#[derive(Clone, Debug)]
pub struct BeatClock {
    pub interval_ms: u64,
    start_ms: u64,
    fired: u64,
    running: bool,
}

impl BeatClock {
    pub fn new(interval_ms: u64) -> Self {
        BeatClock { interval_ms: interval_ms.max(1), start_ms: 0, fired: 0, running: false }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
        self.fired = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_due(&self) -> Option<u64> {
        self.running.then(|| self.start_ms + (self.fired + 1) * self.interval_ms)
    }

    /// Fire the pending boundary; returns its expected timestamp.
    pub fn fire(&mut self) -> Option<u64> {
        let due = self.next_due()?;
        self.fired += 1;
        Some(due)
    }

    /// Most recent boundary fired (the start counts as boundary zero).
    pub fn last_boundary(&self) -> u64 {
        self.start_ms + self.fired * self.interval_ms
    }

    /// Boundary closest to `t_ms`; ties go to the earlier boundary.
    pub fn nearest_boundary(&self, t_ms: u64) -> u64 {
        let since = t_ms.saturating_sub(self.start_ms);
        let k = since / self.interval_ms;
        let rem = since % self.interval_ms;
        let k = if rem * 2 > self.interval_ms { k + 1 } else { k };
        self.start_ms + k * self.interval_ms
    }

    /// 0.0 right on a beat, rising to 1.0 just before the next one.
    pub fn beat_phase(&self, now_ms: u64) -> f64 {
        let since = now_ms.saturating_sub(self.last_boundary());
        (since as f64 / self.interval_ms as f64).min(1.0)
    }
}

// ── Breathing phase clock ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BreathPhase {
    Inhale,
    Exhale,
}

impl BreathPhase {
    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inspire",
            BreathPhase::Exhale => "Expire",
        }
    }
}

/// What happened when a phase boundary fired.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PhaseFlip {
    pub phase: BreathPhase,
    /// An exhale just ended: one full inhale + exhale cycle is done.
    pub cycle_done: bool,
}

/// Alternates inhale → exhale → inhale, each phase with its own length.
#[derive(Clone, Debug)]
pub struct PhaseClock {
    pub inhale_ms: u64,
    pub exhale_ms: u64,
    phase: BreathPhase,
    phase_start_ms: u64,
    running: bool,
}

impl PhaseClock {
    pub fn new(inhale_ms: u64, exhale_ms: u64) -> Self {
        PhaseClock {
            inhale_ms: inhale_ms.max(1),
            exhale_ms: exhale_ms.max(1),
            phase: BreathPhase::Inhale,
            phase_start_ms: 0,
            running: false,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.phase = BreathPhase::Inhale;
        self.phase_start_ms = now_ms;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    fn phase_len(&self) -> u64 {
        match self.phase {
            BreathPhase::Inhale => self.inhale_ms,
            BreathPhase::Exhale => self.exhale_ms,
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.running.then(|| self.phase_start_ms + self.phase_len())
    }

    pub fn fire(&mut self) -> Option<PhaseFlip> {
        let due = self.next_due()?;
        let cycle_done = self.phase == BreathPhase::Exhale;
        self.phase = match self.phase {
            BreathPhase::Inhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        };
        self.phase_start_ms = due;
        Some(PhaseFlip { phase: self.phase, cycle_done })
    }

    /// Fraction of the current phase elapsed, 0.0–1.0.
    pub fn phase_progress(&self, now_ms: u64) -> f64 {
        let since = now_ms.saturating_sub(self.phase_start_ms);
        (since as f64 / self.phase_len() as f64).min(1.0)
    }

    /// Circle size for the renderer: 0.0 fully out, 1.0 fully in.
    pub fn fullness(&self, now_ms: u64) -> f64 {
        let p = self.phase_progress(now_ms);
        match self.phase {
            BreathPhase::Inhale => p,
            BreathPhase::Exhale => 1.0 - p,
        }
    }
}

// ── Session countdown ──

/// Whole-second countdown from the activity duration to zero.
#[derive(Clone, Debug)]
pub struct Countdown {
    pub duration_secs: u32,
    remaining: u32,
    start_ms: u64,
    running: bool,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Countdown { duration_secs, remaining: duration_secs, start_ms: 0, running: false }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
        self.remaining = self.duration_secs;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn next_due(&self) -> Option<u64> {
        if !self.running || self.remaining == 0 {
            return None;
        }
        let ticks = (self.duration_secs - self.remaining) as u64;
        Some(self.start_ms + (ticks + 1) * SECOND_MS)
    }

    /// Consume one second; returns the seconds left.
    pub fn fire(&mut self) -> Option<u32> {
        self.next_due()?;
        self.remaining -= 1;
        Some(self.remaining)
    }

    /// Elapsed fraction for the progress bar.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        (self.duration_secs - self.remaining) as f64 / self.duration_secs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_clock_fires_on_the_grid() {
        let mut c = BeatClock::new(600);
        assert_eq!(c.next_due(), None);
        c.start(1000);
        assert_eq!(c.fire(), Some(1600));
        assert_eq!(c.fire(), Some(2200));
        assert_eq!(c.last_boundary(), 2200);
        assert_eq!(c.next_due(), Some(2800));
    }

    #[test]
    fn stopped_beat_clock_never_fires() {
        let mut c = BeatClock::new(600);
        c.start(0);
        c.stop();
        assert_eq!(c.next_due(), None);
        assert_eq!(c.fire(), None);
    }

    #[test]
    fn nearest_boundary_rounds() {
        let mut c = BeatClock::new(1000);
        c.start(500);
        assert_eq!(c.nearest_boundary(500), 500);
        assert_eq!(c.nearest_boundary(1400), 1500);
        assert_eq!(c.nearest_boundary(1000), 500); // tie → earlier
        assert_eq!(c.nearest_boundary(1001), 1500);
        assert_eq!(c.nearest_boundary(100), 500);
    }

    #[test]
    fn phase_clock_alternates_with_own_lengths() {
        let mut c = PhaseClock::new(4000, 6000);
        c.start(0);
        assert_eq!(c.next_due(), Some(4000));
        let f = c.fire().unwrap();
        assert_eq!(f, PhaseFlip { phase: BreathPhase::Exhale, cycle_done: false });
        assert_eq!(c.next_due(), Some(10_000));
        let f = c.fire().unwrap();
        assert_eq!(f, PhaseFlip { phase: BreathPhase::Inhale, cycle_done: true });
        assert_eq!(c.next_due(), Some(14_000));
    }

    #[test]
    fn fullness_tracks_phase() {
        let mut c = PhaseClock::new(1000, 2000);
        c.start(0);
        assert!((c.fullness(500) - 0.5).abs() < 1e-9);
        c.fire();
        assert!((c.fullness(1500) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn countdown_reaches_zero_after_duration_ticks() {
        let mut cd = Countdown::new(3);
        cd.start(0);
        assert_eq!(cd.fire(), Some(2));
        assert_eq!(cd.fire(), Some(1));
        assert_eq!(cd.fire(), Some(0));
        assert_eq!(cd.next_due(), None);
        assert_eq!(cd.fire(), None);
        assert_eq!(cd.progress(), 1.0);
    }

    #[test]
    fn countdown_due_times_are_whole_seconds() {
        let mut cd = Countdown::new(60);
        cd.start(250);
        assert_eq!(cd.next_due(), Some(1250));
        cd.fire();
        assert_eq!(cd.next_due(), Some(2250));
    }
}
