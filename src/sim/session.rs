/// Session accumulator: score and counters for one activity run.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComboDelta {
    Increment,
    Reset,
    /// Activities without a streak.
    Keep,
}

/// Read-only view handed to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Snapshot {
    pub score: u32,
    pub action_count: u32,
    pub combo_streak: u32,
    pub completed_units: u32,
    pub max_combo: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    score: u32,
    action_count: u32,
    combo: u32,
    max_combo: u32,
    completed: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// One user action: adds points, counts the action, updates the streak.
    pub fn register_action(&mut self, points: u32, combo: ComboDelta) {
        self.score = self.score.saturating_add(points);
        self.action_count += 1;
        match combo {
            ComboDelta::Increment => {
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
            }
            ComboDelta::Reset => self.combo = 0,
            ComboDelta::Keep => {}
        }
    }

    /// Points earned outside a counted action (waypoints mid-drag).
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// One cycle / pattern / hold / waypoint finished.
    pub fn complete_unit(&mut self) {
        self.completed += 1;
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn reset(&mut self) {
        *self = Accumulator::default();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            action_count: self.action_count,
            combo_streak: self.combo,
            completed_units: self.completed,
            max_combo: self.max_combo,
        }
    }
}
