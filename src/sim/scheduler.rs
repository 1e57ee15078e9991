/// Delayed actions owned by one session.
///
/// The only way a session defers work ("regenerate the path in one
/// second"). Everything pending is dropped by `cancel_all()` on completion,
/// so a finished session never mutates again.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Delayed {
    RegeneratePath,
    RegeneratePattern,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    /// (due, insertion order, action)
    pending: Vec<(u64, u64, Delayed)>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn schedule(&mut self, due_ms: u64, action: Delayed) {
        self.pending.push((due_ms, self.seq, action));
        self.seq += 1;
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|&(due, _, _)| due).min()
    }

    /// Remove and return the earliest action due at or before `now_ms`.
    /// Equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Delayed> {
        let idx = self.pending.iter()
            .enumerate()
            .filter(|(_, entry)| entry.0 <= now_ms)
            .min_by_key(|(_, entry)| (entry.0, entry.1))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx).2)
    }

    #[cfg(test)]
    pub fn is_pending(&self, action: Delayed) -> bool {
        self.pending.iter().any(|&(_, _, a)| a == action)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(300, Delayed::RegeneratePattern);
        s.schedule(100, Delayed::RegeneratePath);
        assert_eq!(s.next_due(), Some(100));
        assert_eq!(s.pop_due(50), None);
        assert_eq!(s.pop_due(500), Some(Delayed::RegeneratePath));
        assert_eq!(s.pop_due(500), Some(Delayed::RegeneratePattern));
        assert_eq!(s.pop_due(500), None);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(100, Delayed::RegeneratePattern);
        s.schedule(100, Delayed::RegeneratePath);
        assert_eq!(s.pop_due(100), Some(Delayed::RegeneratePattern));
        assert_eq!(s.pop_due(100), Some(Delayed::RegeneratePath));
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut s = Scheduler::new();
        s.schedule(10, Delayed::RegeneratePath);
        s.schedule(20, Delayed::RegeneratePattern);
        s.cancel_all();
        assert_eq!(s.len(), 0);
        assert_eq!(s.next_due(), None);
        assert_eq!(s.pop_due(u64::MAX), None);
    }
}
