/// Feedback cues: per-mood haptic pulse sequences and tone sequences.
///
/// Sequences are plain data with relative offsets. Whoever plays them
/// (rumble queue, synthesiser) schedules each step; nothing here sleeps.

use super::mood::MoodId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pulse {
    Light,
    Medium,
    Heavy,
    Success,
}

/// One pulse, `at_ms` after the sequence starts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PulseStep {
    pub pulse: Pulse,
    pub at_ms: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

/// One tone, `at_ms` after the sequence starts.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ToneStep {
    pub freq_hz: f32,
    pub duration_s: f32,
    pub wave: Waveform,
    pub at_ms: u64,
}

/// Which moment a cue belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CueKind {
    Tap,
    Complete,
}

/// Build a pulse sequence from (pulse, gap-before) pairs.
fn pulses(steps: &[(Pulse, u64)]) -> Vec<PulseStep> {
    let mut at_ms = 0;
    steps.iter()
        .map(|&(pulse, gap)| {
            at_ms += gap;
            PulseStep { pulse, at_ms }
        })
        .collect()
}

fn tone(freq_hz: f32, duration_s: f32, wave: Waveform, at_ms: u64) -> ToneStep {
    ToneStep { freq_hz, duration_s, wave, at_ms }
}

/// Single named pulse, used by menu navigation.
pub fn single(pulse: Pulse) -> Vec<PulseStep> {
    vec![PulseStep { pulse, at_ms: 0 }]
}

pub fn haptics(mood: MoodId, kind: CueKind) -> Vec<PulseStep> {
    use Pulse::*;
    match (kind, mood) {
        (CueKind::Tap, MoodId::Calm) => pulses(&[(Light, 0)]),
        (CueKind::Tap, MoodId::Energy) => pulses(&[(Heavy, 0), (Medium, 50)]),
        (CueKind::Tap, MoodId::Dream) => pulses(&[(Light, 0), (Light, 100)]),
        (CueKind::Tap, MoodId::Love) => pulses(&[(Medium, 0), (Light, 80), (Medium, 80)]),
        (CueKind::Tap, MoodId::Focus) => pulses(&[(Light, 0), (Light, 200)]),

        (CueKind::Complete, MoodId::Calm) => pulses(&[(Success, 0)]),
        (CueKind::Complete, MoodId::Energy) => pulses(&[(Heavy, 0), (Heavy, 100), (Heavy, 100)]),
        (CueKind::Complete, MoodId::Dream) => pulses(&[(Light, 0), (Medium, 150), (Light, 150)]),
        (CueKind::Complete, MoodId::Love) => {
            pulses(&[(Medium, 0), (Light, 120), (Medium, 120), (Light, 120)])
        }
        (CueKind::Complete, MoodId::Focus) => pulses(&[(Medium, 0), (Medium, 300)]),
    }
}

pub fn tones(mood: MoodId, kind: CueKind) -> Vec<ToneStep> {
    use Waveform::*;
    match (kind, mood) {
        (CueKind::Tap, MoodId::Calm) => vec![tone(528.0, 0.15, Sine, 0)],
        (CueKind::Tap, MoodId::Energy) => vec![tone(800.0, 0.1, Square, 0), tone(1200.0, 0.08, Square, 50)],
        (CueKind::Tap, MoodId::Dream) => vec![tone(432.0, 0.3, Sine, 0), tone(648.0, 0.3, Sine, 100)],
        (CueKind::Tap, MoodId::Love) => vec![tone(639.0, 0.2, Sine, 0), tone(852.0, 0.15, Sine, 80)],
        (CueKind::Tap, MoodId::Focus) => vec![tone(396.0, 0.25, Triangle, 0)],

        (CueKind::Complete, MoodId::Calm) => vec![tone(528.0, 0.3, Sine, 0), tone(660.0, 0.4, Sine, 200)],
        (CueKind::Complete, MoodId::Energy) => [800.0, 1000.0, 1200.0, 1600.0]
            .iter()
            .enumerate()
            .map(|(i, &f)| tone(f, 0.15, Square, i as u64 * 100))
            .collect(),
        (CueKind::Complete, MoodId::Dream) => [432.0, 540.0, 648.0]
            .iter()
            .enumerate()
            .map(|(i, &f)| tone(f, 0.5, Sine, i as u64 * 300))
            .collect(),
        (CueKind::Complete, MoodId::Love) => [639.0, 852.0, 639.0, 852.0]
            .iter()
            .enumerate()
            .map(|(i, &f)| tone(f, 0.25, Sine, i as u64 * 200))
            .collect(),
        (CueKind::Complete, MoodId::Focus) => {
            vec![tone(396.0, 0.4, Triangle, 0), tone(528.0, 0.5, Triangle, 300)]
        }
    }
}

/// Frequencies of the quiet drone played while an activity runs.
pub fn ambient(mood: MoodId) -> [f32; 3] {
    match mood {
        MoodId::Calm => [264.0, 396.0, 528.0],
        MoodId::Energy => [440.0, 660.0, 880.0],
        MoodId::Dream => [216.0, 324.0, 432.0],
        MoodId::Love => [426.0, 639.0, 852.0],
        MoodId::Focus => [198.0, 297.0, 396.0],
    }
}

/// Length of the ambient drone.
pub const AMBIENT_SECS: f32 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mood::ALL_MOODS;

    #[test]
    fn pulse_offsets_accumulate() {
        let love = haptics(MoodId::Love, CueKind::Tap);
        let at: Vec<u64> = love.iter().map(|s| s.at_ms).collect();
        assert_eq!(at, vec![0, 80, 160]);
        assert_eq!(love[2].pulse, Pulse::Medium);
    }

    #[test]
    fn energy_completion_is_three_heavy() {
        let seq = haptics(MoodId::Energy, CueKind::Complete);
        assert_eq!(seq.len(), 3);
        assert!(seq.iter().all(|s| s.pulse == Pulse::Heavy));
        assert_eq!(seq[2].at_ms, 200);
    }

    #[test]
    fn every_cue_starts_immediately() {
        for mood in ALL_MOODS {
            for kind in [CueKind::Tap, CueKind::Complete] {
                assert_eq!(haptics(mood, kind)[0].at_ms, 0);
                assert_eq!(tones(mood, kind)[0].at_ms, 0);
            }
        }
    }

    #[test]
    fn tone_offsets_are_non_decreasing() {
        for mood in ALL_MOODS {
            for kind in [CueKind::Tap, CueKind::Complete] {
                let seq = tones(mood, kind);
                assert!(seq.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
            }
        }
    }
}
