/// Sound engine: procedural mood tones via rodio.
///
/// Every cue is rendered into an in-memory WAV buffer at play time:
/// a tone sequence becomes one buffer with each tone mixed in at its
/// offset, so playback is a single fire-and-forget Sink and never
/// blocks the frame loop.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use std::f32::consts::PI;

use crate::domain::cue::{ToneStep, Waveform};

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

/// Attack ramp at the start of every tone.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const ATTACK_S: f32 = 0.01;
/// Level the exponential decay reaches at the end of a tone.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const DECAY_FLOOR: f32 = 0.01;

// ════════════════════════════════════════════════════════════
//  Synthesis: plain Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn oscillator(wave: Waveform, phase: f32) -> f32 {
    let s = phase.sin();
    match wave {
        Waveform::Sine => s,
        Waveform::Square => if s >= 0.0 { 1.0 } else { -1.0 },
        Waveform::Triangle => s.asin() * 2.0 / PI,
    }
}

/// One tone with a short linear attack and exponential decay.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn render_tone(freq_hz: f32, duration_s: f32, wave: Waveform) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration_s) as usize;
    let attack = (SAMPLE_RATE as f32 * ATTACK_S) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = if i < attack {
                i as f32 / attack.max(1) as f32
            } else {
                let k = (i - attack) as f32 / (n - attack).max(1) as f32;
                DECAY_FLOOR.powf(k)
            };
            oscillator(wave, t * freq_hz * 2.0 * PI) * env
        })
        .collect()
}

/// Mix a sequence into one buffer; each tone starts `at_ms` in,
/// preceded by silence.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn render_sequence(steps: &[ToneStep], volume: f32) -> Vec<f32> {
    let offset = |ms: u64| (ms * SAMPLE_RATE as u64 / 1000) as usize;
    let tones: Vec<(usize, Vec<f32>)> = steps.iter()
        .map(|s| (offset(s.at_ms), render_tone(s.freq_hz, s.duration_s, s.wave)))
        .collect();

    let len = tones.iter().map(|(start, t)| start + t.len()).max().unwrap_or(0);
    let mut mix = vec![0.0f32; len];
    for (start, tone) in &tones {
        for (slot, s) in mix[*start..].iter_mut().zip(tone) {
            *slot += s;
        }
    }
    for s in &mut mix {
        *s = (*s * volume).clamp(-1.0, 1.0);
    }
    mix
}

/// Steady sine chord for the background drone, faded in and out.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn render_drone(freqs: &[f32], duration_s: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration_s) as usize;
    let fade = (SAMPLE_RATE as f32 * 0.5) as usize;
    let voices = freqs.len().max(1) as f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let edge = i.min(n - 1 - i);
            let env = (edge as f32 / fade as f32).min(1.0);
            let chord: f32 = freqs.iter().map(|f| (t * f * 2.0 * PI).sin()).sum();
            chord / voices * env * volume
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps f32 samples into a valid WAV buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::domain::cue::{ToneStep, AMBIENT_SECS};
    use crate::sim::ports::Audio;

    use super::{make_wav, render_drone, render_sequence};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Kept (not detached) so the drone can be cut when a session ends.
        ambient: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, running silent: {e}");
                    return None;
                }
            };
            Some(SoundEngine { _stream: stream, handle, ambient: None })
        }

        fn sink_with(&self, samples: &[f32]) -> Option<Sink> {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("audio sink unavailable: {e}");
                    return None;
                }
            };
            match rodio::Decoder::new(Cursor::new(make_wav(samples))) {
                Ok(src) => {
                    sink.append(src);
                    Some(sink)
                }
                Err(e) => {
                    log::warn!("could not decode generated tone: {e}");
                    None
                }
            }
        }
    }

    impl Audio for SoundEngine {
        fn play(&mut self, steps: &[ToneStep], volume: f32) {
            if steps.is_empty() {
                return;
            }
            if let Some(sink) = self.sink_with(&render_sequence(steps, volume)) {
                sink.detach(); // fire-and-forget
            }
        }

        fn ambient(&mut self, freqs: [f32; 3], volume: f32) {
            self.stop_ambient();
            self.ambient = self.sink_with(&render_drone(&freqs, AMBIENT_SECS, volume));
        }

        fn stop_ambient(&mut self) {
            if let Some(sink) = self.ambient.take() {
                sink.stop();
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
}

#[cfg(not(feature = "sound"))]
impl crate::sim::ports::Audio for SoundEngine {
    fn play(&mut self, _steps: &[ToneStep], _volume: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cue::{tones, CueKind};
    use crate::domain::mood::MoodId;

    #[test]
    fn sequence_starts_each_tone_at_its_offset() {
        let steps = tones(MoodId::Energy, CueKind::Tap);
        let mix = render_sequence(&steps, 1.0);
        // The second tone starts 50 ms in and ends the buffer.
        let second = render_tone(1200.0, 0.08, Waveform::Square);
        assert_eq!(mix.len(), 50 * SAMPLE_RATE as usize / 1000 + second.len());
    }

    #[test]
    fn leading_silence_before_first_tone() {
        let late = [ToneStep { freq_hz: 440.0, duration_s: 0.1, wave: Waveform::Sine, at_ms: 200 }];
        let mix = render_sequence(&late, 1.0);
        let silent = 200 * SAMPLE_RATE as usize / 1000;
        assert!(mix[..silent].iter().all(|s| *s == 0.0));
        assert!(mix[silent..].iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn volume_scales_and_clamps() {
        let quiet = render_sequence(&tones(MoodId::Calm, CueKind::Tap), 0.3);
        assert!(quiet.iter().all(|s| s.abs() <= 0.3 + 1e-6));
        let loud = render_sequence(&tones(MoodId::Love, CueKind::Complete), 5.0);
        assert!(loud.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn tone_envelope_decays() {
        let t = render_tone(528.0, 0.3, Waveform::Sine);
        let head = t[..t.len() / 4].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = t[t.len() * 3 / 4..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < head);
    }

    #[test]
    fn square_and_triangle_stay_in_range() {
        for wave in [Waveform::Square, Waveform::Triangle] {
            assert!(render_tone(396.0, 0.05, wave).iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn empty_sequence_is_empty() {
        assert!(render_sequence(&[], 1.0).is_empty());
    }

    #[test]
    fn drone_fades_in() {
        let d = render_drone(&[264.0, 396.0, 528.0], 2.0, 0.05);
        assert_eq!(d[0], 0.0);
        assert!(d.iter().all(|s| s.abs() <= 0.05 + 1e-6));
    }

    #[test]
    fn wav_header_is_pcm16() {
        let wav = make_wav(&[0.0, 0.5, -0.5]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 6);
    }
}
