/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::activity::ActivityId;
use crate::domain::mood::MoodId;
use crate::domain::path::CAPTURE_RADIUS;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub timing: TimingConfig,
    pub play: PlayConfig,
    pub feedback: FeedbackConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    /// Swipe capture radius in arena units.
    pub capture_radius: f64,
    /// Session length override; 0 keeps each activity's own duration.
    pub session_seconds: u32,
}

#[derive(Clone, Debug)]
pub struct FeedbackConfig {
    pub sound: bool,
    pub haptics: bool,
    /// Master volume, 0.0–1.0.
    pub volume: f32,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    /// Preselected in the pickers.
    pub default_mood: MoodId,
    pub default_activity: ActivityId,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    play: TomlPlay,
    #[serde(default)]
    feedback: TomlFeedback,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPlay {
    #[serde(default = "default_capture_radius")]
    capture_radius: f64,
    #[serde(default)]
    session_seconds: u32,
}

#[derive(Deserialize, Debug)]
struct TomlFeedback {
    #[serde(default = "default_true")]
    sound: bool,
    #[serde(default = "default_true")]
    haptics: bool,
    #[serde(default = "default_volume")]
    volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_mood")]
    default_mood: String,
    #[serde(default = "default_activity")]
    default_activity: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_capture_radius() -> f64 { CAPTURE_RADIUS }
fn default_true() -> bool { true }
fn default_volume() -> f32 { 0.3 }
fn default_mood() -> String { "calm".into() }
fn default_activity() -> String { "tap".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { frame_ms: default_frame_ms() }
    }
}

impl Default for TomlPlay {
    fn default() -> Self {
        TomlPlay { capture_radius: default_capture_radius(), session_seconds: 0 }
    }
}

impl Default for TomlFeedback {
    fn default() -> Self {
        TomlFeedback { sound: true, haptics: true, volume: default_volume() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { default_mood: default_mood(), default_activity: default_activity() }
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig { capture_radius: CAPTURE_RADIUS, session_seconds: 0 }
    }
}

// ── Loading ──

impl AppConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, then the XDG and system data dirs.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        Self::from_toml(toml_cfg)
    }

    /// Parse a config document; a broken one yields the defaults.
    #[cfg(test)]
    pub fn from_str_or_default(text: &str) -> Self {
        Self::from_toml(parse_toml(text, Path::new("config.toml")))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let frame_ms = cfg.timing.frame_ms.clamp(1, 100);
        let capture_radius = if cfg.play.capture_radius > 0.0 {
            cfg.play.capture_radius
        } else {
            log::warn!("capture_radius must be positive, using {CAPTURE_RADIUS}");
            CAPTURE_RADIUS
        };

        AppConfig {
            timing: TimingConfig { frame_ms },
            play: PlayConfig {
                capture_radius,
                session_seconds: cfg.play.session_seconds,
            },
            feedback: FeedbackConfig {
                sound: cfg.feedback.sound,
                haptics: cfg.feedback.haptics,
                volume: cfg.feedback.volume.clamp(0.0, 1.0),
            },
            general: GeneralConfig {
                default_mood: MoodId::from_id_or_default(&cfg.general.default_mood),
                default_activity: ActivityId::from_id_or_default(&cfg.general.default_activity),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/vibemood)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/vibemood");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/vibemood)
    let sys = PathBuf::from("/usr/share/vibemood");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("config loaded from {}", path.display());
                    return parse_toml(&text, &path);
                }
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{} parse error, using default settings: {e}", path.display());
            TomlConfig::default()
        }
    }
}
