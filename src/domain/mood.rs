/// Moods: the static table and every per-mood timing parameter.
///
/// A mood parameterises all five activities. Lookups never fail:
/// unknown ids fall back to `MoodId::Calm`.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoodId {
    Calm,
    Energy,
    Dream,
    Love,
    Focus,
}

/// Inhale / exhale lengths for the breathing activity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BreathConfig {
    pub inhale_ms: u64,
    pub exhale_ms: u64,
}

impl BreathConfig {
    #[cfg(test)]
    pub fn cycle_ms(&self) -> u64 {
        self.inhale_ms + self.exhale_ms
    }
}

#[derive(Clone, Debug)]
pub struct Mood {
    pub id: MoodId,
    pub emoji: &'static str,
    pub label: &'static str,
    pub enabled: bool,
    pub quotes: &'static [&'static str],
}

pub const ALL_MOODS: [MoodId; 5] = [
    MoodId::Calm,
    MoodId::Energy,
    MoodId::Dream,
    MoodId::Love,
    MoodId::Focus,
];

pub static MOODS: [Mood; 5] = [
    Mood {
        id: MoodId::Calm,
        emoji: "😌",
        label: "Calme",
        enabled: true,
        quotes: &[
            "Le calme est une force tranquille.",
            "Respire, tout va bien.",
            "Ici et maintenant, rien ne presse.",
            "Laisse passer les nuages.",
        ],
    },
    Mood {
        id: MoodId::Energy,
        emoji: "⚡",
        label: "Énergie",
        enabled: true,
        quotes: &[
            "Rien ne t'arrête aujourd'hui.",
            "Ton énergie est contagieuse.",
            "Fonce, le monde suivra.",
            "Chaque battement compte.",
        ],
    },
    Mood {
        id: MoodId::Dream,
        emoji: "🌙",
        label: "Rêve",
        enabled: true,
        quotes: &[
            "Les rêves sont des cartes du possible.",
            "Flotte un peu plus longtemps.",
            "La nuit garde tes plus belles idées.",
        ],
    },
    Mood {
        id: MoodId::Love,
        emoji: "💗",
        label: "Amour",
        enabled: true,
        quotes: &[
            "Sois doux avec toi-même.",
            "L'amour commence par un sourire.",
            "Ton cœur sait le chemin.",
        ],
    },
    Mood {
        id: MoodId::Focus,
        emoji: "🎯",
        label: "Focus",
        enabled: true,
        quotes: &[
            "Une chose à la fois.",
            "La clarté vient du silence.",
            "Ton attention est ton super-pouvoir.",
        ],
    },
];

impl MoodId {
    /// Parse a lowercase identifier ("calm", "energy", ...).
    pub fn from_id(id: &str) -> Option<MoodId> {
        match id.trim().to_ascii_lowercase().as_str() {
            "calm" => Some(MoodId::Calm),
            "energy" => Some(MoodId::Energy),
            "dream" => Some(MoodId::Dream),
            "love" => Some(MoodId::Love),
            "focus" => Some(MoodId::Focus),
            _ => None,
        }
    }

    /// Parse with the calm fallback used everywhere a mood id comes from outside.
    pub fn from_id_or_default(id: &str) -> MoodId {
        MoodId::from_id(id).unwrap_or_else(|| {
            log::debug!("unknown mood id {id:?}, falling back to calm");
            MoodId::Calm
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoodId::Calm => "calm",
            MoodId::Energy => "energy",
            MoodId::Dream => "dream",
            MoodId::Love => "love",
            MoodId::Focus => "focus",
        }
    }

    pub fn info(self) -> &'static Mood {
        // Table order matches ALL_MOODS.
        &MOODS[self.index()]
    }

    pub fn index(self) -> usize {
        match self {
            MoodId::Calm => 0,
            MoodId::Energy => 1,
            MoodId::Dream => 2,
            MoodId::Love => 3,
            MoodId::Focus => 4,
        }
    }

    // ── Timing tables ──

    /// Interval between beats in the tap activity.
    pub fn beat_interval_ms(self) -> u64 {
        match self {
            MoodId::Calm => 1200,
            MoodId::Energy => 600,
            MoodId::Dream => 1500,
            MoodId::Love => 900,
            MoodId::Focus => 1000,
        }
    }

    pub fn breath(self) -> BreathConfig {
        let (inhale_ms, exhale_ms) = match self {
            MoodId::Calm => (4000, 6000),
            MoodId::Energy => (2000, 2000),
            MoodId::Dream => (5000, 7000),
            MoodId::Love => (3500, 3500),
            MoodId::Focus => (4000, 4000),
        };
        BreathConfig { inhale_ms, exhale_ms }
    }

    /// Continuous press needed for one successful hold.
    pub fn hold_required_ms(self) -> u64 {
        match self {
            MoodId::Calm => 5000,
            MoodId::Energy => 3000,
            MoodId::Dream => 7000,
            MoodId::Love => 4000,
            MoodId::Focus => 6000,
        }
    }
}

/// Moods a picker may offer, in table order.
pub fn enabled_moods() -> impl Iterator<Item = &'static Mood> {
    MOODS.iter().filter(|m| m.enabled)
}
