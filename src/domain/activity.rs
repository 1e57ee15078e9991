/// Activities: the five mini-game kinds and their static table.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ActivityId {
    Tap,
    Breathe,
    Draw,
    Swipe,
    Hold,
}

#[derive(Clone, Debug)]
pub struct Activity {
    pub id: ActivityId,
    pub icon: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Nominal session length in seconds.
    pub duration_secs: u32,
}

pub const ALL_ACTIVITIES: [ActivityId; 5] = [
    ActivityId::Tap,
    ActivityId::Breathe,
    ActivityId::Draw,
    ActivityId::Swipe,
    ActivityId::Hold,
];

pub static ACTIVITIES: [Activity; 5] = [
    Activity {
        id: ActivityId::Tap,
        icon: "👆",
        label: "Rythme",
        description: "Tape au bon rythme",
        duration_secs: 60,
    },
    Activity {
        id: ActivityId::Breathe,
        icon: "🫁",
        label: "Respirer",
        description: "Synchronise ta respiration",
        duration_secs: 90,
    },
    Activity {
        id: ActivityId::Draw,
        icon: "✏️",
        label: "Tracer",
        description: "Suis les figures qui apparaissent",
        duration_secs: 80,
    },
    Activity {
        id: ActivityId::Swipe,
        icon: "👋",
        label: "Parcours",
        description: "Guide les éléments sur leur chemin",
        duration_secs: 70,
    },
    Activity {
        id: ActivityId::Hold,
        icon: "🤲",
        label: "Méditation",
        description: "Maintiens plusieurs fois",
        duration_secs: 60,
    },
];

impl ActivityId {
    pub fn from_id(id: &str) -> Option<ActivityId> {
        match id.trim().to_ascii_lowercase().as_str() {
            "tap" => Some(ActivityId::Tap),
            "breathe" => Some(ActivityId::Breathe),
            "draw" => Some(ActivityId::Draw),
            "swipe" => Some(ActivityId::Swipe),
            "hold" => Some(ActivityId::Hold),
            _ => None,
        }
    }

    pub fn from_id_or_default(id: &str) -> ActivityId {
        ActivityId::from_id(id).unwrap_or_else(|| {
            log::debug!("unknown activity id {id:?}, falling back to tap");
            ActivityId::Tap
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityId::Tap => "tap",
            ActivityId::Breathe => "breathe",
            ActivityId::Draw => "draw",
            ActivityId::Swipe => "swipe",
            ActivityId::Hold => "hold",
        }
    }

    pub fn info(self) -> &'static Activity {
        let idx = match self {
            ActivityId::Tap => 0,
            ActivityId::Breathe => 1,
            ActivityId::Draw => 2,
            ActivityId::Swipe => 3,
            ActivityId::Hold => 4,
        };
        &ACTIVITIES[idx]
    }

    /// Footer label for the action counter ("1 tap", "3 cycles", ...).
    pub fn action_label(self, count: u32) -> &'static str {
        let one = count == 1;
        match self {
            ActivityId::Tap => if one { "tap" } else { "taps" },
            ActivityId::Breathe => if one { "cycle" } else { "cycles" },
            ActivityId::Draw => if one { "trait" } else { "traits" },
            ActivityId::Swipe => if one { "balayage" } else { "balayages" },
            ActivityId::Hold => if one { "maintien" } else { "maintiens" },
        }
    }

    /// Label for the completed-unit counter shown under the score.
    pub fn unit_label(self) -> &'static str {
        match self {
            ActivityId::Tap => "combo",
            ActivityId::Breathe => "cycles",
            ActivityId::Draw => "figures",
            ActivityId::Swipe => "elements",
            ActivityId::Hold => "maintiens",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            ActivityId::Tap => "Tape au rythme!  [Espace]",
            ActivityId::Breathe => "Suis le cercle",
            ActivityId::Draw => "Trace la figure avec la souris",
            ActivityId::Swipe => "Suis le chemin lumineux avec la souris",
            ActivityId::Hold => "Appuie et maintiens  [Espace]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_ids() {
        for id in ALL_ACTIVITIES {
            assert_eq!(id.info().id, id);
            assert!(id.info().duration_secs > 0);
        }
    }

    #[test]
    fn labels_pluralise() {
        assert_eq!(ActivityId::Tap.action_label(1), "tap");
        assert_eq!(ActivityId::Tap.action_label(0), "taps");
        assert_eq!(ActivityId::Hold.action_label(2), "maintiens");
    }

    #[test]
    fn unknown_activity_falls_back_to_tap() {
        assert_eq!(ActivityId::from_id_or_default("juggle"), ActivityId::Tap);
        assert_eq!(ActivityId::from_id("SWIPE"), Some(ActivityId::Swipe));
    }
}
