/// Screen flow: mood picker → activity picker → activity → result.
///
/// `App` owns whichever screen is up and implements `Navigator`, so the
/// completion event from a session moves it to the result card through
/// the same `dispatch()` path as every other cue. Leaving the activity
/// screen drops its `SessionState`, which cancels everything it had
/// scheduled.

use crate::config::{AppConfig, PlayConfig};
use crate::domain::activity::{ActivityId, ALL_ACTIVITIES};
use crate::domain::cue::Pulse;
use crate::domain::mood::{enabled_moods, MoodId};

use super::event::GameEvent;
use super::ports::{Navigator, Route};
use super::session::Snapshot;
use super::step;
use super::world::{Phase, PlayerAction, SessionState};

/// Columns in the mood grid.
pub const MOOD_COLUMNS: usize = 2;

/// Result card buttons, left to right.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResultAction {
    Retry,
    Save,
    Share,
    ChangeMood,
}

pub const RESULT_ACTIONS: [ResultAction; 4] = [
    ResultAction::Retry,
    ResultAction::Save,
    ResultAction::Share,
    ResultAction::ChangeMood,
];

impl ResultAction {
    pub fn label(self) -> &'static str {
        match self {
            ResultAction::Retry => "Refaire",
            ResultAction::Save => "Sauver",
            ResultAction::Share => "Partager",
            ResultAction::ChangeMood => "Changer d'humeur",
        }
    }
}

pub const SAVE_MESSAGE: &str = "Pour sauvegarder, fais une capture d'écran ! 📸";
pub const SHARE_MESSAGE: &str = "Fais une capture d'écran et partage-la ! 🎥";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuInput {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
}

#[derive(Clone, Debug)]
pub struct ResultCard {
    pub mood: MoodId,
    pub activity: ActivityId,
    pub quote: String,
    pub stats: Snapshot,
    pub cursor: usize,
    pub message: Option<&'static str>,
}

pub enum Screen {
    MoodPicker { cursor: usize },
    ActivityPicker { mood: MoodId, cursor: usize },
    Activity(Box<SessionState>),
    Result(ResultCard),
}

pub struct App {
    pub screen: Screen,
    pub quit: bool,
    play: PlayConfig,
    default_mood: MoodId,
    default_activity: ActivityId,
    /// Fixed seed for reproducible sessions.
    seed: Option<u64>,
}

fn mood_cursor(mood: MoodId) -> usize {
    enabled_moods().position(|m| m.id == mood).unwrap_or(0)
}

fn activity_cursor(activity: ActivityId) -> usize {
    ALL_ACTIVITIES.iter().position(|a| *a == activity).unwrap_or(0)
}

fn step_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as isize + delta).clamp(0, len as isize - 1) as usize
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        App {
            screen: Screen::MoodPicker { cursor: mood_cursor(config.general.default_mood) },
            quit: false,
            play: config.play.clone(),
            default_mood: config.general.default_mood,
            default_activity: config.general.default_activity,
            seed: None,
        }
    }

    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Mood whose cues apply right now.
    pub fn current_mood(&self) -> MoodId {
        match &self.screen {
            Screen::MoodPicker { cursor } => {
                enabled_moods().nth(*cursor).map(|m| m.id).unwrap_or(self.default_mood)
            }
            Screen::ActivityPicker { mood, .. } => *mood,
            Screen::Activity(s) => s.mood,
            Screen::Result(card) => card.mood,
        }
    }

    pub fn in_activity(&self) -> bool {
        matches!(self.screen, Screen::Activity(_))
    }

    pub fn session(&self) -> Option<&SessionState> {
        match &self.screen {
            Screen::Activity(s) => Some(s),
            _ => None,
        }
    }

    /// Advance the running session, starting it on its first frame.
    pub fn tick(&mut self, now_ms: u64, actions: &[PlayerAction]) -> Vec<GameEvent> {
        let Screen::Activity(session) = &mut self.screen else { return vec![] };
        let mut events = Vec::new();
        if session.phase == Phase::Idle {
            events = step::start(session, now_ms);
        }
        events.extend(step::step(session, now_ms, actions));
        events
    }

    /// Handle one menu input; returns the haptic pulse to acknowledge it.
    pub fn menu(&mut self, input: MenuInput) -> Option<Pulse> {
        match &mut self.screen {
            Screen::MoodPicker { cursor } => {
                let len = enabled_moods().count();
                match input {
                    MenuInput::Up => *cursor = step_cursor(*cursor, -(MOOD_COLUMNS as isize), len),
                    MenuInput::Down => *cursor = step_cursor(*cursor, MOOD_COLUMNS as isize, len),
                    MenuInput::Left => *cursor = step_cursor(*cursor, -1, len),
                    MenuInput::Right => *cursor = step_cursor(*cursor, 1, len),
                    MenuInput::Confirm => {
                        let mood = enabled_moods().nth(*cursor)?.id;
                        self.navigate(Route::ActivityPicker { mood });
                        return Some(Pulse::Medium);
                    }
                    MenuInput::Back => self.quit = true,
                }
                None
            }
            Screen::ActivityPicker { mood, cursor } => {
                let mood = *mood;
                let len = ALL_ACTIVITIES.len();
                match input {
                    MenuInput::Up | MenuInput::Left => *cursor = step_cursor(*cursor, -1, len),
                    MenuInput::Down | MenuInput::Right => *cursor = step_cursor(*cursor, 1, len),
                    MenuInput::Confirm => {
                        let activity = ALL_ACTIVITIES[*cursor];
                        self.navigate(Route::Activity { mood, activity });
                        return Some(Pulse::Medium);
                    }
                    MenuInput::Back => {
                        self.screen = Screen::MoodPicker { cursor: mood_cursor(mood) };
                        return Some(Pulse::Light);
                    }
                }
                None
            }
            Screen::Activity(session) => {
                if input != MenuInput::Back {
                    return None;
                }
                let (mood, activity) = (session.mood, session.activity);
                log::debug!("left {} before completion", activity.as_str());
                self.screen = Screen::ActivityPicker { mood, cursor: activity_cursor(activity) };
                Some(Pulse::Light)
            }
            Screen::Result(card) => {
                let len = RESULT_ACTIONS.len();
                match input {
                    MenuInput::Left | MenuInput::Up => card.cursor = step_cursor(card.cursor, -1, len),
                    MenuInput::Right | MenuInput::Down => card.cursor = step_cursor(card.cursor, 1, len),
                    MenuInput::Back => {
                        self.navigate(Route::MoodPicker);
                        return Some(Pulse::Light);
                    }
                    MenuInput::Confirm => {
                        let (mood, activity) = (card.mood, card.activity);
                        return match RESULT_ACTIONS[card.cursor] {
                            ResultAction::Retry => {
                                self.navigate(Route::Activity { mood, activity });
                                Some(Pulse::Light)
                            }
                            ResultAction::Save => {
                                card.message = Some(SAVE_MESSAGE);
                                Some(Pulse::Success)
                            }
                            ResultAction::Share => {
                                card.message = Some(SHARE_MESSAGE);
                                Some(Pulse::Medium)
                            }
                            ResultAction::ChangeMood => {
                                self.navigate(Route::MoodPicker);
                                Some(Pulse::Light)
                            }
                        };
                    }
                }
                None
            }
        }
    }
}

impl Navigator for App {
    fn navigate(&mut self, route: Route) {
        log::debug!("navigate: {route:?}");
        self.screen = match route {
            Route::MoodPicker => Screen::MoodPicker { cursor: mood_cursor(self.current_mood()) },
            Route::ActivityPicker { mood } => Screen::ActivityPicker {
                mood,
                cursor: activity_cursor(self.default_activity),
            },
            Route::Activity { mood, activity } => {
                let session = match self.seed {
                    Some(seed) => SessionState::seeded(mood, activity, &self.play, seed),
                    None => SessionState::new(mood, activity, &self.play),
                };
                Screen::Activity(Box::new(session))
            }
            Route::Result { mood, quote, activity } => {
                let stats = self.session().map(|s| s.stats.snapshot()).unwrap_or_default();
                Screen::Result(ResultCard { mood, activity, quote, stats, cursor: 0, message: None })
            }
        };
    }
}
