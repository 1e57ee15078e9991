/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::AppConfig;
use domain::activity::ActivityId;
use domain::cue;
use sim::ports::{dispatch, Audio, Haptics, NullDevice, Ports};
use sim::screen::{App, MenuInput};
use sim::world::{Arena, PlayerAction};
use ui::gamepad::{Btn, GamepadState};
use ui::input::{InputState, Pointer};
use ui::renderer::{ArenaRect, Renderer};
use ui::sound::SoundEngine;

/// Log destination; stderr would draw over the alternate screen.
const LOG_FILE: &str = "vibemood.log";

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    match File::create(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("cannot open {LOG_FILE}, logging to stderr: {e}"),
    }
    builder.init();
}

fn main() {
    init_logging();
    let config = AppConfig::load();
    let mut app = App::new(&config);

    let mut renderer = Renderer::new();
    let enhanced = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = run(&mut app, &mut renderer, &config, enhanced);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }
}

fn run(
    app: &mut App,
    renderer: &mut Renderer,
    config: &AppConfig,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new();

    let mut sound = if config.feedback.sound { SoundEngine::new() } else { None };
    let mut quiet = NullDevice;
    let mut still = NullDevice;

    let frame = Duration::from_millis(config.timing.frame_ms);
    let epoch = Instant::now();
    let mut was_in_activity = false;

    log::debug!("started: sound={} haptics={}", sound.is_some(), config.feedback.haptics);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let now_ms = epoch.elapsed().as_millis() as u64;

        // Gestures only count on a screen that was already up, so the
        // Enter that opens an activity is not also its first tap.
        let in_activity = app.in_activity();
        let actions = match app.session() {
            Some(s) if in_activity => {
                player_actions(s.activity, &kb, &gp, renderer.arena_rect(), s.arena)
            }
            _ => Vec::new(),
        };
        let menu = menu_inputs(&kb, &gp, in_activity);

        let haptics: &mut dyn Haptics = if config.feedback.haptics { &mut gp } else { &mut still };
        let audio: &mut dyn Audio = match sound.as_mut() {
            Some(s) => s,
            None => &mut quiet,
        };

        for input in menu {
            if let Some(pulse) = app.menu(input) {
                haptics.play(&cue::single(pulse));
            }
        }
        if app.quit {
            break;
        }

        let mood = app.current_mood();
        let events = app.tick(now_ms, &actions);
        {
            let mut ports = Ports {
                haptics: &mut *haptics,
                audio: &mut *audio,
                nav: &mut *app,
                volume: config.feedback.volume,
            };
            dispatch(&events, mood, &mut ports);
        }

        if was_in_activity && !app.in_activity() {
            audio.stop_ambient();
        }
        was_in_activity = app.in_activity();

        renderer.render(app, now_ms)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
/// Tap and hold inside an activity.
const KEYS_ACTION: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Enter];

fn menu_inputs(kb: &InputState, gp: &GamepadState, in_activity: bool) -> Vec<MenuInput> {
    let mut out = Vec::new();
    if kb.any_pressed(KEYS_BACK) || gp.back_pressed() {
        out.push(MenuInput::Back);
    }
    if in_activity {
        return out;
    }

    let pad = gp.nav_pressed();
    if kb.any_pressed(KEYS_UP) || pad == Some((0, -1)) {
        out.push(MenuInput::Up);
    }
    if kb.any_pressed(KEYS_DOWN) || pad == Some((0, 1)) {
        out.push(MenuInput::Down);
    }
    if kb.any_pressed(KEYS_LEFT) || pad == Some((-1, 0)) {
        out.push(MenuInput::Left);
    }
    if kb.any_pressed(KEYS_RIGHT) || pad == Some((1, 0)) {
        out.push(MenuInput::Right);
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        out.push(MenuInput::Confirm);
    }
    out
}

/// This frame's gestures, in arrival order: buttons first, then mouse.
fn player_actions(
    activity: ActivityId,
    kb: &InputState,
    gp: &GamepadState,
    rect: ArenaRect,
    arena: Arena,
) -> Vec<PlayerAction> {
    let mut out = Vec::new();
    let pressed = kb.any_pressed(KEYS_ACTION) || gp.pressed(Btn::A);
    let released = KEYS_ACTION.iter().any(|k| kb.was_released(*k)) || gp.released(Btn::A);

    match activity {
        ActivityId::Hold => {
            if pressed {
                out.push(PlayerAction::HoldStart);
            }
            if released {
                out.push(PlayerAction::HoldEnd);
            }
        }
        ActivityId::Tap if pressed => out.push(PlayerAction::Tap),
        _ => {}
    }

    for p in &kb.pointer {
        let action = match (*p, activity) {
            (Pointer::Down(..), ActivityId::Tap) => PlayerAction::Tap,
            (Pointer::Down(..), ActivityId::Hold) => PlayerAction::HoldStart,
            (Pointer::Up(..), ActivityId::Hold) => PlayerAction::HoldEnd,
            (Pointer::Down(c, r), _) => PlayerAction::PointerDown(rect.to_arena(c, r, arena)),
            (Pointer::Drag(c, r), ActivityId::Draw | ActivityId::Swipe) => {
                PlayerAction::PointerMove(rect.to_arena(c, r, arena))
            }
            (Pointer::Up(..), ActivityId::Draw | ActivityId::Swipe) => PlayerAction::PointerUp,
            _ => continue,
        };
        out.push(action);
    }
    out
}
