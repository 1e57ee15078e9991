/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The activity body is drawn in arena units and scaled into an
/// `ArenaRect`; the same rect maps mouse cells back into the arena.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::activity::ALL_ACTIVITIES;
use crate::domain::geometry::{full_turn, on_circle, resample, resample_closed, Point};
use crate::domain::mood::{enabled_moods, MoodId};
use crate::sim::screen::{App, ResultCard, Screen, MOOD_COLUMNS, RESULT_ACTIONS};
use crate::sim::view::{activity_view, ActivityView, BodyView, Sprite};
use crate::sim::world::Arena;

// ── Palette ──

const BG_RGB: (u8, u8, u8) = (15, 15, 19);
const TEXT: Color = Color::Rgb { r: 235, g: 235, b: 240 };
const DIM: Color = Color::Rgb { r: 120, g: 120, b: 135 };
const FAINT: Color = Color::Rgb { r: 60, g: 60, b: 72 };

pub fn mood_rgb(mood: MoodId) -> (u8, u8, u8) {
    match mood {
        MoodId::Calm => (168, 216, 234),
        MoodId::Energy => (255, 158, 125),
        MoodId::Dream => (201, 160, 255),
        MoodId::Love => (255, 166, 195),
        MoodId::Focus => (143, 227, 207),
    }
}

fn mood_color(mood: MoodId) -> Color {
    fade(mood_rgb(mood), 1.0)
}

/// Blend toward the background; `alpha` 1.0 keeps the color as is.
pub fn fade((r, g, b): (u8, u8, u8), alpha: f64) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |c: u8, bg: u8| (bg as f64 + (c as f64 - bg as f64) * a).round() as u8;
    Color::Rgb { r: mix(r, BG_RGB.0), g: mix(g, BG_RGB.1), b: mix(b, BG_RGB.2) }
}

/// Terminal columns a char takes: emoji are double width, joiners
/// and variation selectors take none.
fn char_cols(c: char) -> usize {
    match c {
        '\u{200D}' | '\u{FE0F}' => 0,
        '⚡' => 2,
        c if c as u32 >= 0x1F000 => 2,
        _ => 1,
    }
}

fn text_cols(s: &str) -> usize {
    s.chars().map(char_cols).sum()
}

/// Greedy word wrap to `width` columns.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && text_cols(&line) + 1 + text_cols(word) > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every cell, also used for `Clear`, so
    /// row gaps on VTE terminals match the cells.
    const BASE_BG: Color = Color::Rgb { r: BG_RGB.0, g: BG_RGB.1, b: BG_RGB.2 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: TEXT,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: TEXT,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    /// Wide cell from a whole grapheme (emoji plus selector / joiners).
    fn from_str_wide(s: &str, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let bytes = s.as_bytes();
        let mut len = bytes.len().min(16);
        while !s.is_char_boundary(len) {
            len -= 1;
        }
        cell.ch[..len].copy_from_slice(&bytes[..len]);
        cell.ch_len = len as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y); emoji take two columns.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            match char_cols(ch) {
                0 => continue,
                2 => {
                    if cx + 1 >= self.width { break; }
                    let mut tmp = [0u8; 4];
                    self.set(cx, y, Cell::from_str_wide(ch.encode_utf8(&mut tmp), fg, bg));
                    self.set(cx + 1, y, Cell { bg: Cell::norm_bg(bg), ..Cell::WIDE_CONT });
                    cx += 2;
                }
                _ => {
                    if cx >= self.width { break; }
                    self.set(cx, y, Cell::from_char(ch, fg, bg));
                    cx += 1;
                }
            }
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(text_cols(s)) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    /// Emoji icon as one wide cell, selector included.
    fn put_icon(&mut self, x: usize, y: usize, icon: &str, bg: Color) {
        if x + 1 < self.width {
            self.set(x, y, Cell::from_str_wide(icon, TEXT, bg));
            self.set(x + 1, y, Cell { bg: Cell::norm_bg(bg), ..Cell::WIDE_CONT });
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::from_char(' ', TEXT, bg));
            }
        }
    }

    fn put_box(&mut self, x: usize, y: usize, w: usize, h: usize, fg: Color, bg: Color) {
        if w < 2 || h < 2 {
            return;
        }
        self.fill_rect(x, y, w, h, bg);
        for col in x + 1..x + w - 1 {
            self.set(col, y, Cell::from_char('─', fg, bg));
            self.set(col, y + h - 1, Cell::from_char('─', fg, bg));
        }
        for row in y + 1..y + h - 1 {
            self.set(x, row, Cell::from_char('│', fg, bg));
            self.set(x + w - 1, row, Cell::from_char('│', fg, bg));
        }
        self.set(x, y, Cell::from_char('╭', fg, bg));
        self.set(x + w - 1, y, Cell::from_char('╮', fg, bg));
        self.set(x, y + h - 1, Cell::from_char('╰', fg, bg));
        self.set(x + w - 1, y + h - 1, Cell::from_char('╯', fg, bg));
    }
}

// ── Arena ↔ terminal mapping ──

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;
const HEADER_ROWS: usize = 5;
const FOOTER_ROWS: usize = 3;

/// Where the arena sits on screen, in terminal cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ArenaRect {
    pub left: usize,
    pub top: usize,
    pub cols: usize,
    pub rows: usize,
}

/// Largest aspect-correct rect for `arena` between header and footer.
pub fn fit_arena(term_w: usize, term_h: usize, arena: Arena) -> ArenaRect {
    let avail_rows = term_h.saturating_sub(HEADER_ROWS + FOOTER_ROWS).max(1);
    let avail_cols = term_w.max(1);
    let wanted_cols = (avail_rows as f64 * arena.width / arena.height * CELL_ASPECT).round() as usize;

    let (cols, rows) = if wanted_cols <= avail_cols {
        (wanted_cols.max(1), avail_rows)
    } else {
        let rows = (avail_cols as f64 * arena.height / arena.width / CELL_ASPECT).round() as usize;
        (avail_cols, rows.clamp(1, avail_rows))
    };

    ArenaRect {
        left: (avail_cols - cols) / 2,
        top: HEADER_ROWS + (avail_rows - rows) / 2,
        cols,
        rows,
    }
}

impl ArenaRect {
    pub fn to_cell(&self, p: Point, arena: Arena) -> Option<(usize, usize)> {
        let fx = p.x / arena.width;
        let fy = p.y / arena.height;
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let col = ((fx * self.cols as f64) as usize).min(self.cols - 1);
        let row = ((fy * self.rows as f64) as usize).min(self.rows - 1);
        Some((self.left + col, self.top + row))
    }

    /// Centre of a terminal cell in arena units, clamped into the arena.
    pub fn to_arena(&self, col: u16, row: u16, arena: Arena) -> Point {
        let fx = (col as f64 - self.left as f64 + 0.5) / self.cols as f64;
        let fy = (row as f64 - self.top as f64 + 0.5) / self.rows as f64;
        Point::new(
            (fx * arena.width).clamp(0.0, arena.width),
            (fy * arena.height).clamp(0.0, arena.height),
        )
    }

    /// Arena units covered by one cell, horizontally.
    fn unit_per_col(&self, arena: Arena) -> f64 {
        arena.width / self.cols as f64
    }
}

// ── Renderer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ScreenKind {
    MoodPicker,
    ActivityPicker,
    Activity,
    Result,
}

fn screen_kind(screen: &Screen) -> ScreenKind {
    match screen {
        Screen::MoodPicker { .. } => ScreenKind::MoodPicker,
        Screen::ActivityPicker { .. } => ScreenKind::ActivityPicker,
        Screen::Activity(_) => ScreenKind::Activity,
        Screen::Result(_) => ScreenKind::Result,
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<ScreenKind>,
    arena: Arena,
    arena_rect: ArenaRect,
    enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            arena: Arena::DEFAULT,
            arena_rect: fit_arena(0, 0, Arena::DEFAULT),
            enhanced: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether key
    /// release events will be reported.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Arena placement from the last layout, for mapping mouse cells.
    pub fn arena_rect(&self) -> ArenaRect {
        self.arena_rect
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.arena_rect = fit_arena(w, h, self.arena);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, app: &App, now_ms: u64) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let kind = screen_kind(&app.screen);
        if self.last_screen != Some(kind) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(kind);
        }

        self.compose(app, now_ms);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, app: &App, now_ms: u64) {
        self.front.clear();
        match &app.screen {
            Screen::MoodPicker { cursor } => self.compose_mood_picker(*cursor),
            Screen::ActivityPicker { mood, cursor } => self.compose_activity_picker(*mood, *cursor),
            Screen::Activity(session) => {
                self.arena = session.arena;
                self.arena_rect = fit_arena(self.term_w, self.term_h, self.arena);
                self.compose_activity(&activity_view(session, now_ms));
            }
            Screen::Result(card) => self.compose_result(card),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = TEXT;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal default and leave line artifacts.
        queue!(self.writer, SetForegroundColor(TEXT), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    fn put_help(&mut self, text: &str) {
        let row = self.front.height.saturating_sub(1);
        self.front.put_centered(row, text, FAINT, Color::Reset);
    }

    // ── Mood picker ──

    fn compose_mood_picker(&mut self, cursor: usize) {
        self.front.put_centered(2, "VibeMood", TEXT, Color::Reset);
        self.front.put_centered(4, "Comment te sens-tu ?", DIM, Color::Reset);

        let tile_w = 18;
        let gap = 2;
        let grid_w = tile_w * MOOD_COLUMNS + gap * (MOOD_COLUMNS - 1);
        let left = self.front.width.saturating_sub(grid_w) / 2;

        for (i, mood) in enabled_moods().enumerate() {
            let x = left + (i % MOOD_COLUMNS) * (tile_w + gap);
            let y = 7 + (i / MOOD_COLUMNS) * 4;
            let rgb = mood_rgb(mood.id);
            let selected = i == cursor;
            let bg = fade(rgb, if selected { 0.35 } else { 0.12 });
            let border = if selected { mood_color(mood.id) } else { bg };
            self.front.put_box(x, y, tile_w, 3, border, bg);
            self.front.put_icon(x + 2, y + 1, mood.emoji, bg);
            let fg = if selected { TEXT } else { fade(rgb, 0.8) };
            self.front.put_str(x + 5, y + 1, mood.label, fg, bg);
        }

        let footer = self.front.height.saturating_sub(3);
        self.front.put_centered(footer, "Choisis ton humeur", DIM, Color::Reset);
        self.put_help("←↑↓→ choisir   Entrée valider   Échap quitter");
    }

    // ── Activity picker ──

    fn compose_activity_picker(&mut self, mood: MoodId, cursor: usize) {
        let info = mood.info();
        let rgb = mood_rgb(mood);
        let w = self.front.width;
        self.front.put_icon(w.saturating_sub(2) / 2, 2, info.emoji, Color::Reset);
        self.front.put_centered(4, "Choisis ton activité", TEXT, Color::Reset);
        self.front.put_centered(5, info.label, mood_color(mood), Color::Reset);

        let row_w = 44.min(w.saturating_sub(4));
        let left = w.saturating_sub(row_w) / 2;
        for (i, id) in ALL_ACTIVITIES.iter().enumerate() {
            let a = id.info();
            let y = 8 + i * 3;
            let selected = i == cursor;
            let bg = if selected { fade(rgb, 0.25) } else { Color::Reset };
            if selected {
                self.front.fill_rect(left, y, row_w, 2, bg);
                self.front.put_str(left, y, "▸", mood_color(mood), bg);
            }
            self.front.put_icon(left + 2, y, a.icon, bg);
            let label_fg = if selected { TEXT } else { fade(rgb, 0.8) };
            self.front.put_str(left + 5, y, a.label, label_fg, bg);
            let secs = format!("{}s", a.duration_secs);
            self.front.put_str((left + row_w).saturating_sub(secs.len() + 1), y, &secs, DIM, bg);
            self.front.put_str(left + 5, y + 1, a.description, DIM, bg);
        }

        self.put_help("↑↓ choisir   Entrée lancer   Échap retour");
    }

    // ── Activity ──

    fn compose_activity(&mut self, v: &ActivityView<'_>) {
        let rgb = mood_rgb(v.mood);
        let accent = mood_color(v.mood);
        let info = v.activity.info();
        let w = self.front.width;

        // Header: mood and activity left, timer right
        self.front.put_icon(1, 0, v.mood.info().emoji, Color::Reset);
        self.front.put_str(4, 0, info.label, TEXT, Color::Reset);
        let timer = format!("{}s", v.remaining_secs);
        self.front.put_str(w.saturating_sub(timer.len() + 1), 0, &timer, accent, Color::Reset);
        self.front.put_centered(1, v.activity.instruction(), DIM, Color::Reset);

        let bar_w = w.saturating_sub(4);
        let filled = ((v.progress.clamp(0.0, 1.0) * bar_w as f64).round() as usize).min(bar_w);
        for x in 0..bar_w {
            let (ch, fg) = if x < filled { ('━', accent) } else { ('─', FAINT) };
            self.front.set(2 + x, 2, Cell::from_char(ch, fg, Color::Reset));
        }

        let score = format!("Score {}", v.stats.score);
        self.front.put_str(2, 3, &score, TEXT, Color::Reset);
        let units = format!("{} {}", v.stats.completed_units, v.activity.unit_label());
        self.front.put_str(w.saturating_sub(units.len() + 2), 3, &units, DIM, Color::Reset);

        match &v.body {
            BodyView::Tap { beat_phase, particles, shards, milestone, .. } => {
                let pulse = 1.0 - beat_phase.clamp(0.0, 1.0);
                self.disk(v.center, 55.0 + 25.0 * pulse, fade(rgb, 0.45 + 0.55 * pulse), '█');
                self.sprites(particles, rgb, '•');
                self.sprites(shards, rgb, '✦');
                if let Some(combo) = milestone {
                    let label = format!("Combo x{combo}!");
                    self.text_at(Point::new(v.center.x, v.center.y - 120.0), &label, accent);
                }
            }
            BodyView::Breathe { phase, fullness } => {
                let r = 40.0 + 110.0 * fullness.clamp(0.0, 1.0);
                self.disk(v.center, r, fade(rgb, 0.35 + 0.4 * fullness), '█');
                self.text_at(v.center, phase.label(), TEXT);
            }
            BodyView::Hold { holding, progress } => {
                self.ring(v.center, 95.0, *progress, accent, FAINT);
                let inner = if *holding { fade(rgb, 0.8) } else { fade(rgb, 0.3) };
                self.disk(v.center, 60.0, inner, '█');
                let label = if *holding {
                    format!("{:.0}%", progress * 100.0)
                } else {
                    "Maintiens".to_string()
                };
                self.text_at(v.center, &label, TEXT);
            }
            BodyView::Draw { pattern, stroke, similarity } => {
                if let Some(p) = pattern {
                    let dense = if p.closed {
                        resample_closed(&p.outline, 160)
                    } else {
                        resample(&p.outline, 160)
                    };
                    for pt in dense {
                        self.plot(pt, '·', fade(rgb, 0.55));
                    }
                    for g in &p.guides {
                        self.plot(*g, '◦', DIM);
                    }
                    self.text_at(Point::new(v.center.x, 60.0), p.kind.name(), DIM);
                }
                self.polyline(stroke, '█', accent);
                if let Some(s) = similarity {
                    let label = format!("{:.0}%", s * 100.0);
                    self.text_at(Point::new(v.center.x, self.arena.height - 40.0), &label, DIM);
                }
            }
            BodyView::Swipe { waypoints } => {
                for pair in waypoints.windows(2) {
                    let fg = if pair[1].collected { fade(rgb, 0.6) } else { FAINT };
                    self.segment(pair[0].pos, pair[1].pos, '·', fg);
                }
                for wp in waypoints.iter() {
                    let (ch, fg) = if wp.collected {
                        ('●', accent)
                    } else if wp.active {
                        ('◉', TEXT)
                    } else {
                        ('○', DIM)
                    };
                    self.plot(wp.pos, ch, fg);
                }
            }
        }

        let h = self.front.height;
        if let Some(text) = v.feedback {
            self.front.put_centered(h.saturating_sub(3), text, accent, Color::Reset);
        }
        let count = format!("{} {}", v.stats.action_count, v.action_label);
        self.front.put_centered(h.saturating_sub(2), &count, TEXT, Color::Reset);
        self.put_help("Échap retour");
    }

    // ── Result ──

    fn compose_result(&mut self, card: &ResultCard) {
        let rgb = mood_rgb(card.mood);
        let accent = mood_color(card.mood);
        let mood = card.mood.info();
        let w = self.front.width;

        let box_w = 46.min(w.saturating_sub(4)).max(16);
        let inner = box_w.saturating_sub(6);
        let quote = wrap_text(&format!("« {} »", card.quote), inner);
        let box_h = 10 + quote.len();
        let x = w.saturating_sub(box_w) / 2;
        let y = 2;
        let bg = fade(rgb, 0.15);

        self.front.put_box(x, y, box_w, box_h, accent, bg);
        self.front.put_icon(x + 3, y + 2, mood.emoji, bg);
        self.front.put_str(x + 6, y + 2, mood.label, accent, bg);
        for (i, line) in quote.iter().enumerate() {
            let lx = x + (box_w.saturating_sub(text_cols(line))) / 2;
            self.front.put_str(lx, y + 4 + i, line, TEXT, bg);
        }

        let row = y + 5 + quote.len();
        let stats = format!(
            "{}  ·  score {}  ·  meilleur combo {}",
            card.activity.info().label, card.stats.score, card.stats.max_combo,
        );
        let sx = x + (box_w.saturating_sub(text_cols(&stats))) / 2;
        self.front.put_str(sx, row, &stats, DIM, bg);
        self.front.put_str(x + 3, y + box_h - 2, "@toi", DIM, bg);
        self.front.put_str(x + box_w - 11, y + box_h - 2, "VibeMood", fade(rgb, 0.6), bg);

        // Buttons
        let labels: Vec<String> = RESULT_ACTIONS.iter().map(|a| format!(" {} ", a.label())).collect();
        let total: usize = labels.iter().map(|l| text_cols(l)).sum::<usize>() + 2 * (labels.len() - 1);
        let mut bx = w.saturating_sub(total) / 2;
        let by = y + box_h + 1;
        for (i, label) in labels.iter().enumerate() {
            let (fg, bbg) = if i == card.cursor {
                (Color::Rgb { r: 15, g: 15, b: 19 }, accent)
            } else {
                (TEXT, fade(rgb, 0.2))
            };
            self.front.put_str(bx, by, label, fg, bbg);
            bx += text_cols(label) + 2;
        }

        if let Some(msg) = card.message {
            self.front.put_centered(by + 2, msg, accent, Color::Reset);
        }
        self.put_help("←→ choisir   Entrée valider   Échap humeurs");
    }

    // ── Arena drawing ──

    fn plot(&mut self, p: Point, ch: char, fg: Color) {
        if let Some((col, row)) = self.arena_rect.to_cell(p, self.arena) {
            self.front.set(col, row, Cell::from_char(ch, fg, Color::Reset));
        }
    }

    fn sprites(&mut self, sprites: &[Sprite], rgb: (u8, u8, u8), ch: char) {
        for s in sprites {
            self.plot(s.pos, ch, fade(rgb, s.opacity));
        }
    }

    fn segment(&mut self, a: Point, b: Point, ch: char, fg: Color) {
        let step = self.arena_rect.unit_per_col(self.arena).max(1.0);
        let n = (a.distance(b) / step).ceil().max(1.0) as usize;
        for i in 0..=n {
            self.plot(a.lerp(b, i as f64 / n as f64), ch, fg);
        }
    }

    fn polyline(&mut self, points: &[Point], ch: char, fg: Color) {
        match points {
            [] => {}
            [only] => self.plot(*only, ch, fg),
            _ => {
                for pair in points.windows(2) {
                    self.segment(pair[0], pair[1], ch, fg);
                }
            }
        }
    }

    fn disk(&mut self, center: Point, radius: f64, fg: Color, ch: char) {
        let rect = self.arena_rect;
        let arena = self.arena;
        for row in rect.top..rect.top + rect.rows {
            for col in rect.left..rect.left + rect.cols {
                let p = rect.to_arena(col as u16, row as u16, arena);
                if p.distance(center) <= radius {
                    self.front.set(col, row, Cell::from_char(ch, fg, Color::Reset));
                }
            }
        }
    }

    /// Ring of dots; the first `filled` fraction, clockwise from the
    /// top, is drawn in `on`.
    fn ring(&mut self, center: Point, radius: f64, filled: f64, on: Color, off: Color) {
        const DOTS: usize = 72;
        for i in 0..DOTS {
            let frac = i as f64 / DOTS as f64;
            let angle = frac * full_turn() - full_turn() / 4.0;
            let (ch, fg) = if frac < filled { ('●', on) } else { ('·', off) };
            self.plot(on_circle(center, radius, angle), ch, fg);
        }
    }

    fn text_at(&mut self, p: Point, text: &str, fg: Color) {
        if let Some((col, row)) = self.arena_rect.to_cell(p, self.arena) {
            let x = col.saturating_sub(text_cols(text) / 2);
            self.front.put_str(x, row, text, fg, Color::Reset);
        }
    }
}
