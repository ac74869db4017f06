/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into the `front` buffer, compared with `back`
/// (the previous frame), and only changed cells are written. Commands are
/// batched with `queue!` and flushed once.
///
/// World space is in pixels. One 30 px tile maps to 2 terminal columns and
/// 1 row, so the map is drawn at 15 px per column and 30 px per row.

use std::f32::consts::TAU;
use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::physics::Rect;
use crate::domain::tile::{PlatformKind, TILE_SIZE};
use crate::sim::world::FrameView;

/// Terminal columns per tile.
const CELL_W: i32 = 2;
const PX_PER_COL: i32 = TILE_SIZE / CELL_W;
const PX_PER_ROW: i32 = TILE_SIZE;

const HUD_ROW: usize = 0;
const HINT_ROW: usize = 1;
const MAP_ROW: usize = 2;

const ENERGY_BAR_LEN: usize = 10;

// ── Cell / FrameBuffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, also used for Clear, so the
    /// terminal's own default never shows between rows.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 20, b: 34 };
    const VOID_BG: Color = Color::Rgb { r: 8, g: 8, b: 14 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition; forces a full repaint when stored in `back`.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Cell::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

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

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Camera ──

/// Viewport over the map, in terminal cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: i32,
    pub view_h: i32,
    placed: bool,
}

impl Camera {
    /// Snap to the target on the first frame of a level, then follow it
    /// with a dead zone.
    fn track(&mut self, target: (i32, i32), world: (i32, i32)) {
        if self.view_w <= 0 || self.view_h <= 0 { return; }
        if self.placed {
            self.x = follow_axis(self.x, self.view_w, target.0, world.0);
            self.y = follow_axis(self.y, self.view_h, target.1, world.1);
        } else {
            self.x = center_axis(self.view_w, target.0, world.0);
            self.y = center_axis(self.view_h, target.1, world.1);
            self.placed = true;
        }
    }
}

/// Scroll only when the target leaves the inner 60% of the view.
/// A world smaller than the view is centered.
fn follow_axis(pos: i32, view: i32, target: i32, world: i32) -> i32 {
    if world <= view {
        return -((view - world) / 2);
    }
    let margin = view / 5;
    let mut p = pos;
    if target < p + margin {
        p = target - margin;
    } else if target > p + view - margin - 1 {
        p = target - view + margin + 1;
    }
    p.clamp(0, world - view)
}

fn center_axis(view: i32, target: i32, world: i32) -> i32 {
    if world <= view {
        -((view - world) / 2)
    } else {
        (target - view / 2).clamp(0, world - view)
    }
}

fn px_to_col(x: i32) -> i32 { x.div_euclid(PX_PER_COL) }
fn px_to_row(y: i32) -> i32 { y.div_euclid(PX_PER_ROW) }

/// Sprites larger than a tile are drawn one tile wide from their top-left.
fn sprite_box(r: &Rect) -> Rect {
    Rect::new(r.x, r.y, r.w.min(TILE_SIZE), r.h.min(TILE_SIZE))
}

fn energy_bar(ratio: f32) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * ENERGY_BAR_LEN as f32).round() as usize).min(ENERGY_BAR_LEN);
    format!("{}{}", "█".repeat(filled), "░".repeat(ENERGY_BAR_LEN - filled))
}

// ── Screens ──

/// What the frontend wants shown this frame.
pub enum Screen<'a> {
    NameEntry { name: &'a str },
    /// Key and button reference: `(binding, action)` rows.
    Controls { rows: &'a [(String, String)] },
    Playing { view: FrameView<'a>, paused: bool },
    LevelComplete { view: FrameView<'a>, has_next: bool },
    GameOver { view: FrameView<'a> },
    AllCleared { cleared: usize, average_score: f32 },
}

impl Screen<'_> {
    fn id(&self) -> u8 {
        match self {
            Screen::NameEntry { .. } => 0,
            Screen::Playing { .. } => 1,
            Screen::LevelComplete { .. } => 2,
            Screen::GameOver { .. } => 3,
            Screen::AllCleared { .. } => 4,
            Screen::Controls { .. } => 5,
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<u8>,
    camera: Camera,
    /// Keyboard enhancement was pushed and must be popped on cleanup.
    enhanced_keys: bool,
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
            camera: Camera::default(),
            enhanced_keys: false,
        }
    }

    /// Enter raw alternate-screen mode. Returns true when the terminal will
    /// also report key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced_keys = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Recenter on the next frame (new level or retry).
    pub fn reset_camera(&mut self) {
        self.camera = Camera::default();
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.invalidate();
    }

    pub fn render(&mut self, screen: &Screen<'_>) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_screen != Some(screen.id()) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen.id());
        }

        self.compose(screen);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, screen: &Screen<'_>) {
        self.front.clear();
        match screen {
            Screen::NameEntry { name } => self.compose_name_entry(name),
            Screen::Controls { rows } => self.compose_controls(rows),
            Screen::Playing { view, paused } => {
                self.compose_game(view);
                if *paused {
                    self.compose_box(
                        "PAUSED",
                        &[
                            ("F1   Resume".to_string(), Color::Rgb { r: 100, g: 200, b: 255 }),
                            ("ESC  Back to name entry".to_string(), Color::Rgb { r: 180, g: 180, b: 180 }),
                        ],
                        Color::Rgb { r: 255, g: 220, b: 50 },
                    );
                }
            }
            Screen::LevelComplete { view, has_next } => {
                self.compose_game(view);
                let next = if *has_next { "ENTER/Y  Next level" } else { "ENTER/Y  Results" };
                self.compose_box(
                    "LEVEL CLEAR",
                    &[
                        (format!("Level {}  {}", view.level_number, view.level_name), Color::White),
                        (format!("Score {}   Time {:.1}s", view.score, view.elapsed_secs), Color::White),
                        (String::new(), Color::White),
                        (next.to_string(), Color::Rgb { r: 80, g: 255, b: 80 }),
                        ("N/B      Back to name entry".to_string(), Color::DarkGrey),
                    ],
                    Color::Rgb { r: 80, g: 255, b: 80 },
                );
            }
            Screen::GameOver { view } => {
                self.compose_game(view);
                self.compose_box(
                    "GAME OVER",
                    &[
                        (format!("Level {}  {}", view.level_number, view.level_name), Color::White),
                        (format!("Score {}", view.score), Color::White),
                        (String::new(), Color::White),
                        ("ENTER/Y  Retry level".to_string(), Color::Rgb { r: 80, g: 255, b: 80 }),
                        ("N/B      Back to name entry".to_string(), Color::DarkGrey),
                    ],
                    Color::Rgb { r: 255, g: 60, b: 60 },
                );
            }
            Screen::AllCleared { cleared, average_score } => {
                self.compose_box(
                    "ALL LEVELS CLEARED",
                    &[
                        (format!("Levels completed: {cleared}"), Color::White),
                        (format!("Average score:    {average_score:.1}"), Color::White),
                        (String::new(), Color::White),
                        ("ENTER  Play again".to_string(), Color::Rgb { r: 80, g: 255, b: 80 }),
                        ("ESC    Quit".to_string(), Color::DarkGrey),
                    ],
                    Color::Rgb { r: 255, g: 220, b: 50 },
                );
            }
        }
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Game view ──

    fn compose_game(&mut self, v: &FrameView<'_>) {
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        self.front.fill_row(HUD_ROW, hud_bg);
        let hud = format!(
            " Lv {}  HP {}  Score {:<4}  Energy {}  {:>5.1}s ",
            v.level_number,
            "♥".repeat(v.health as usize),
            v.score,
            energy_bar(v.energy_ratio),
            v.elapsed_secs,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        if v.hints.is_empty() {
            self.front.put_str(1, HINT_ROW, v.level_name, Color::DarkGrey, Color::Reset);
        } else {
            let text = v.hints.iter().map(|h| h.label()).collect::<Vec<_>>().join("  |  ");
            let hint_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(HINT_ROW, hint_bg);
            self.front.put_str(1, HINT_ROW, &text, Color::Black, hint_bg);
        }

        let help_row = self.front.height.saturating_sub(1);
        let view_h = help_row.saturating_sub(MAP_ROW) as i32;
        self.camera.view_w = self.front.width as i32;
        self.camera.view_h = view_h;
        let world = (px_to_col(v.world_w - 1) + 1, px_to_row(v.world_h - 1) + 1);
        self.camera.track((px_to_col(v.player.center_x()), px_to_row(v.player.center_y())), world);

        let mut map = MapPainter { buf: &mut self.front, cam: self.camera };
        map.background(world);
        for p in v.platforms {
            let (ch, fg, bg) = match p.kind {
                PlatformKind::Grass => ('"', Color::Rgb { r: 150, g: 230, b: 110 }, Color::Rgb { r: 40, g: 110, b: 40 }),
                PlatformKind::Stone => ('#', Color::Rgb { r: 170, g: 170, b: 180 }, Color::Rgb { r: 70, g: 70, b: 80 }),
                PlatformKind::Wood => ('=', Color::Rgb { r: 230, g: 190, b: 130 }, Color::Rgb { r: 110, g: 70, b: 30 }),
            };
            map.fill(&p.rect, ch, fg, bg);
        }
        if let Some(goal) = v.goal {
            map.fill(&goal, 'G', Color::Black, Color::Rgb { r: 255, g: 220, b: 50 });
        }
        for e in v.enemies {
            map.fill(&sprite_box(&e.rect), e.kind().behavior().glyph, Color::Rgb { r: 255, g: 90, b: 90 }, Color::Reset);
            for shot in e.projectiles() {
                let r = shot.rect();
                map.plot(px_to_col(r.center_x()), px_to_row(r.center_y()), 'o', Color::Rgb { r: 255, g: 160, b: 40 }, Color::Reset);
            }
        }
        for fx in v.effects {
            let t = fx.progress();
            let radius = fx.radius as f32 * (0.4 + 0.6 * t);
            let fg = if t < 0.6 { Color::Rgb { r: 255, g: 170, b: 40 } } else { Color::Rgb { r: 150, g: 50, b: 30 } };
            for i in 0..24 {
                let a = i as f32 * TAU / 24.0;
                let px = fx.x + (radius * a.cos()) as i32;
                let py = fx.y + (radius * a.sin()) as i32;
                map.plot(px_to_col(px), px_to_row(py), '*', fg, Color::Reset);
            }
        }
        let player_fg = if v.dashing { Color::Rgb { r: 255, g: 100, b: 255 } } else { Color::Rgb { r: 90, g: 220, b: 255 } };
        map.fill(&v.player, '@', player_fg, Color::Reset);

        let help = " ←/→ A/D Move  Space/W/↑ Jump  X/C Dash  F1 Pause  ESC Menu";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    // ── Overlays ──

    fn compose_name_entry(&mut self, name: &str) {
        let accent = Color::Rgb { r: 100, g: 200, b: 255 };
        self.compose_box(
            "SHADOW GUIDE",
            &[
                ("Enter your name:".to_string(), Color::White),
                (format!("> {name}_"), accent),
                (String::new(), Color::White),
                ("ENTER  Start".to_string(), Color::Rgb { r: 80, g: 255, b: 80 }),
                ("TAB    Controls".to_string(), Color::Rgb { r: 180, g: 180, b: 180 }),
                ("ESC    Quit".to_string(), Color::DarkGrey),
            ],
            accent,
        );
    }

    fn compose_controls(&mut self, rows: &[(String, String)]) {
        let key_w = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        let key_color = Color::Rgb { r: 255, g: 255, b: 100 };
        let mut lines: Vec<(String, Color)> = rows.iter()
            .map(|(key, action)| (format!("{key:<key_w$}  {action}"), key_color))
            .collect();
        lines.push((String::new(), Color::White));
        lines.push(("TAB/ESC  Back".to_string(), Color::DarkGrey));
        self.compose_box("CONTROLS", &lines, Color::Rgb { r: 180, g: 180, b: 255 });
    }

    /// Centered framed box with a title line.
    fn compose_box(&mut self, title: &str, lines: &[(String, Color)], accent: Color) {
        let panel = Color::Rgb { r: 36, g: 36, b: 48 };
        let inner = lines.iter()
            .map(|(s, _)| s.chars().count())
            .chain(std::iter::once(title.chars().count()))
            .max()
            .unwrap_or(0)
            + 4;
        let box_w = inner + 2;
        let box_h = lines.len() + 4;
        let x0 = self.front.width.saturating_sub(box_w) / 2;
        let y0 = self.front.height.saturating_sub(box_h) / 2;

        for y in y0..y0 + box_h {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, panel));
            }
        }
        let bar = "═".repeat(inner);
        self.front.put_str(x0, y0, &format!("╔{bar}╗"), accent, panel);
        self.front.put_str(x0, y0 + box_h - 1, &format!("╚{bar}╝"), accent, panel);
        for y in y0 + 1..y0 + box_h - 1 {
            self.front.set(x0, y, Cell::new('║', accent, panel));
            self.front.set(x0 + box_w - 1, y, Cell::new('║', accent, panel));
        }
        let title_x = x0 + 1 + (inner - title.chars().count()) / 2;
        self.front.put_str(title_x, y0 + 1, title, accent, panel);
        for (i, (line, fg)) in lines.iter().enumerate() {
            self.front.put_str(x0 + 3, y0 + 3 + i, line, *fg, panel);
        }
    }
}

/// Draws world cells through the camera, clipped to the map area.
struct MapPainter<'a> {
    buf: &'a mut FrameBuffer,
    cam: Camera,
}

impl MapPainter<'_> {
    fn plot(&mut self, col: i32, row: i32, ch: char, fg: Color, bg: Color) {
        let sx = col - self.cam.x;
        let sy = row - self.cam.y;
        if sx < 0 || sy < 0 || sx >= self.cam.view_w || sy >= self.cam.view_h { return; }
        let (x, y) = (sx as usize, MAP_ROW + sy as usize);
        let bg = if bg == Color::Reset { self.buf.get(x, y).bg } else { bg };
        self.buf.set(x, y, Cell::new(ch, fg, bg));
    }

    fn fill(&mut self, r: &Rect, ch: char, fg: Color, bg: Color) {
        if r.w <= 0 || r.h <= 0 { return; }
        for row in px_to_row(r.top())..=px_to_row(r.bottom() - 1) {
            for col in px_to_col(r.left())..=px_to_col(r.right() - 1) {
                self.plot(col, row, ch, fg, bg);
            }
        }
    }

    fn background(&mut self, world: (i32, i32)) {
        for sy in 0..self.cam.view_h {
            for sx in 0..self.cam.view_w {
                let (col, row) = (sx + self.cam.x, sy + self.cam.y);
                let inside = (0..world.0).contains(&col) && (0..world.1).contains(&row);
                let bg = if inside { Cell::BASE_BG } else { Cell::VOID_BG };
                self.buf.set(sx as usize, MAP_ROW + sy as usize, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::spawn::SpawnTable;
    use crate::sim::level::parse_level_text;
    use crate::sim::world::WorldState;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    #[test]
    fn pixels_map_to_two_columns_per_tile() {
        assert_eq!((px_to_col(0), px_to_col(14), px_to_col(15), px_to_col(30)), (0, 0, 1, 2));
        assert_eq!((px_to_row(29), px_to_row(30)), (0, 1));
        assert_eq!(px_to_col(-1), -1);
    }

    #[test]
    fn camera_centers_small_worlds_and_clamps_large_ones() {
        assert_eq!(center_axis(40, 5, 20), -10);
        assert_eq!(center_axis(40, 10, 100), 0);
        assert_eq!(center_axis(40, 95, 100), 60);
        assert_eq!(center_axis(40, 50, 100), 30);
    }

    #[test]
    fn camera_dead_zone_scrolls_only_near_edges() {
        // view 50, margin 10: target inside [pos+10, pos+39] does not scroll
        assert_eq!(follow_axis(20, 50, 40, 200), 20);
        assert_eq!(follow_axis(20, 50, 60, 200), 31);
        assert_eq!(follow_axis(20, 50, 25, 200), 15);
        assert_eq!(follow_axis(20, 50, 2, 200), 0);
        assert_eq!(follow_axis(20, 50, 199, 200), 150);
    }

    #[test]
    fn energy_bar_rounds_and_clamps() {
        assert_eq!(energy_bar(1.0), "██████████");
        assert_eq!(energy_bar(0.0), "░░░░░░░░░░");
        assert_eq!(energy_bar(0.44).chars().filter(|&c| c == '█').count(), 4);
        assert_eq!(energy_bar(7.0).chars().count(), ENERGY_BAR_LEN);
    }

    #[test]
    fn game_frame_draws_hud_player_and_platforms() {
        let def = parse_level_text("t", "; Test\n\n P  E  G\n########");
        let mut cfg = GameConfig::default();
        cfg.random.seed = Some(5);
        let world = WorldState::start(&def, 1, "ann", &cfg, &SpawnTable::default()).unwrap();

        let mut r = Renderer::new();
        r.front.resize(60, 12);
        r.compose(&Screen::Playing { view: world.view(), paused: false });

        let hud = row_text(&r.front, HUD_ROW);
        assert!(hud.contains("Lv 1"));
        assert!(hud.contains("♥♥♥"));
        assert!(row_text(&r.front, HINT_ROW).contains("Test"));

        let map: String = (MAP_ROW..11).map(|y| row_text(&r.front, y)).collect();
        assert!(map.contains("@@"));
        assert!(map.contains("pp") && !map.contains("ppp"));
        assert!(map.contains("GG"));
        assert_eq!(map.matches('#').count(), 16);
    }

    #[test]
    fn overlay_box_is_centered_with_title() {
        let mut r = Renderer::new();
        r.front.resize(40, 12);
        r.compose(&Screen::NameEntry { name: "ann" });
        let all: Vec<String> = (0..12).map(|y| row_text(&r.front, y)).collect();
        assert!(all.iter().any(|l| l.contains("SHADOW GUIDE")));
        assert!(all.iter().any(|l| l.contains("> ann_")));
        assert!(all.iter().any(|l| l.trim_start().starts_with('╔')));
    }

    #[test]
    fn controls_rows_are_aligned() {
        let rows = vec![
            ("←/A".to_string(), "Move left".to_string()),
            ("SPACE".to_string(), "Jump".to_string()),
        ];
        let mut r = Renderer::new();
        r.front.resize(50, 12);
        r.compose(&Screen::Controls { rows: &rows });
        let all: Vec<String> = (0..12).map(|y| row_text(&r.front, y)).collect();
        assert!(all.iter().any(|l| l.contains("CONTROLS")));
        assert!(all.iter().any(|l| l.contains("←/A    Move left")));
        assert!(all.iter().any(|l| l.contains("SPACE  Jump")));
    }
}
