use crate::model::{Activity, Bird, GameState, MessageKind, Scene, STAT_MAX};
use chrono::Local;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }

    #[cfg(test)]
    pub(crate) fn row_text(&self, y: u16) -> String {
        (0..self.w).map(|x| self.cells[self.idx(x, y)].ch).collect()
    }
}

/// Colors used by the widgets. Monochrome when color is turned off.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Palette {
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) dim: Color,
    pub(crate) accent: Color,
    pub(crate) pink: Color,
    pub(crate) good: Color,
    pub(crate) bad: Color,
}

impl Palette {
    pub(crate) fn new(enable_color: bool) -> Self {
        if enable_color {
            Self {
                fg: Color::White,
                bg: Color::Black,
                dim: Color::DarkGrey,
                accent: Color::Yellow,
                pink: Color::Magenta,
                good: Color::Green,
                bad: Color::Red,
            }
        } else {
            Self {
                fg: Color::White,
                bg: Color::Black,
                dim: Color::White,
                accent: Color::White,
                pink: Color::White,
                good: Color::White,
                bad: Color::White,
            }
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Writes only the cells that changed since the last frame.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Primitives
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn bar(value: u32, width: usize) -> String {
    let v = value.min(STAT_MAX) as usize;
    let fill = (v * width + 50) / STAT_MAX as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { '·' });
    }
    s.push(']');
    s
}

fn draw_box(buf: &mut CellBuffer, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color, bg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let (x1, y1) = (x0 + bw - 1, y0 + bh - 1);
    let mut put = |x, y, ch| buf.set(x, y, Cell { ch, fg, bg });
    for x in x0 + 1..x1 {
        put(x, y0, '─');
        put(x, y1, '─');
    }
    for y in y0 + 1..y1 {
        put(x0, y, '│');
        put(x1, y, '│');
    }
    put(x0, y0, '┌');
    put(x1, y0, '┐');
    put(x0, y1, '└');
    put(x1, y1, '┘');
}

fn draw_center_box(buf: &mut CellBuffer, pal: &Palette, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;

    let bw = w.saturating_sub(4).min(60);
    let bh = h.saturating_sub(4).min(20);
    if bw < 4 || bh < 4 {
        return;
    }
    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(
                x,
                y,
                Cell {
                    bg: pal.bg,
                    ..Cell::default()
                },
            );
        }
    }
    draw_box(buf, x0, y0, bw, bh, pal.pink, pal.bg);
    draw_text(buf, x0 + 2, y0 + 1, title, pal.accent, pal.bg);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        let clipped: String = line.chars().take(bw as usize - 4).collect();
        draw_text(buf, x0 + 2, yy, &clipped, pal.fg, pal.bg);
        yy += 1;
    }
}

/* -----------------------------
   Flamingo widgets
------------------------------ */

pub(crate) const CARD_W: u16 = 24;
const CARD_H: u16 = 17;
const SIDEBAR_W: u16 = 40;

const FLAMINGO: [&str; 7] = [
    "    __  ",
    "   (o >",
    "   //\\ ",
    "  ((_) )",
    "   \\\\_/ ",
    "    ||  ",
    "   _||_ ",
];

/// Horizontal wiggle while the dance animation runs.
pub(crate) fn dance_offset(bird: &Bird) -> i32 {
    if bird.dance_frames == 0 {
        0
    } else if (bird.dance_frames / 3) % 2 == 0 {
        1
    } else {
        -1
    }
}

fn draw_flamingo(buf: &mut CellBuffer, bird: &Bird, x: u16, y: u16, pal: &Palette) {
    let dx = dance_offset(bird);
    let tired = bird.activity() == Activity::Exhausted;
    for (row, line) in FLAMINGO.into_iter().enumerate() {
        let xx = (x as i32 + 4 + dx).max(0) as u16;
        let line = if tired && row == 1 { "   (- >" } else { line };
        draw_text(buf, xx, y + row as u16, line, pal.pink, pal.bg);
    }
}

fn draw_bird_card(
    buf: &mut CellBuffer,
    bird: &Bird,
    x: u16,
    y: u16,
    selected: bool,
    pal: &Palette,
) {
    let frame = if selected { pal.accent } else { pal.dim };
    draw_box(buf, x, y, CARD_W, CARD_H, frame, pal.bg);

    let title = format!("{}{}", if selected { "> " } else { "" }, bird.name);
    let title_color = if selected { pal.accent } else { pal.fg };
    draw_text(buf, x + 2, y + 1, &title, title_color, pal.bg);

    draw_flamingo(buf, bird, x, y + 2, pal);

    let ix = x + 2;
    let mut iy = y + 10;
    let meter_color = |v: u32| if v < 20 { pal.bad } else { pal.good };
    draw_text(buf, ix, iy, "Energy", pal.fg, pal.bg);
    iy += 1;
    let energy = format!("{} {:>3}", bar(bird.energy, 12), bird.energy);
    draw_text(buf, ix, iy, &energy, meter_color(bird.energy), pal.bg);
    iy += 1;
    draw_text(buf, ix, iy, "Happiness", pal.fg, pal.bg);
    iy += 1;
    let happy = format!("{} {:>3}", bar(bird.happiness, 12), bird.happiness);
    draw_text(buf, ix, iy, &happy, meter_color(bird.happiness), pal.bg);
    iy += 1;
    let skill = format!("Dance Skill: {:.1}", bird.dance_skill());
    draw_text(buf, ix, iy, &skill, pal.fg, pal.bg);
    iy += 1;
    let fav = format!("Fav: {}", bird.favorite_move);
    let (badge, badge_color) = match bird.activity() {
        Activity::Ready => ("ready", pal.good),
        Activity::Exhausted => ("tired", pal.bad),
    };
    draw_text(buf, ix, iy, &fav, pal.fg, pal.bg);
    draw_text(buf, x + CARD_W - 8, iy, badge, badge_color, pal.bg);
}

/// First card index to draw so the selected bird stays on screen.
pub(crate) fn first_visible(selected: usize, total: usize, fits: usize) -> usize {
    if fits == 0 || total <= fits {
        return 0;
    }
    let max_first = total - fits;
    selected.saturating_sub(fits - 1).min(max_first)
}

fn draw_flock(buf: &mut CellBuffer, st: &GameState, pal: &Palette) {
    let x0 = SIDEBAR_W + 1;
    if buf.w <= x0 {
        return;
    }

    if st.birds.is_empty() {
        draw_text(
            buf,
            x0 + 2,
            2,
            "Adopt your first flamingo to start playing!",
            pal.accent,
            pal.bg,
        );
        return;
    }

    let fits = ((buf.w - x0) / (CARD_W + 1)).max(1) as usize;
    let first = first_visible(st.selected, st.birds.len(), fits);
    for (slot, (idx, bird)) in st.birds.iter().enumerate().skip(first).take(fits).enumerate() {
        let x = x0 + slot as u16 * (CARD_W + 1);
        draw_bird_card(buf, bird, x, 1, idx == st.selected, pal);
    }

    if st.birds.len() > fits {
        let last = (first + fits).min(st.birds.len());
        let more = format!("{}-{} of {}", first + 1, last, st.birds.len());
        draw_text(buf, x0 + 2, CARD_H + 1, &more, pal.dim, pal.bg);
    }
}

fn draw_sidebar(buf: &mut CellBuffer, st: &GameState, adopt_cost: u32, pal: &Palette) {
    draw_text(buf, 1, 0, "Dancing Flamingos", pal.pink, pal.bg);
    draw_text(buf, 1, 2, "Game Stats", pal.accent, pal.bg);
    draw_text(buf, 1, 3, &format!("Coins: {}", st.coins), pal.fg, pal.bg);
    draw_text(buf, 1, 4, &format!("Flock: {}", st.birds.len()), pal.fg, pal.bg);

    let adopt = format!("[A] Adopt ({} coins)", adopt_cost);
    let adopt_color = if st.coins >= adopt_cost { pal.good } else { pal.dim };
    draw_text(buf, 1, 6, &adopt, adopt_color, pal.bg);

    draw_text(buf, 1, 8, "Messages", pal.accent, pal.bg);
    for (i, msg) in st.feed.iter().rev().enumerate() {
        let color = match msg.kind {
            MessageKind::Success => pal.good,
            MessageKind::Info => pal.fg,
            MessageKind::Error => pal.bad,
        };
        let text: String = msg.text.chars().take(SIDEBAR_W as usize - 2).collect();
        draw_text(buf, 1, 9 + i as u16, &text, color, pal.bg);
    }
}

const HELP_TEXT: &str = "Adopt flamingos and teach them to dance.\n\
Dancing earns coins and skill but costs energy.\n\
Below 20 energy a flamingo is too tired to dance.\n\n\
A       adopt a new flamingo\n\
←/→     pick a flamingo\n\
D/Space dance for coins\n\
S       rest to recover energy\n\
R       reset the game\n\
Tab     facts / leaderboard\n\
Esc/H   close, Q quit";

const FACTS_TEXT: &str = "- Flamingos are social birds that live in colonies.\n\
- They get their pink color from a diet of shrimp\n  and algae.\n\
- Flamingos can dance! They perform group rituals\n  that look like dances.";

fn leaderboard_text(st: &GameState) -> String {
    if st.birds.is_empty() {
        return "No dancers yet. Adopt a flamingo first!".to_string();
    }
    st.leaderboard()
        .iter()
        .take(12)
        .enumerate()
        .map(|(i, b)| {
            format!(
                "{:>2}. {:<14} skill {:.1}  since {}",
                i + 1,
                b.name,
                b.dance_skill(),
                b.last_interaction.with_timezone(&Local).format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Draws a full frame of the game into `buf`.
pub(crate) fn draw_frame(buf: &mut CellBuffer, st: &GameState, adopt_cost: u32, pal: &Palette) {
    buf.clear(pal.bg);
    draw_sidebar(buf, st, adopt_cost, pal);
    draw_flock(buf, st, pal);

    let keys = match st.scene {
        Scene::Main => concat!(
            "a adopt | ←→ select | d dance | s rest | ",
            "r reset | tab pages | h help | q quit"
        ),
        Scene::Help | Scene::Facts | Scene::Leaderboard => "esc back | tab next page | q quit",
    };
    let bottom = buf.h.saturating_sub(1);
    draw_text(buf, 1, bottom, keys, pal.dim, pal.bg);

    match st.scene {
        Scene::Main => {}
        Scene::Help => draw_center_box(buf, pal, "How to play", HELP_TEXT),
        Scene::Facts => draw_center_box(buf, pal, "Fun Flamingo Facts", FACTS_TEXT),
        Scene::Leaderboard => draw_center_box(buf, pal, "Leaderboard", &leaderboard_text(st)),
    }
}
