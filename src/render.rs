use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::effects::Effects;
use crate::maze::{Cell as MazeCell, Tile};
use crate::mover::{GridEntity, Point};
use crate::screensaver::Screensaver;

pub const CELL_W: usize = 2;
const MUNCH_GLYPH_THRESHOLD: f32 = 0.5;
const TRAIL_GLYPH_LIFE: f32 = 0.15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Hunter,
    HunterMunch,
    Prey,
    Spark,
    Trail,
    Particle,
    Wall,
    Empty,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

const EMPTY: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![EMPTY; width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces the next draw to repaint every cell, e.g. after a resize or reload.
    pub fn invalidate(&mut self, width: usize, height: usize) {
        self.last = vec![EMPTY; width * height];
        self.needs_full = true;
    }

    pub fn draw(
        &mut self,
        out: &mut impl Write,
        saver: &Screensaver,
        effects: &Effects,
        term_size: (u16, u16),
    ) -> io::Result<()> {
        let maze = saver.maze();
        let (width, height) = (maze.cols(), maze.rows());
        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = term_size;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != width * height {
            self.invalidate(width, height);
        }

        let hud = hud_line(saver);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let frame = compose(saver, effects);
        self.present(out, &frame, width)?;
        self.needs_full = false;

        out.flush()?;
        Ok(())
    }

    /// Writes each run of changed cells in a row with one cursor move.
    fn present(&mut self, out: &mut impl Write, frame: &[Cell], width: usize) -> io::Result<()> {
        for (y, row) in frame.chunks(width).enumerate() {
            let cached = &mut self.last[y * width..(y + 1) * width];
            let mut x = 0;
            while x < width {
                if !self.needs_full && row[x] == cached[x] {
                    x += 1;
                    continue;
                }
                let x_pos = self.origin_x + (x * CELL_W) as u16;
                out.queue(MoveTo(x_pos, self.origin_y + y as u16))?;
                let mut color = None;
                while x < width && (self.needs_full || row[x] != cached[x]) {
                    let cell = row[x];
                    if color != Some(cell.color) {
                        out.queue(SetForegroundColor(cell.color))?;
                        color = Some(cell.color);
                    }
                    out.queue(Print(padded(glyph_text(cell.glyph))))?;
                    cached[x] = cell;
                    x += 1;
                }
                out.queue(ResetColor)?;
            }
        }
        Ok(())
    }
}

/// Pads a glyph out to the fixed cell width.
fn padded(text: &str) -> String {
    let fill = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Hunter => "🤖",
        Glyph::HunterMunch => "😋",
        Glyph::Prey => "🐛",
        Glyph::Spark => "✦",
        Glyph::Trail => "░░",
        Glyph::Particle => "·",
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
    }
}

fn hud_line(saver: &Screensaver) -> String {
    let stats = saver.stats();
    format!(
        "Captured: {}  Prey: {}/{}  Time: {:.0}s  (q to quit)",
        stats.captures,
        saver.active_prey(),
        saver.prey().len(),
        saver.elapsed()
    )
}

/// Maps a continuous position to the maze cell it falls in.
fn locate(position: Point, tile_size: f32, rows: usize, cols: usize) -> Option<MazeCell> {
    if tile_size <= 0.0 || position.x < 0.0 || position.y < 0.0 {
        return None;
    }
    let col = (position.x / tile_size) as usize;
    let row = (position.y / tile_size) as usize;
    (row < rows && col < cols).then_some(MazeCell::new(row, col))
}

/// Builds one frame of glyphs, back to front: maze, particles, trail, prey, sparks, hunter.
pub fn compose(saver: &Screensaver, effects: &Effects) -> Vec<Cell> {
    let maze = saver.maze();
    let (rows, cols) = (maze.rows(), maze.cols());
    let tile = saver.tile_size();
    let mut frame = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            frame.push(match maze.tile(MazeCell::new(row, col)) {
                Tile::Blocked => Cell {
                    glyph: Glyph::Wall,
                    color: Color::DarkBlue,
                },
                Tile::Open => EMPTY,
            });
        }
    }

    let paint = |position: Point, cell: Cell, frame: &mut Vec<Cell>| {
        if let Some(at) = locate(position, tile, rows, cols) {
            if maze.tile(at) == Tile::Open {
                frame[at.row * cols + at.col] = cell;
            }
        }
    };

    for p in effects.particles().particles() {
        paint(
            p.position,
            Cell {
                glyph: Glyph::Particle,
                color: Color::DarkGrey,
            },
            &mut frame,
        );
    }

    let hunter = saver.hunter();
    for segment in hunter.trail().filter(|s| s.life > TRAIL_GLYPH_LIFE) {
        paint(
            segment.position,
            Cell {
                glyph: Glyph::Trail,
                color: Color::Cyan,
            },
            &mut frame,
        );
    }

    for prey in saver.prey().iter().filter(|p| !p.is_eaten()) {
        let mut position = prey.position(tile);
        position.y += prey.bob(tile);
        paint(
            position,
            Cell {
                glyph: Glyph::Prey,
                color: Color::Green,
            },
            &mut frame,
        );
    }

    for spark in effects.sparks() {
        paint(
            spark.position,
            Cell {
                glyph: Glyph::Spark,
                color: Color::Yellow,
            },
            &mut frame,
        );
    }

    let glyph = if hunter.munch_burst() > MUNCH_GLYPH_THRESHOLD {
        Glyph::HunterMunch
    } else {
        Glyph::Hunter
    };
    paint(
        hunter.position(tile),
        Cell {
            glyph,
            color: Color::White,
        },
        &mut frame,
    );

    frame
}
