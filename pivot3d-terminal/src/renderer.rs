/// Terminal cell-buffer canvas for the core drawing contract
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

use pivot3d_core::{Canvas, Color, ScreenPos};

/// Character luminosity ramp for fills (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const LINE_CHAR: char = '+';
const POINT_CHAR: char = 'o';

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Color::BLACK,
};

/// A `Canvas` over a terminal-sized cell grid.
///
/// Input coordinates are canvas-centered with y up; this maps them to
/// rows growing downward. Fills are drawn with a luminosity-ramp
/// character picked from the fill color's brightness, in the fill
/// color's RGB. No depth buffer: back-to-front ordering comes from the
/// render queue.
pub struct TermCanvas {
    width: u32,
    height: u32,
    fill: Color,
    stroke: Color,
    cells: Vec<Cell>,
}

impl TermCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill: Color::WHITE,
            stroke: Color::WHITE,
            cells: vec![BLANK; (width * height) as usize],
        }
    }

    /// Centered y-up coordinates to (column, row), still fractional.
    fn to_cell(&self, p: ScreenPos) -> (f64, f64) {
        (
            p.x + self.width as f64 / 2.0,
            self.height as f64 / 2.0 - p.y,
        )
    }

    fn put(&mut self, col: i64, row: i64, ch: char, color: Color) {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return;
        }
        self.cells[(row as u32 * self.width + col as u32) as usize] = Cell { ch, color };
    }

    fn fill_char(color: Color) -> char {
        let luminance =
            (0.2126 * color.r as f64 + 0.7152 * color.g as f64 + 0.0722 * color.b as f64) / 255.0;
        let index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f64).round() as usize;
        LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
    }

    /// Writes the current frame to the terminal.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = self.cells[(row * self.width + col) as usize];
                writer.queue(SetForegroundColor(to_term_color(cell.color)))?;
                writer.queue(Print(cell.ch))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

impl Canvas for TermCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_color(&mut self, fill: Color, stroke: Color) {
        self.fill = fill;
        self.stroke = stroke;
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Even-odd scanline fill. Projected vertices may land far outside
    /// the grid (partially visible faces are not clipped upstream); rows
    /// and columns are clamped to the buffer.
    fn fill_polygon(&mut self, points: &[ScreenPos]) {
        if points.len() < 3 {
            return;
        }
        let ring: Vec<(f64, f64)> = points.iter().map(|p| self.to_cell(*p)).collect();
        if ring.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return;
        }

        let min_row = ring
            .iter()
            .map(|p| p.1)
            .fold(f64::INFINITY, f64::min)
            .floor()
            .max(0.0) as i64;
        let max_row = ring
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(self.height as f64 - 1.0) as i64;

        let ch = Self::fill_char(self.fill);
        for row in min_row..=max_row {
            let sy = row as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..ring.len() {
                let a = ring[i];
                let b = ring[(i + 1) % ring.len()];
                if (a.1 <= sy) != (b.1 <= sy) {
                    crossings.push(a.0 + (sy - a.1) * (b.0 - a.0) / (b.1 - a.1));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let from = span[0].round().max(0.0) as i64;
                let to = span[1].round().min(self.width as f64 - 1.0) as i64;
                for col in from..=to {
                    self.put(col, row, ch, self.fill);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: ScreenPos, to: ScreenPos) {
        let a = self.to_cell(from);
        let b = self.to_cell(to);
        if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
            return;
        }
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil() as usize;
        // Off-screen endpoints can make the step count explode; cells
        // outside the grid are skipped anyway.
        let steps = steps.clamp(1, (4 * (self.width + self.height)) as usize);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let col = (a.0 + (b.0 - a.0) * t).round() as i64;
            let row = (a.1 + (b.1 - a.1) * t).round() as i64;
            self.put(col, row, LINE_CHAR, self.stroke);
        }
    }

    fn plot(&mut self, at: ScreenPos) {
        let (col, row) = self.to_cell(at);
        if !col.is_finite() || !row.is_finite() {
            return;
        }
        self.put(col.round() as i64, row.round() as i64, POINT_CHAR, self.stroke);
    }
}
