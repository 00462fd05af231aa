use super::{Cell, Rgb};
use crate::text::{char_width, truncate_to_width, Line};

#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        let cells = vec![Cell::default(); (width as usize) * (height as usize)];
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn diff<'a>(&'a self, other: &'a Buffer) -> impl Iterator<Item = (u16, u16, &'a Cell)> {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(move |(i, (cell, _))| {
                let x = (i % self.width as usize) as u16;
                let y = (i / self.width as usize) as u16;
                (x, y, cell)
            })
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    /// Text of row `y` with trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let mut row = String::new();
        for x in 0..self.width {
            if let Some(cell) = self.get(x, y) {
                if !cell.wide_continuation {
                    row.push(cell.char);
                }
            }
        }
        row.trim_end().to_string()
    }

    /// Paint display rows starting at `scroll`, two columns of indent per
    /// depth level. Selected rows are drawn inverted, focused rows bold.
    pub fn paint_lines(&mut self, lines: &[Line], scroll: usize) {
        let fg = Rgb::new(255, 255, 255);
        let bg = Rgb::new(0, 0, 0);

        for (y, line) in lines.iter().skip(scroll).take(self.height as usize).enumerate() {
            let y = y as u16;
            let selected = line.has_class("selected");
            let (line_fg, line_bg) = if selected { (bg, fg) } else { (fg, bg) };
            let bold = line.has_class("focused");

            let indent = (line.depth * 2).min(self.width as usize);
            let available = (self.width as usize).saturating_sub(indent);
            let text = truncate_to_width(&line.text, available);

            let mut x = indent as u16;
            for ch in text.chars() {
                let width = char_width(ch).max(1) as u16;
                if x + width > self.width {
                    break;
                }
                self.set(
                    x,
                    y,
                    Cell::new(ch)
                        .with_fg(line_fg)
                        .with_bg(line_bg)
                        .with_bold(bold),
                );
                if width == 2 {
                    self.set(
                        x + 1,
                        y,
                        Cell {
                            wide_continuation: true,
                            ..Cell::new(' ').with_bg(line_bg)
                        },
                    );
                }
                x += width;
            }
        }
    }
}
