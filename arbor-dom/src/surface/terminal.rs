use std::any::Any;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use crossterm::{
    cursor, execute,
    style::{Attribute, Color as CtColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use super::{MemorySurface, Surface, SurfaceError};
use crate::buffer::{Buffer, Rgb};
use crate::diff::Patch;
use crate::element::Element;
use crate::text::char_width;

/// Full-screen terminal surface.
///
/// Keeps the mounted tree in a [`MemorySurface`], paints its rows into a
/// cell buffer and writes only the cells that changed since the last frame.
pub struct TerminalSurface {
    stdout: io::Stdout,
    mirror: MemorySurface,
    current_buffer: Buffer,
    previous_buffer: Buffer,
    scroll: usize,
}

impl TerminalSurface {
    pub fn new() -> Result<Self, SurfaceError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(SurfaceError::Unavailable(
                "stdout is not a terminal".to_string(),
            ));
        }

        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

        let (width, height) = terminal::size()?;

        Ok(Self {
            stdout,
            mirror: MemorySurface::new(),
            current_buffer: Buffer::new(width, height),
            previous_buffer: Buffer::new(width, height),
            scroll: 0,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.current_buffer.width(), self.current_buffer.height())
    }

    pub fn mirror(&self) -> &MemorySurface {
        &self.mirror
    }

    /// Repaint the mounted tree, writing only changed cells.
    pub fn redraw(&mut self) -> Result<(), SurfaceError> {
        let (width, height) = terminal::size()?;
        if width != self.current_buffer.width() || height != self.current_buffer.height() {
            self.current_buffer = Buffer::new(width, height);
            self.previous_buffer = Buffer::new(width, height);
            execute!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
        }

        self.current_buffer.clear();
        let lines = self.mirror.lines();
        self.current_buffer.paint_lines(&lines, self.scroll);

        self.flush_diff()?;
        std::mem::swap(&mut self.current_buffer, &mut self.previous_buffer);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_x = u16::MAX;
        let mut last_y = u16::MAX;
        let mut last_char_width: u16 = 1;
        let mut last_fg = Rgb::new(255, 255, 255);
        let mut last_bg = Rgb::new(0, 0, 0);
        let mut last_bold = false;

        execute!(self.stdout, SetAttribute(Attribute::Reset))?;

        for (x, y, cell) in self.current_buffer.diff(&self.previous_buffer) {
            if cell.wide_continuation {
                continue;
            }

            if y != last_y || x != last_x.wrapping_add(last_char_width) {
                execute!(self.stdout, cursor::MoveTo(x, y))?;
            }

            if cell.fg != last_fg {
                execute!(
                    self.stdout,
                    SetForegroundColor(CtColor::Rgb {
                        r: cell.fg.r,
                        g: cell.fg.g,
                        b: cell.fg.b,
                    })
                )?;
                last_fg = cell.fg;
            }

            if cell.bg != last_bg {
                execute!(
                    self.stdout,
                    SetBackgroundColor(CtColor::Rgb {
                        r: cell.bg.r,
                        g: cell.bg.g,
                        b: cell.bg.b,
                    })
                )?;
                last_bg = cell.bg;
            }

            if cell.bold != last_bold {
                if cell.bold {
                    execute!(self.stdout, SetAttribute(Attribute::Bold))?;
                } else {
                    execute!(self.stdout, SetAttribute(Attribute::NormalIntensity))?;
                }
                last_bold = cell.bold;
            }

            write!(self.stdout, "{}", cell.char)?;

            last_x = x;
            last_y = y;
            last_char_width = char_width(cell.char).max(1) as u16;
        }

        execute!(self.stdout, SetAttribute(Attribute::Reset))?;
        self.stdout.flush()
    }
}

impl Surface for TerminalSurface {
    fn mount(&mut self, root: Rc<Element>) -> Result<(), SurfaceError> {
        self.mirror.mount(root)?;
        self.redraw()
    }

    fn patch(&mut self, patches: &[Patch]) -> Result<(), SurfaceError> {
        self.mirror.patch(patches)?;
        self.redraw()
    }

    fn scroll_to(&mut self, key: &str) -> Result<(), SurfaceError> {
        let lines = self.mirror.lines();
        let Some(row) = lines.iter().position(|line| line.key == key) else {
            return Ok(());
        };
        let height = self.current_buffer.height().max(1) as usize;
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
        self.redraw()
    }

    fn unmount(&mut self) {
        self.mirror.unmount();
        self.scroll = 0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
