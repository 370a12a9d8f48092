/// Half-block presenter for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::{Framebuffer, PixelBuffer, Surface};
use std::io::{self, Write};

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// Pixel rows per terminal row
pub const ROWS_PER_CELL: usize = 2;

fn rgb(pixel: u32) -> Color {
    Color::Rgb {
        r: (pixel >> 16) as u8,
        g: (pixel >> 8) as u8,
        b: pixel as u8,
    }
}

/// Presents pixel buffers as 24-bit coloured half blocks, with a status line on top
pub struct TerminalSurface<W: Write> {
    out: W,
    status: String,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status: String::new(),
        }
    }

    /// Text drawn over the first row of the next frame
    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, frame: &PixelBuffer) -> io::Result<()> {
        let width = frame.width();
        let cells = (frame.height() + ROWS_PER_CELL - 1) / ROWS_PER_CELL;

        for row in 0..cells {
            self.out.queue(cursor::MoveTo(0, row as u16))?;
            let mut current: Option<(u32, u32)> = None;
            for x in 0..width {
                let top = frame.get(x, row * ROWS_PER_CELL).unwrap_or(0);
                let bottom = frame.get(x, row * ROWS_PER_CELL + 1).unwrap_or(0);

                // Only emit colour changes
                if current != Some((top, bottom)) {
                    self.out.queue(SetForegroundColor(rgb(top)))?;
                    self.out.queue(SetBackgroundColor(rgb(bottom)))?;
                    current = Some((top, bottom));
                }
                self.out.queue(Print(HALF_BLOCK))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    type Error = io::Error;

    fn present(&mut self, frame: &PixelBuffer) -> io::Result<()> {
        self.draw(frame)?;

        if !self.status.is_empty() {
            let status: String = self.status.chars().take(frame.width()).collect();
            self.out.queue(cursor::MoveTo(0, 0))?;
            self.out.queue(SetForegroundColor(Color::Yellow))?;
            self.out.queue(Print(status))?;
            self.out.queue(ResetColor)?;
        }

        self.out.flush()
    }
}
