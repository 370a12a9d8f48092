/// Terminal host for the mesh viewer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self},
};
use log::{info, warn};
use meshview_core::{
    Camera, ConfigError, Flow, InputEvent, Key, Mesh, MeshError, PixelBuffer, Viewer, ViewerConfig,
};
use std::io::{self, stdout, Stdout, Write};
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod renderer;

pub use renderer::{TerminalSurface, ROWS_PER_CELL};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Pixel size of the framebuffer for a terminal of `cols` x `rows` cells
pub fn framebuffer_size(cols: u16, rows: u16) -> (usize, usize) {
    (cols.max(1) as usize, rows.max(1) as usize * ROWS_PER_CELL)
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Key::W,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            'r' => Key::R,
            'l' => Key::L,
            'q' => Key::Q,
            _ => Key::Other,
        },
        _ => Key::Other,
    }
}

/// Translate a terminal event into a viewer event.
///
/// Mouse rows are scaled to pixel rows so drags rotate at the same rate
/// horizontally and vertically.
pub fn translate_event(event: &Event) -> Option<InputEvent> {
    match *event {
        Event::Key(KeyEvent { code, kind, .. }) => match kind {
            KeyEventKind::Press => Some(InputEvent::KeyDown(map_key(code))),
            KeyEventKind::Release => Some(InputEvent::KeyUp(map_key(code))),
            // Held keys already set their intent
            KeyEventKind::Repeat => None,
        },
        Event::Mouse(MouseEvent {
            kind, column, row, ..
        }) => {
            let x = column as i32;
            let y = row as i32 * ROWS_PER_CELL as i32;
            match kind {
                MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::MousePress { x, y }),
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    Some(InputEvent::MouseMove { x, y })
                }
                MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::MouseRelease { x, y }),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Overlay text: frame rate, camera pose and the controls
pub fn status_line(fps: f32, camera: &Camera) -> String {
    let p = camera.position;
    let r = camera.orientation;
    format!(
        "meshview | FPS: {:.1} | Pos ({:.2}, {:.2}, {:.2}) Rot ({:.2}, {:.2}, {:.2}) | WASD/Arrows=Move Drag=Look R=Reset Q=Quit",
        fps, p.x, p.y, p.z, r.x, r.y, r.z
    )
}

/// Undo the screen changes made for the viewer.
///
/// Every step is attempted; the first failure is returned.
fn restore_screen<W: Write>(out: &mut W, keyboard_enhanced: bool) -> io::Result<()> {
    let popped = if keyboard_enhanced {
        execute!(out, PopKeyboardEnhancementFlags)
    } else {
        Ok(())
    };
    let left = execute!(out, DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show);
    popped.and(left)
}

/// Raw mode and alternate screen, restored when dropped
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on an early return drops the guard and restores the terminal
        let mut guard = Self {
            keyboard_enhanced: false,
        };

        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.keyboard_enhanced = true;
        }

        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_screen(&mut stdout(), self.keyboard_enhanced) {
            warn!("Failed to restore terminal screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
    }
}

/// Main application struct for terminal mesh viewing
pub struct TerminalApp {
    viewer: Viewer,
    buffer: PixelBuffer,
    surface: TerminalSurface<Stdout>,
    running: bool,
    /// The terminal reports key releases; otherwise every press is a one-frame tap
    key_releases: bool,
    start: Instant,
    last_fps: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: &ViewerConfig) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let (width, height) = framebuffer_size(cols, rows);

        Ok(Self {
            viewer: Viewer::with_size(mesh, config, width, height),
            buffer: PixelBuffer::new(width, height),
            surface: TerminalSurface::new(stdout()),
            running: true,
            key_releases: false,
            start: Instant::now(),
            last_fps: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        let guard = TerminalGuard::enter()?;
        self.key_releases = guard.keyboard_enhanced;
        if !self.key_releases {
            warn!("Terminal does not report key releases; movement keys act as taps");
        }

        self.main_loop()
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain input before touching the camera
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            self.surface.set_status(status_line(self.fps, self.viewer.camera()));
            let now = self.start.elapsed().as_secs_f64();
            self.viewer.frame(now, &mut self.buffer, &mut self.surface)?;

            if !self.key_releases {
                self.viewer.camera_mut().intent.clear();
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps).as_secs_f32();
                self.frame_count = 0;
                self.last_fps = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Resize(cols, rows) = event {
            let (width, height) = framebuffer_size(cols, rows);
            self.buffer.resize(width, height);
            self.viewer.resize(width, height);
            info!("Resized to {}x{} pixels", width, height);
            return;
        }

        if let Some(input) = translate_event(&event) {
            if self.viewer.handle_event(input) == Flow::Quit {
                self.running = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_key_translation() {
        assert_eq!(
            translate_event(&key(KeyCode::Char('W'), KeyEventKind::Press)),
            Some(InputEvent::KeyDown(Key::W))
        );
        assert_eq!(
            translate_event(&key(KeyCode::Left, KeyEventKind::Release)),
            Some(InputEvent::KeyUp(Key::Left))
        );
        assert_eq!(translate_event(&key(KeyCode::Char('w'), KeyEventKind::Repeat)), None);
        assert_eq!(
            translate_event(&key(KeyCode::Tab, KeyEventKind::Press)),
            Some(InputEvent::KeyDown(Key::Other))
        );
    }

    #[test]
    fn test_mouse_translation_scales_rows() {
        assert_eq!(
            translate_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 4)),
            Some(InputEvent::MousePress { x: 10, y: 8 })
        );
        assert_eq!(
            translate_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 12, 5)),
            Some(InputEvent::MouseMove { x: 12, y: 10 })
        );
        assert_eq!(
            translate_event(&mouse(MouseEventKind::Up(MouseButton::Left), 12, 5)),
            Some(InputEvent::MouseRelease { x: 12, y: 10 })
        );
        assert_eq!(translate_event(&mouse(MouseEventKind::ScrollUp, 0, 0)), None);
    }

    #[test]
    fn test_framebuffer_size() {
        assert_eq!(framebuffer_size(80, 24), (80, 48));
        assert_eq!(framebuffer_size(0, 0), (1, 2));
    }

    /// Rejects the first write, records the rest
    struct FlakyWriter {
        fail_next: bool,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if std::mem::take(&mut self.fail_next) {
                return Err(io::Error::new(io::ErrorKind::Other, "broken pipe"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_restore_continues_after_failed_step() {
        let mut out = FlakyWriter {
            fail_next: true,
            written: Vec::new(),
        };
        assert!(restore_screen(&mut out, true).is_err());

        let written = String::from_utf8(out.written).unwrap();
        assert!(written.contains("\x1b[?1049l"), "alternate screen not left");
        assert!(written.contains("\x1b[?25h"), "cursor not shown");
    }

    #[test]
    fn test_restore_without_keyboard_enhancement() {
        let mut out = Vec::new();
        restore_screen(&mut out, false).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(!written.contains("\x1b[<1u"));
        assert!(written.contains("\x1b[?1049l"));
    }

    #[test]
    fn test_status_line_shows_pose() {
        let mut camera = Camera::default();
        camera.orientation.y = 0.5;
        let status = status_line(29.96, &camera);
        assert!(status.contains("FPS: 30.0"));
        assert!(status.contains("Pos (0.00, 0.00, 1.50)"));
        assert!(status.contains("Rot (0.00, 0.50, 0.00)"));
    }
}
