/// Desktop window host for the mesh viewer
///
/// minifb only exposes polled keyboard and mouse state, so each frame the
/// host diffs that state into discrete viewer events.

use log::info;
use meshview_core::{
    ConfigError, Flow, Framebuffer, InputEvent, Key, Mesh, MeshError, PixelBuffer, Surface, Viewer,
    ViewerConfig,
};
use minifb::{KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn map_key(key: minifb::Key) -> Key {
    use minifb::Key as K;
    match key {
        K::Up => Key::Up,
        K::Down => Key::Down,
        K::Left => Key::Left,
        K::Right => Key::Right,
        K::W => Key::W,
        K::A => Key::A,
        K::S => Key::S,
        K::D => Key::D,
        K::R => Key::R,
        K::L => Key::L,
        K::Q => Key::Q,
        K::Escape => Key::Escape,
        _ => Key::Other,
    }
}

/// Turns sampled left-button state into press / move / release events
#[derive(Debug, Default)]
pub struct MouseTracker {
    down: bool,
    last: Option<(i32, i32)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for one sample. A missing position keeps the last known one.
    pub fn sample(&mut self, down: bool, position: Option<(f32, f32)>) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let current = position.map(|(x, y)| (x as i32, y as i32)).or(self.last);
        let Some((x, y)) = current else {
            return events;
        };

        match (self.down, down) {
            (false, true) => events.push(InputEvent::MousePress { x, y }),
            (true, true) if self.last != Some((x, y)) => events.push(InputEvent::MouseMove { x, y }),
            (true, false) => events.push(InputEvent::MouseRelease { x, y }),
            _ => {}
        }

        self.down = down;
        self.last = Some((x, y));
        events
    }
}

/// A minifb window used as the viewer's presentation surface
pub struct WindowSurface {
    window: Window,
}

impl WindowSurface {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self, minifb::Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(Duration::from_micros(16600)));
        Ok(Self { window })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Surface for WindowSurface {
    type Error = minifb::Error;

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), minifb::Error> {
        self.window
            .update_with_buffer(frame.pixels(), frame.width(), frame.height())
    }
}

/// Main application struct for windowed mesh viewing
pub struct WindowApp {
    viewer: Viewer,
    buffer: PixelBuffer,
    surface: WindowSurface,
    mouse: MouseTracker,
    start: Instant,
}

impl WindowApp {
    pub fn new(mesh: Mesh, config: &ViewerConfig) -> Result<Self, AppError> {
        let (width, height) = (config.window.width, config.window.height);
        let surface = WindowSurface::open(&config.window.title, width, height)?;
        info!("Opened {}x{} window \"{}\"", width, height, config.window.title);

        Ok(Self {
            viewer: Viewer::new(mesh, config),
            buffer: PixelBuffer::new(width, height),
            surface,
            mouse: MouseTracker::new(),
            start: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        while self.surface.window().is_open() {
            if self.poll_input() == Flow::Quit {
                break;
            }

            let now = self.start.elapsed().as_secs_f64();
            self.viewer.frame(now, &mut self.buffer, &mut self.surface)?;
        }
        Ok(())
    }

    /// Apply everything that changed since the last presented frame
    fn poll_input(&mut self) -> Flow {
        let window = &self.surface.window;

        let mut events: Vec<InputEvent> = window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .map(|key| InputEvent::KeyDown(map_key(key)))
            .collect();
        events.extend(
            window
                .get_keys_released()
                .into_iter()
                .map(|key| InputEvent::KeyUp(map_key(key))),
        );
        events.extend(self.mouse.sample(
            window.get_mouse_down(MouseButton::Left),
            window.get_mouse_pos(MouseMode::Pass),
        ));

        for event in events {
            if self.viewer.handle_event(event) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }
}
