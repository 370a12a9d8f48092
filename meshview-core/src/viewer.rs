/// Frame driver tying mesh, camera and projection together
use log::info;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::framebuffer::{Color, Framebuffer, PixelBuffer, Surface};
use crate::geometry::Mesh;
use crate::input::{binding, Action, Flow, InputEvent};
use crate::projection::{FrameStats, Projection};

/// Turns monotonic timestamps into per-frame deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick; zero on the first tick or if time runs backwards
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        dt
    }
}

/// The interactive viewer: owns the mesh and camera, renders frames on demand
pub struct Viewer {
    mesh: Mesh,
    camera: Camera,
    projection: Projection,
    clock: FrameClock,
    fill: Color,
    background: Color,
    draw_scale_override: Option<f32>,
}

impl Viewer {
    pub fn new(mesh: Mesh, config: &ViewerConfig) -> Self {
        Self::with_size(mesh, config, config.window.width, config.window.height)
    }

    /// Build for a framebuffer size other than the configured window
    pub fn with_size(mesh: Mesh, config: &ViewerConfig, width: usize, height: usize) -> Self {
        Self {
            mesh,
            camera: Camera::new(config.camera.settings()),
            projection: config.projection.projection(width, height),
            clock: FrameClock::new(),
            fill: config.colors.fill,
            background: config.colors.background,
            draw_scale_override: config.projection.draw_scale,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Follow a framebuffer resize, keeping a configured draw scale
    pub fn resize(&mut self, width: usize, height: usize) {
        self.projection.width = width;
        self.projection.height = height;
        if self.draw_scale_override.is_none() {
            self.projection.draw_scale = Projection::default_draw_scale(height);
        }
    }

    /// Apply one input event to the camera
    pub fn handle_event(&mut self, event: InputEvent) -> Flow {
        match event {
            InputEvent::KeyDown(key) => match binding(key) {
                Some(Action::Move(direction)) => self.camera.intent.set(direction, true),
                Some(Action::Reset) => self.camera.reset(),
                Some(Action::LogPose) => self.log_pose(),
                Some(Action::Quit) => return Flow::Quit,
                None => {}
            },
            InputEvent::KeyUp(key) => {
                if let Some(Action::Move(direction)) = binding(key) {
                    self.camera.intent.set(direction, false);
                }
            }
            InputEvent::MousePress { x, y } => self.camera.press(x, y),
            InputEvent::MouseMove { x, y } => self.camera.drag_to(x, y),
            InputEvent::MouseRelease { .. } => self.camera.release(),
        }
        Flow::Continue
    }

    fn log_pose(&self) {
        let p = self.camera.position;
        let r = self.camera.orientation;
        info!(
            "Position: ({:.2}, {:.2}, {:.2}) - Rotation: ({:.2}, {:.2}, {:.2})",
            p.x, p.y, p.z, r.x, r.y, r.z
        );
    }

    /// Advance the camera to time `now` (monotonic seconds)
    pub fn update(&mut self, now: f64) {
        let dt = self.clock.tick(now);
        self.camera.update(dt);
    }

    /// Clear `target` and draw every visible face into it
    pub fn render<F: Framebuffer + ?Sized>(&self, target: &mut F) -> FrameStats {
        target.clear(self.background);
        self.projection.render_mesh(&self.mesh, &self.camera, target, self.fill)
    }

    /// One full frame: update, render into `buffer`, present on `surface`
    pub fn frame<S: Surface>(
        &mut self,
        now: f64,
        buffer: &mut PixelBuffer,
        surface: &mut S,
    ) -> Result<FrameStats, S::Error> {
        self.update(now);
        let stats = self.render(buffer);
        surface.present(buffer)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::obj::parse_obj;
    use nalgebra::Point3;

    const TRIANGLE: &str = "v 0 0 -5\nv 1 0 -5\nv 0 1 -5\nf 1 2 3\n";

    fn viewer() -> Viewer {
        let mesh = parse_obj(TRIANGLE).unwrap();
        let mut viewer = Viewer::new(mesh, &ViewerConfig::default());
        viewer.camera_mut().position = Point3::origin();
        viewer
    }

    #[derive(Default)]
    struct RecordingSurface {
        frames: Vec<Vec<u32>>,
    }

    impl Surface for RecordingSurface {
        type Error = std::convert::Infallible;

        fn present(&mut self, frame: &PixelBuffer) -> Result<(), Self::Error> {
            self.frames.push(frame.pixels().to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(10.0), 0.0);
        assert_eq!(clock.tick(10.5), 0.5);
        assert_eq!(clock.tick(10.25), 0.0);
    }

    #[test]
    fn test_end_to_end_single_face() {
        let mut viewer = viewer();
        let mut buffer = PixelBuffer::new(512, 512);
        let mut surface = RecordingSurface::default();

        let stats = viewer.frame(0.0, &mut buffer, &mut surface).unwrap();
        assert_eq!(stats.drawn, 1);
        assert_eq!(surface.frames.len(), 1);

        let red = Color::RED.to_rgb();
        let lit: Vec<(usize, usize)> = (0..512)
            .flat_map(|y| (0..512).map(move |x| (x, y)))
            .filter(|&(x, y)| buffer.get(x, y) == Some(red))
            .collect();
        assert!(!lit.is_empty());

        // Everything lies within draw_scale * 0.2 of the centre
        let reach = 1024.0 * 0.2 + 1.0;
        for &(x, y) in &lit {
            assert!((x as f32 - 256.0).abs() <= reach);
            assert!((y as f32 - 256.0).abs() <= reach);
        }
    }

    #[test]
    fn test_keys_drive_movement() {
        let mut viewer = viewer();
        viewer.update(0.0);

        viewer.handle_event(InputEvent::KeyDown(Key::A));
        viewer.handle_event(InputEvent::KeyDown(Key::Right));
        viewer.update(1.0);
        assert_eq!(viewer.camera().position.x, 0.0);

        viewer.handle_event(InputEvent::KeyUp(Key::Right));
        viewer.update(1.5);
        assert!((viewer.camera().position.x + 1.0).abs() < 1e-6);

        viewer.handle_event(InputEvent::KeyUp(Key::A));
        viewer.update(3.0);
        assert!((viewer.camera().position.x + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_and_quit_keys() {
        let mut viewer = viewer();
        viewer.camera_mut().orientation.y = 1.0;
        assert_eq!(viewer.handle_event(InputEvent::KeyDown(Key::R)), Flow::Continue);
        assert_eq!(viewer.camera().position, Point3::new(0.0, 0.0, 1.5));
        assert_eq!(viewer.camera().orientation.y, 0.0);

        assert_eq!(viewer.handle_event(InputEvent::KeyDown(Key::L)), Flow::Continue);
        assert_eq!(viewer.handle_event(InputEvent::KeyDown(Key::Escape)), Flow::Quit);
    }

    #[test]
    fn test_mouse_drag_events() {
        let mut viewer = viewer();
        viewer.handle_event(InputEvent::MousePress { x: 10, y: 10 });
        viewer.handle_event(InputEvent::MouseMove { x: 10, y: 0 });
        assert!((viewer.camera().orientation.x - 0.01).abs() < 1e-6);

        viewer.handle_event(InputEvent::MouseRelease { x: 10, y: 0 });
        viewer.handle_event(InputEvent::MouseMove { x: 500, y: 500 });
        assert!((viewer.camera().orientation.x - 0.01).abs() < 1e-6);
        assert!(!viewer.camera().drag.dragging);
    }

    #[test]
    fn test_render_clears_to_background() {
        let mut viewer = viewer();
        // Face the other way: everything is culled
        viewer.camera_mut().position = Point3::new(0.0, 0.0, -10.0);
        let mut buffer = PixelBuffer::new(32, 32);
        buffer.clear(Color::new(1.0, 1.0, 1.0));

        let stats = viewer.render(&mut buffer);
        assert_eq!(stats.drawn, 0);
        assert!(buffer.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_resize_follows_height() {
        let mut viewer = viewer();
        viewer.resize(200, 100);
        assert_eq!(viewer.projection().draw_scale, 200.0);
        assert_eq!(viewer.projection().width, 200);
    }
}
