/// Camera-space projection and near-plane culling
use log::trace;
use nalgebra::{Point3, Vector3};

use crate::camera::Camera;
use crate::framebuffer::{Color, Framebuffer};
use crate::geometry::Mesh;
use crate::raster::{fill_triangle, ScreenPoint};

/// Default near-plane depth; the camera looks down -Z
pub const DEFAULT_ZMIN: f32 = -1.0;

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub culled: usize,
}

/// Perspective projection onto a framebuffer of fixed size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Near-plane depth, negative. Triangles with any vertex above it are dropped.
    pub zmin: f32,
    /// Pixels per projected unit
    pub draw_scale: f32,
    pub width: usize,
    pub height: usize,
}

impl Projection {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            zmin: DEFAULT_ZMIN,
            draw_scale: Self::default_draw_scale(height),
            width,
            height,
        }
    }

    /// Twice the framebuffer height
    pub fn default_draw_scale(height: usize) -> f32 {
        (height * 2) as f32
    }

    pub fn with_zmin(mut self, zmin: f32) -> Self {
        self.zmin = zmin;
        self
    }

    pub fn with_draw_scale(mut self, draw_scale: f32) -> Self {
        self.draw_scale = draw_scale;
        self
    }

    /// True when any vertex lies above the near plane.
    ///
    /// All-or-nothing: a triangle crossing the plane is dropped whole.
    pub fn is_culled(&self, triangle: &[Vector3<f32>; 3]) -> bool {
        triangle.iter().any(|v| v.z > self.zmin)
    }

    /// Perspective divide and viewport mapping of a camera-space point
    pub fn to_screen(&self, v: Vector3<f32>) -> ScreenPoint {
        let factor = self.zmin / v.z;
        let x = v.x * factor;
        let y = v.y * factor;
        ScreenPoint::rounded(
            x * self.draw_scale + (self.width / 2) as f32,
            y * self.draw_scale + (self.height / 2) as f32,
        )
    }

    /// Project a mesh triangle, `None` when it is culled.
    ///
    /// The mesh's Y axis points up; it is flipped here to match screen rows.
    pub fn project_triangle(&self, camera: &Camera, triangle: [Point3<f32>; 3]) -> Option<[ScreenPoint; 3]> {
        let view = triangle.map(|p| camera.to_camera_space(Point3::new(p.x, -p.y, p.z)));
        if self.is_culled(&view) {
            return None;
        }
        Some(view.map(|v| self.to_screen(v)))
    }

    /// Project, cull and fill every face of `mesh`
    pub fn render_mesh<F: Framebuffer + ?Sized>(
        &self,
        mesh: &Mesh,
        camera: &Camera,
        target: &mut F,
        color: Color,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        for face in 0..mesh.face_count() {
            match self.project_triangle(camera, mesh.triangle(face)) {
                Some(points) => {
                    fill_triangle(target, points, color);
                    stats.drawn += 1;
                }
                None => stats.culled += 1,
            }
        }
        trace!("Frame: {} drawn, {} culled", stats.drawn, stats.culled);
        stats
    }
}
