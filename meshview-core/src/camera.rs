/// Fly camera driven by movement intents and mouse drags
use log::debug;
use nalgebra::{Point3, Vector3};

use crate::transform::{rotate3d, Orientation};

/// Tunables for camera motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Position restored by [`Camera::reset`]
    pub home: Point3<f32>,
    /// World units per second
    pub movement_speed: f32,
    /// Radians per pixel of mouse drag
    pub rotation_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            home: Point3::new(0.0, 0.0, 1.5),
            movement_speed: 2.0,
            rotation_speed: 0.001,
        }
    }
}

/// A direction the camera can be asked to move in, relative to its view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
}

/// Which movement keys are currently held.
///
/// Flags are independent; holding two opposing directions cancels out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
}

impl MovementIntent {
    pub fn set(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Up => self.up = active,
            Direction::Down => self.down = active,
            Direction::Left => self.left = active,
            Direction::Right => self.right = active,
            Direction::Forward => self.forward = active,
            Direction::Backward => self.backward = active,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Camera-local displacement for one step of length `step`.
    ///
    /// Up, left and forward are negative along Y, X and Z.
    pub fn displacement(&self, step: f32) -> Vector3<f32> {
        let mut movement = Vector3::zeros();
        if self.up {
            movement.y -= step;
        }
        if self.down {
            movement.y += step;
        }
        if self.left {
            movement.x -= step;
        }
        if self.right {
            movement.x += step;
        }
        if self.forward {
            movement.z -= step;
        }
        if self.backward {
            movement.z += step;
        }
        movement
    }
}

/// Mouse drag tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    pub dragging: bool,
    pub last_x: i32,
    pub last_y: i32,
}

/// Camera position, orientation and the input state that moves them
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub orientation: Orientation,
    pub intent: MovementIntent,
    pub drag: DragState,
    settings: CameraSettings,
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            position: settings.home,
            orientation: Orientation::zero(),
            intent: MovementIntent::default(),
            drag: DragState::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Return to the home position with zero rotation
    pub fn reset(&mut self) {
        self.position = self.settings.home;
        self.orientation = Orientation::zero();
        debug!("Camera reset to {:?}", self.position);
    }

    /// Advance the position by `dt` seconds of held movement keys
    pub fn update(&mut self, dt: f32) {
        let local = self.intent.displacement(dt * self.settings.movement_speed);
        self.position += self.to_world_direction(local);
    }

    /// Bring a camera-local direction into world space.
    ///
    /// Pitch and roll are undone first, then yaw and roll, as two separate
    /// partial rotations.
    pub fn to_world_direction(&self, local: Vector3<f32>) -> Vector3<f32> {
        let Orientation { x, y, z } = self.orientation;
        let v = rotate3d(local, -x, 0.0, -z);
        rotate3d(v, 0.0, -y, -z)
    }

    /// Transform a world-space point into camera space
    pub fn to_camera_space(&self, point: Point3<f32>) -> Vector3<f32> {
        let Orientation { x, y, z } = self.orientation;
        rotate3d(point - self.position, x, y, z)
    }

    pub fn press(&mut self, x: i32, y: i32) {
        self.drag = DragState {
            dragging: true,
            last_x: x,
            last_y: y,
        };
    }

    /// Rotate by the mouse travel since the last observed position
    pub fn drag_to(&mut self, x: i32, y: i32) {
        if !self.drag.dragging {
            return;
        }

        // Vertical travel pitches, horizontal travel yaws
        let k = self.settings.rotation_speed;
        self.orientation.rotate(
            (self.drag.last_y - y) as f32 * k,
            (x - self.drag.last_x) as f32 * k,
            0.0,
        );
        self.drag.last_x = x;
        self.drag.last_y = y;
    }

    pub fn release(&mut self) {
        self.drag.dragging = false;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}
