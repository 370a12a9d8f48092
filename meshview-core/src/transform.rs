/// Camera orientation and the rotation primitive
use nalgebra::{Rotation3, Vector3};

/// Euler angles of the camera, in radians
///
/// `x` pitches, `y` yaws and `z` rolls. Angles accumulate without clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Orientation {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Accumulate pitch, yaw and roll deltas
    pub fn rotate(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.x += pitch;
        self.y += yaw;
        self.z += roll;
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::zero()
    }
}

/// Compose the three axis rotations: Y by `ry` first, then X by `rx`, then Z by `rz`.
pub fn rotation(rx: f32, ry: f32, rz: f32) -> Rotation3<f32> {
    let x = Rotation3::from_axis_angle(&Vector3::x_axis(), rx);
    let y = Rotation3::from_axis_angle(&Vector3::y_axis(), ry);
    let z = Rotation3::from_axis_angle(&Vector3::z_axis(), rz);

    // Applied right to left
    z * x * y
}

/// Rotate `v` about Y, then X, then Z.
///
/// The order is fixed: callers undo part of a rotation by issuing separate
/// calls with negated angles, which only works with this exact composition.
pub fn rotate3d(v: Vector3<f32>, rx: f32, ry: f32, rz: f32) -> Vector3<f32> {
    rotation(rx, ry, rz) * v
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_zero_angles_are_identity() {
        let v = Vector3::new(1.5, -2.0, 7.25);
        assert_relative_eq!(rotate3d(v, 0.0, 0.0, 0.0), v, epsilon = 1e-6);
        assert_relative_eq!(*rotation(0.0, 0.0, 0.0).matrix(), nalgebra::Matrix3::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_sequence_round_trips() {
        let v = Vector3::new(0.3, -1.2, 4.0);
        let (rx, ry, rz) = (0.7, -1.3, 2.1);

        let rotated = rotate3d(v, rx, ry, rz);
        let back = rotate3d(rotate3d(rotate3d(rotated, 0.0, 0.0, -rz), -rx, 0.0, 0.0), 0.0, -ry, 0.0);
        assert_relative_eq!(back, v, epsilon = 1e-5);
    }

    #[test]
    fn test_axis_conventions() {
        // Yaw moves +Z towards +X
        let yawed = rotate3d(Vector3::z(), 0.0, FRAC_PI_2, 0.0);
        assert_relative_eq!(yawed, Vector3::x(), epsilon = 1e-6);

        // Pitch moves +Y towards +Z
        let pitched = rotate3d(Vector3::y(), FRAC_PI_2, 0.0, 0.0);
        assert_relative_eq!(pitched, Vector3::z(), epsilon = 1e-6);

        // Roll moves +X towards +Y
        let rolled = rotate3d(Vector3::x(), 0.0, 0.0, FRAC_PI_2);
        assert_relative_eq!(rolled, Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_yaw_applies_before_pitch() {
        // +Z yawed onto +X is unaffected by the following pitch about X
        let v = rotate3d(Vector3::z(), FRAC_PI_2, FRAC_PI_2, 0.0);
        assert_relative_eq!(v, Vector3::x(), epsilon = 1e-6);
    }
}
