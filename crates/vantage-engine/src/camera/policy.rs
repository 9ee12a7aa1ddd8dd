use glam::Vec3;

/// Eye moving on a circle in the XY plane at a fixed height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Fixed z coordinate of the eye.
    pub height: f32,
    pub center: Vec3,
    pub up: Vec3,
}

impl Orbit {
    /// Eye position at `angle` radians: `(cos * r, sin * r, height)`.
    pub fn eye(&self, angle: f32) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(cos * self.radius, sin * self.radius, self.height)
    }
}

/// How the view matrix evolves over a surface session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraPolicy {
    /// View built once at surface creation.
    Fixed { eye: Vec3, center: Vec3, up: Vec3 },
    /// View rebuilt every frame from the animation angle.
    Orbit(Orbit),
}

impl CameraPolicy {
    #[inline]
    pub fn is_animated(&self) -> bool {
        matches!(self, CameraPolicy::Orbit(_))
    }

    /// `(eye, center, up)` at `angle` radians. Fixed cameras ignore the angle.
    pub fn look_at(&self, angle: f32) -> (Vec3, Vec3, Vec3) {
        match *self {
            CameraPolicy::Fixed { eye, center, up } => (eye, center, up),
            CameraPolicy::Orbit(orbit) => (orbit.eye(angle), orbit.center, orbit.up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const ORBIT: Orbit = Orbit {
        radius: 4.0,
        height: 4.0,
        center: Vec3::ZERO,
        up: Vec3::Y,
    };

    #[test]
    fn orbit_eye_at_zero_angle() {
        assert!(ORBIT.eye(0.0).abs_diff_eq(Vec3::new(4.0, 0.0, 4.0), 1e-6));
    }

    #[test]
    fn orbit_eye_at_half_turn() {
        let eye = ORBIT.eye(PI);
        assert!(eye.abs_diff_eq(Vec3::new(-4.0, 0.0, 4.0), 1e-5));
    }

    #[test]
    fn orbit_eye_keeps_radius_and_height() {
        for i in 0..16 {
            let eye = ORBIT.eye(i as f32 * PI / 8.0);
            assert!((eye.truncate().length() - 4.0).abs() < 1e-5);
            assert_eq!(eye.z, 4.0);
        }
    }

    #[test]
    fn fixed_policy_ignores_angle() {
        let policy = CameraPolicy::Fixed {
            eye: Vec3::new(0.0, 0.0, 3.0),
            center: Vec3::ZERO,
            up: Vec3::Y,
        };
        assert_eq!(policy.look_at(0.0), policy.look_at(1.0));
        assert!(!policy.is_animated());
    }
}
