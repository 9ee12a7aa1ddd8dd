use glam::Vec3;

use crate::coords::{look_at, Matrix4, Viewport};

use super::{CameraPolicy, FrustumConfig, FrustumExtents, InvalidFrustumError};

/// Owns the view and projection matrices of one surface session.
///
/// Readers get them by value; only the rig's own methods mutate them.
#[derive(Debug, Clone)]
pub struct CameraRig {
    policy: CameraPolicy,
    frustum: FrustumConfig,
    view: Matrix4,
    projection: Matrix4,
    extents: FrustumExtents,
}

impl CameraRig {
    /// Builds the initial view (angle 0) and a projection for `viewport`.
    pub fn new(
        policy: CameraPolicy,
        frustum: FrustumConfig,
        viewport: Viewport,
    ) -> Result<Self, InvalidFrustumError> {
        let extents = FrustumExtents::for_viewport(viewport, frustum)?;
        let (eye, center, up) = policy.look_at(0.0);

        Ok(Self {
            policy,
            frustum,
            view: Self::build_view(eye, center, up),
            projection: extents.matrix(),
            extents,
        })
    }

    /// Look-at view matrix. `up` must not be parallel to `center - eye`.
    pub fn build_view(eye: Vec3, center: Vec3, up: Vec3) -> Matrix4 {
        debug_assert!(
            (center - eye).cross(up).length_squared() > f32::EPSILON,
            "camera up vector is parallel to the view direction"
        );
        look_at(eye, center, up)
    }

    /// Aspect-corrected symmetric frustum.
    pub fn build_projection(
        width: u32,
        height: u32,
        near: f32,
        far: f32,
        half_extent: f32,
    ) -> Result<Matrix4, InvalidFrustumError> {
        let config = FrustumConfig {
            near,
            far,
            half_extent,
        };
        Ok(FrustumExtents::for_viewport(Viewport::new(width, height), config)?.matrix())
    }

    /// Rebuilds the projection for a new viewport.
    ///
    /// On error the previous projection is kept untouched.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), InvalidFrustumError> {
        let extents = FrustumExtents::for_viewport(viewport, self.frustum)?;
        self.projection = extents.matrix();
        self.extents = extents;
        Ok(())
    }

    /// Moves an orbiting eye to `angle` radians. No-op for fixed cameras.
    pub fn advance(&mut self, angle: f32) {
        if let CameraPolicy::Orbit(orbit) = self.policy {
            self.view = Self::build_view(orbit.eye(angle), orbit.center, orbit.up);
        }
    }

    #[inline]
    pub fn view(&self) -> Matrix4 {
        self.view
    }

    #[inline]
    pub fn projection(&self) -> Matrix4 {
        self.projection
    }

    #[inline]
    pub fn extents(&self) -> FrustumExtents {
        self.extents
    }

    #[inline]
    pub fn policy(&self) -> &CameraPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Orbit;

    fn orbiting() -> CameraRig {
        let policy = CameraPolicy::Orbit(Orbit {
            radius: 4.0,
            height: 4.0,
            center: Vec3::ZERO,
            up: Vec3::Y,
        });
        CameraRig::new(policy, FrustumConfig::default(), Viewport::new(800, 600)).unwrap()
    }

    #[test]
    fn failed_resize_keeps_last_projection() {
        let mut rig = orbiting();
        let before = rig.projection();

        let err = rig.resize(Viewport::new(0, 0)).unwrap_err();
        assert_eq!(
            err,
            InvalidFrustumError::Viewport {
                width: 0,
                height: 0,
            }
        );
        assert_eq!(rig.projection(), before);
    }

    #[test]
    fn resize_replaces_projection() {
        let mut rig = orbiting();
        let before = rig.projection();
        rig.resize(Viewport::new(600, 800)).unwrap();
        assert_ne!(rig.projection(), before);
        assert_eq!(
            rig.projection(),
            CameraRig::build_projection(600, 800, 2.0, 12.0, 1.0).unwrap()
        );
    }

    #[test]
    fn advance_moves_orbiting_eye() {
        let mut rig = orbiting();
        rig.advance(std::f32::consts::PI);

        // The eye maps to the origin of view space.
        let eye = Vec3::new(-4.0, 0.0, 4.0);
        assert!(rig.view().transform_point3(eye).abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn advance_leaves_fixed_view_alone() {
        let policy = CameraPolicy::Fixed {
            eye: Vec3::new(0.0, 0.0, 3.0),
            center: Vec3::ZERO,
            up: Vec3::Y,
        };
        let mut rig =
            CameraRig::new(policy, FrustumConfig::default(), Viewport::new(1, 1)).unwrap();
        let before = rig.view();
        rig.advance(1.0);
        assert_eq!(rig.view(), before);
    }
}
