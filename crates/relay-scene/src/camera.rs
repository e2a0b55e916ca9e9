use glam::{Mat4, Vec3};

/// Perspective camera. `view_proj` produces a wgpu-clip-space (z in 0..1)
/// matrix ready for the camera uniform.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Camera {
    /// The viewing setup shared by all experiment variants: 45° vertical fov,
    /// looking at the middle of the quad stack.
    pub fn standard(aspect: f32) -> Self {
        Self {
            fov_y_deg: 45.0,
            aspect,
            near: 0.1,
            far: 50.0,
            eye: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::new(0.0, 0.0, 3.0),
        }
    }

    /// Oblique variant of the standard camera, offset so the quads no longer
    /// project concentrically.
    pub fn oblique(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(-5.0, -3.0, 8.0),
            ..Self::standard(aspect)
        }
    }

    pub fn view_proj(&self) -> [f32; 16] {
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        (proj * view).to_cols_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn target_projects_to_ndc_center() {
        let camera = Camera::standard(1.0);
        let vp = Mat4::from_cols_array(&camera.view_proj());
        let clip = vp * Vec4::new(0.0, 0.0, 3.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn nearer_quad_has_smaller_depth() {
        // Camera sits at z=8: the quad at z=3 is closest, z=1 farthest.
        let camera = Camera::standard(1.0);
        let vp = Mat4::from_cols_array(&camera.view_proj());
        let ndc_z = |z: f32| {
            let clip = vp * Vec4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert!(ndc_z(3.0) < ndc_z(2.0));
        assert!(ndc_z(2.0) < ndc_z(1.0));
    }
}
