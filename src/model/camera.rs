use glam::{Mat4, Vec2, Vec3};

/// Perspective camera looking down -z, parented to a [`CameraRig`].
///
/// `local` is the camera's position inside the rig. Scrolling writes
/// `local.y`; `local.z` is the fixed viewing depth and is never touched
/// after setup.
pub struct Camera {
    pub local: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(fov_y_deg: f32, width: u32, height: u32, z_near: f32, z_far: f32, depth: f32) -> Self {
        Self {
            local: Vec3::new(0.0, 0.0, depth),
            fov_y: fov_y_deg.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near,
            z_far,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// World-space eye position once the rig offset is applied
    pub fn eye(&self, rig: &CameraRig) -> Vec3 {
        rig.translation() + self.local
    }

    pub fn view(&self, rig: &CameraRig) -> Mat4 {
        // The camera never rotates, so the view is a pure translation
        Mat4::from_translation(-self.eye(rig))
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self, rig: &CameraRig) -> Mat4 {
        self.projection() * self.view(rig)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Group transform that carries the camera; parallax moves only this
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraRig {
    pub position: Vec2,
}

impl CameraRig {
    pub fn translation(&self) -> Vec3 {
        self.position.extend(0.0)
    }
}
