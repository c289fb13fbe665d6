// The ephemeral evaluation camera. One of these is built per transfer
// evaluation point and thrown away again; nothing here persists.

use crate::math::matrix::Mat4;
use crate::math::vector::Vec3f;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3f,
    pub look_at: Vec3f,
    pub up: Vec3f,
}

impl Camera {
    pub fn new(eye: Vec3f, look_at: Vec3f, up: Vec3f) -> Self {
        Camera { eye, look_at, up }
    }

    /// Normalized view direction.
    pub fn look_dir(&self) -> Vec3f {
        (self.look_at - self.eye).normalize()
    }

    /// World-to-camera transform. Only valid when `up` is non-degenerate;
    /// the analytic calculator never needs it.
    pub fn view_matrix(&self) -> Mat4<f64> {
        Mat4::new_lookat(self.eye, self.look_at, self.up)
    }
}
