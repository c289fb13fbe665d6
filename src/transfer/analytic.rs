// Closed-form approximation of the transfer coefficients: inverse-square
// falloff times the emitting patch's cosine, with the receiving cosine
// folded in via the camera's look direction. No rendering context and no
// occlusion testing; every patch is assumed visible to every other.

use log::debug;
use simple_error::SimpleResult;

use crate::camera::Camera;
use crate::math::vector::Vec3;
use crate::scene::{Patch, Scene};
use crate::transfer::{TransferCalculator, TransferMatrix};

use std::f64::consts::PI;

pub struct AnalyticTransferCalculator<'a> {
    scene: &'a Scene,
}

impl<'a> AnalyticTransferCalculator<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        AnalyticTransferCalculator { scene }
    }

    /// Solid angle subtended by one patch, approximated from its centre
    /// and area. The camera must not sit exactly on the patch centre
    /// (the inverse-square term blows up).
    ///
    /// The 1.5 factor calibrates the full-sphere integral to the cube-map
    /// reference surface area of 6. The light variant below does not
    /// carry it; that asymmetry is preserved from the observed design.
    pub fn calc_single_quad_subtended(&self, cam: &Camera, patch: &Patch) -> f64 {
        let centre = patch.centre(&self.scene.vertices);
        let dir = centre - cam.eye;

        // Inverse square component.
        let l = dir.length();
        let r2 = 1. / (l * l);

        // Area, scaled by the emitting patch's angle to the camera:
        let dir = dir.scale(1. / l);
        let norm = patch.area_normal(&self.scene.vertices);
        let area = (-norm.dot(dir)).max(0.);

        1.5 * r2 * area / PI
    }

    /// As above, but additionally weighted by the receiving surface's
    /// cosine (the angle between the camera look direction and the
    /// direction to the patch), and without the 1.5 factor.
    pub fn calc_single_quad_light(&self, cam: &Camera, patch: &Patch) -> f64 {
        let centre = patch.centre(&self.scene.vertices);
        let dir = centre - cam.eye;

        // Inverse square component.
        let l = dir.length();
        let r2 = 1. / (l * l);

        // Area, scaled by the emitting patch's angle to the camera:
        let dir = dir.scale(1. / l);
        let norm = patch.area_normal(&self.scene.vertices);
        let area = (-norm.dot(dir)).max(0.);

        // And the angle to the receiving surface:
        let cos_cam_angle = cam.look_dir().dot(dir).max(0.);

        cos_cam_angle * r2 * area / PI
    }

    pub fn calc_light(&self, cam: &Camera) -> Vec<f64> {
        self.scene
            .patches
            .iter()
            .map(|p| self.calc_single_quad_light(cam, p))
            .collect()
    }
}

impl<'a> TransferCalculator for AnalyticTransferCalculator<'a> {
    fn calc_subtended(&mut self, cam: &Camera) -> SimpleResult<Vec<f64>> {
        Ok(self
            .scene
            .patches
            .iter()
            .map(|p| self.calc_single_quad_subtended(cam, p))
            .collect())
    }

    fn calc_all_lights(&mut self) -> SimpleResult<TransferMatrix> {
        let n = self.scene.patches.len();
        let mut weights = Vec::with_capacity(n * n);

        // Iterate over targets:
        for (i, patch) in self.scene.patches.iter().enumerate() {
            let eye = patch.centre(&self.scene.vertices);
            let look_at = eye + patch.normal(&self.scene.vertices);
            let cam = Camera::new(eye, look_at, Vec3::zero());

            // Iterate over sources. The diagonal is left zero; the
            // solver never reads it and patch i has no distance to
            // itself for the falloff term:
            for (j, source) in self.scene.patches.iter().enumerate() {
                if i == j {
                    weights.push(0.);
                } else {
                    weights.push(self.calc_single_quad_light(&cam, source));
                }
            }
            debug!("analytic transfer row {}/{}", i + 1, n);
        }

        Ok(TransferMatrix::from_rows(n, weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PatchFlags;
    use crate::spectrum::Color;

    // A small patch at distance `d` along +z, facing back toward the
    // origin (normal -z):
    fn facing_patch_scene(d: f64, half: f64) -> Scene {
        let mut scene = Scene::new();
        scene.push_quad(
            [
                Vec3 {
                    x: half,
                    y: -half,
                    z: d,
                },
                Vec3 {
                    x: -half,
                    y: -half,
                    z: d,
                },
                Vec3 {
                    x: -half,
                    y: half,
                    z: d,
                },
                Vec3 {
                    x: half,
                    y: half,
                    z: d,
                },
            ],
            Color::white(),
            PatchFlags::empty(),
        );
        scene
    }

    fn origin_cam() -> Camera {
        Camera::new(
            Vec3::zero(),
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
            Vec3::zero(),
        )
    }

    #[test]
    fn subtended_follows_inverse_square() {
        let near = facing_patch_scene(1.0, 0.05);
        let far = facing_patch_scene(2.0, 0.05);
        let cam = origin_cam();

        let v_near = AnalyticTransferCalculator::new(&near)
            .calc_single_quad_subtended(&cam, &near.patches[0]);
        let v_far =
            AnalyticTransferCalculator::new(&far).calc_single_quad_subtended(&cam, &far.patches[0]);

        assert!(v_near > 0.);
        // Doubling the distance quarters the value:
        assert!((v_near / v_far - 4.0).abs() < 1e-9);
    }

    #[test]
    fn subtended_matches_closed_form() {
        let d = 2.0;
        let half = 0.1;
        let scene = facing_patch_scene(d, half);
        let calc = AnalyticTransferCalculator::new(&scene);

        let v = calc.calc_single_quad_subtended(&origin_cam(), &scene.patches[0]);
        let area = (2.0 * half) * (2.0 * half);
        let expected = 1.5 * area / (d * d) / PI;
        assert!((v - expected).abs() < 1e-12);
    }

    #[test]
    fn light_drops_receiver_scale_factor() {
        let scene = facing_patch_scene(2.0, 0.1);
        let calc = AnalyticTransferCalculator::new(&scene);
        let cam = origin_cam();

        let light = calc.calc_single_quad_light(&cam, &scene.patches[0]);
        let subtended = calc.calc_single_quad_subtended(&cam, &scene.patches[0]);
        // Head-on both cosine terms are 1, so the only difference is the
        // 1.5 calibration factor:
        assert!((subtended / light - 1.5).abs() < 1e-9);
    }

    #[test]
    fn patch_behind_camera_contributes_nothing() {
        let scene = facing_patch_scene(-2.0, 0.1);
        let calc = AnalyticTransferCalculator::new(&scene);
        assert_eq!(
            calc.calc_single_quad_light(&origin_cam(), &scene.patches[0]),
            0.0
        );
    }

    #[test]
    fn matrix_entries_are_nonnegative() {
        // A little open box of three mutually visible walls:
        let mut scene = facing_patch_scene(2.0, 0.3);
        scene.push_quad(
            [
                Vec3 {
                    x: -0.3,
                    y: -0.3,
                    z: -1.0,
                },
                Vec3 {
                    x: 0.3,
                    y: -0.3,
                    z: -1.0,
                },
                Vec3 {
                    x: 0.3,
                    y: 0.3,
                    z: -1.0,
                },
                Vec3 {
                    x: -0.3,
                    y: 0.3,
                    z: -1.0,
                },
            ],
            Color::white(),
            PatchFlags::empty(),
        );
        scene.push_quad(
            [
                Vec3 {
                    x: -1.0,
                    y: -0.3,
                    z: 0.2,
                },
                Vec3 {
                    x: -1.0,
                    y: -0.3,
                    z: 0.8,
                },
                Vec3 {
                    x: -1.0,
                    y: 0.3,
                    z: 0.8,
                },
                Vec3 {
                    x: -1.0,
                    y: 0.3,
                    z: 0.2,
                },
            ],
            Color::white(),
            PatchFlags::empty(),
        );

        let matrix = AnalyticTransferCalculator::new(&scene)
            .calc_all_lights()
            .unwrap();
        for i in 0..matrix.size() {
            for j in 0..matrix.size() {
                assert!(matrix.get(i, j) >= 0.0);
            }
        }
    }
}
