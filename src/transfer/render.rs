// Render-based transfer calculation: the scene is rendered from every
// patch's centre in six fixed cube-map orientations, each patch drawn
// flat-colored with its identifier. Decoding the frames and accumulating
// the per-pixel weight masks yields one matrix row per evaluation point.

use log::debug;
use once_cell::sync::OnceCell;
use simple_error::{bail, SimpleResult};

use crate::camera::Camera;
use crate::math::matrix::Mat4;
use crate::math::vector::{Vec3, Vec3f};
use crate::scene::Scene;
use crate::transfer::weighting::WeightMasks;
use crate::transfer::{decode_id, TransferCalculator, TransferMatrix, MAX_PATCH_ID};

use std::ops::Range;

//
// Cube-map orientations
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Front,
    Back,
    Right,
    Left,
    Up,
    Down,
}

impl CubeFace {
    pub const SIDES: [CubeFace; 4] = [CubeFace::Right, CubeFace::Left, CubeFace::Up, CubeFace::Down];

    /// Face frame expressed in camera space, as (right, up, forward).
    /// The four side frames all use the camera's forward axis as their
    /// "up", so the receiver plane maps onto the horizontal midline of
    /// the frame and the half that can face the receiver is always the
    /// upper one.
    pub fn basis(self) -> (Vec3f, Vec3f, Vec3f) {
        let x = Vec3 {
            x: 1.,
            y: 0.,
            z: 0.,
        };
        let y = Vec3 {
            x: 0.,
            y: 1.,
            z: 0.,
        };
        let z = Vec3 {
            x: 0.,
            y: 0.,
            z: 1.,
        };
        match self {
            CubeFace::Front => (x, y, z),
            CubeFace::Back => (-x, y, -z),
            CubeFace::Right => (y, z, x),
            CubeFace::Left => (-y, z, -x),
            CubeFace::Up => (-x, z, y),
            CubeFace::Down => (x, z, -y),
        }
    }

    /// Camera-space to face-space rotation.
    pub fn orientation(self) -> Mat4<f64> {
        use crate::math::vector::Vec4;
        let (r, u, f) = self.basis();
        Mat4::from_rows([
            Vec4::from_vec3(r, 0.),
            Vec4::from_vec3(u, 0.),
            Vec4::from_vec3(f, 0.),
            Vec4 {
                x: 0.,
                y: 0.,
                z: 0.,
                w: 1.,
            },
        ])
    }
}

//
// The rendering collaborator
//

/// The offscreen surface the calculator renders into. Creation of a
/// concrete surface is fallible and fatal (there is no retry); once one
/// exists, these operations are assumed infallible and blocking.
pub trait RenderSurface {
    /// Square resolution, fixed at creation.
    fn resolution(&self) -> usize;

    /// Applies a camera pose plus cube-face orientation to subsequent
    /// draw calls.
    fn set_view(&mut self, cam: &Camera, face: CubeFace);

    /// Clears color and depth.
    fn clear(&mut self);

    /// Draws one quad flat-colored with the identifier-encoded color.
    fn draw_quad(&mut self, id: u32, corners: [Vec3f; 4]);

    /// Raw RGBA readback, 4 bytes per pixel, rows bottom-to-top.
    fn read_pixels(&self) -> &[u8];
}

//
// The calculator itself
//

pub struct RenderTransferCalculator<'a, S: RenderSurface> {
    scene: &'a Scene,
    surface: S,
    resolution: usize,
    // Weight masks are O(resolution^2) to build, so they are computed on
    // first use and reused across all n evaluation points:
    masks: OnceCell<WeightMasks>,
}

impl<'a, S: RenderSurface> RenderTransferCalculator<'a, S> {
    pub fn new(scene: &'a Scene, surface: S) -> Self {
        let resolution = surface.resolution();
        RenderTransferCalculator {
            scene,
            surface,
            resolution,
            masks: OnceCell::new(),
        }
    }

    /// Renders the scene in one orientation and accumulates the decoded
    /// per-pixel weights into `sums`, indexed by identifier - 1. Only the
    /// rows in `rows` are scanned; for the side views the far half of the
    /// frame has all-zero weights, so it is skipped entirely.
    fn calc_face(
        surface: &mut S,
        scene: &Scene,
        cam: &Camera,
        face: CubeFace,
        weights: &[f64],
        rows: Range<usize>,
        sums: &mut [f64],
    ) {
        surface.set_view(cam, face);
        surface.clear();
        for (j, patch) in scene.patches.iter().enumerate() {
            let corners = [
                scene.vertices[patch.vertices[0]],
                scene.vertices[patch.vertices[1]],
                scene.vertices[patch.vertices[2]],
                scene.vertices[patch.vertices[3]],
            ];
            surface.draw_quad(j as u32 + 1, corners);
        }

        let resolution = surface.resolution();
        let pixels = surface.read_pixels();
        for iy in rows {
            for ix in 0..resolution {
                let p = iy * resolution + ix;
                let w = weights[p];
                if w == 0. {
                    continue;
                }
                let id = decode_id(&pixels[p * 4..p * 4 + 4]) as usize;
                if id > 0 {
                    sums[id - 1] += w;
                }
            }
        }
    }

    /// Light received at the camera from every patch, over the forward
    /// hemisphere: the front view plus the near halves of the four side
    /// views.
    pub fn calc_light(&mut self, cam: &Camera) -> Vec<f64> {
        let resolution = self.resolution;
        let masks = self.masks.get_or_init(|| WeightMasks::new(resolution));

        let mut sums = vec![0.; self.scene.patches.len()];
        Self::calc_face(
            &mut self.surface,
            self.scene,
            cam,
            CubeFace::Front,
            &masks.forward,
            0..resolution,
            &mut sums,
        );
        for &face in CubeFace::SIDES.iter() {
            Self::calc_face(
                &mut self.surface,
                self.scene,
                cam,
                face,
                &masks.side,
                resolution / 2..resolution,
                &mut sums,
            );
        }
        sums
    }
}

impl<'a, S: RenderSurface> TransferCalculator for RenderTransferCalculator<'a, S> {
    fn calc_subtended(&mut self, cam: &Camera) -> SimpleResult<Vec<f64>> {
        let resolution = self.resolution;
        let masks = self.masks.get_or_init(|| WeightMasks::new(resolution));

        let mut sums = vec![0.; self.scene.patches.len()];
        for &face in [
            CubeFace::Front,
            CubeFace::Back,
            CubeFace::Right,
            CubeFace::Left,
            CubeFace::Up,
            CubeFace::Down,
        ]
        .iter()
        {
            Self::calc_face(
                &mut self.surface,
                self.scene,
                cam,
                face,
                &masks.subtend,
                0..resolution,
                &mut sums,
            );
        }
        Ok(sums)
    }

    fn calc_all_lights(&mut self) -> SimpleResult<TransferMatrix> {
        let n = self.scene.patches.len();
        if n as u32 > MAX_PATCH_ID {
            bail!(
                "scene has {} patches but the identifier channel only supports {}",
                n,
                MAX_PATCH_ID
            );
        }

        let mut weights = Vec::with_capacity(n * n);

        // Iterate over targets:
        for i in 0..n {
            let patch = &self.scene.patches[i];
            let eye = patch.centre(&self.scene.vertices);
            let dir = patch.normal(&self.scene.vertices);
            let cam = Camera::new(eye, eye + dir, dir.perp());

            let row = self.calc_light(&cam);
            weights.extend_from_slice(&row);
            // Somewhat slow, so report progress:
            debug!("rendered transfer row {}/{}", i + 1, n);
        }

        Ok(TransferMatrix::from_rows(n, weights))
    }
}
