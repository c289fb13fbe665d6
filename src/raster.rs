// A CPU implementation of the offscreen rendering collaborator: a square
// RGBA framebuffer with a depth buffer, rendering 90-degree-fov cube
// faces. Quads are clipped against the near plane, fanned into triangles
// and filled with an edge-function rasterizer. This is all the rendering
// the transfer calculator needs, so no shading of any kind happens here.

use arrayvec::ArrayVec;
use simple_error::{bail, SimpleResult};

use crate::camera::Camera;
use crate::math::matrix::Mat4;
use crate::math::vector::Vec3f;
use crate::transfer::encode_id;
use crate::transfer::render::{CubeFace, RenderSurface};

// Patches straddle the evaluation point's plane all the time, so the
// near plane sits as close as numerically reasonable:
const NEAR: f64 = 1e-4;

/// Screen-space vertex: pixel x, pixel y and 1/z (which interpolates
/// linearly in screen space, unlike z itself).
type ScreenVert = (f64, f64, f64);

pub struct SoftwareSurface {
    resolution: usize,
    // RGBA bytes, rows bottom-to-top (row 0 is y = -1 in face coords):
    color: Vec<u8>,
    // 1/z per pixel; bigger is closer, 0 is "nothing here yet":
    depth: Vec<f64>,
    world_to_face: Mat4<f64>,
}

impl SoftwareSurface {
    pub fn new(resolution: usize) -> SimpleResult<Self> {
        if resolution < 2 {
            bail!("cannot create a {0}x{0} render surface", resolution);
        }
        Ok(SoftwareSurface {
            resolution,
            color: vec![0; resolution * resolution * 4],
            depth: vec![0.; resolution * resolution],
            world_to_face: Mat4::new_identity(),
        })
    }

    fn fill_triangle(&mut self, a: ScreenVert, b: ScreenVert, c: ScreenVert, rgba: [u8; 4]) {
        fn edge(p: ScreenVert, q: ScreenVert, x: f64, y: f64) -> f64 {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        }

        let area = edge(a, b, c.0, c.1);
        if area == 0. {
            return;
        }
        // No back-face culling; flip the winding instead so the inside
        // tests below always look for positive values:
        let (b, c, area) = if area < 0. { (c, b, -area) } else { (b, c, area) };

        let res = self.resolution as f64;
        let min_x = a.0.min(b.0).min(c.0).floor();
        let max_x = a.0.max(b.0).max(c.0).ceil();
        let min_y = a.1.min(b.1).min(c.1).floor();
        let max_y = a.1.max(b.1).max(c.1).ceil();
        if max_x < 0. || max_y < 0. || min_x >= res || min_y >= res {
            return;
        }
        let x0 = min_x.max(0.) as usize;
        let x1 = max_x.min(res - 1.) as usize;
        let y0 = min_y.max(0.) as usize;
        let y1 = max_y.min(res - 1.) as usize;

        for iy in y0..=y1 {
            let py = iy as f64 + 0.5;
            for ix in x0..=x1 {
                let px = ix as f64 + 0.5;
                let w0 = edge(b, c, px, py);
                let w1 = edge(c, a, px, py);
                let w2 = edge(a, b, px, py);
                if w0 < 0. || w1 < 0. || w2 < 0. {
                    continue;
                }
                let inv_z = (w0 * a.2 + w1 * b.2 + w2 * c.2) / area;
                let p = iy * self.resolution + ix;
                if inv_z > self.depth[p] {
                    self.depth[p] = inv_z;
                    self.color[p * 4..p * 4 + 4].copy_from_slice(&rgba);
                }
            }
        }
    }
}

// Sutherland-Hodgman against the z = NEAR plane. A quad can gain at most
// one vertex per clip, so the scratch never outgrows its capacity.
fn clip_near(poly: &[Vec3f]) -> ArrayVec<[Vec3f; 8]> {
    let mut out = ArrayVec::new();
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let a_in = a.z > NEAR;
        let b_in = b.z > NEAR;
        if a_in {
            out.push(a);
        }
        if a_in != b_in {
            let t = (NEAR - a.z) / (b.z - a.z);
            out.push(a + (b - a).scale(t));
        }
    }
    out
}

impl RenderSurface for SoftwareSurface {
    fn resolution(&self) -> usize {
        self.resolution
    }

    fn set_view(&mut self, cam: &Camera, face: CubeFace) {
        self.world_to_face = face.orientation() * cam.view_matrix();
    }

    fn clear(&mut self) {
        for b in self.color.iter_mut() {
            *b = 0;
        }
        for d in self.depth.iter_mut() {
            *d = 0.;
        }
    }

    fn draw_quad(&mut self, id: u32, corners: [Vec3f; 4]) {
        let rgba = encode_id(id);

        let mut face_pts: ArrayVec<[Vec3f; 8]> = ArrayVec::new();
        for &c in corners.iter() {
            face_pts.push(self.world_to_face.transform_point(c));
        }
        let clipped = clip_near(&face_pts);
        if clipped.len() < 3 {
            return;
        }

        // Perspective-project onto the face (90-degree fov, so the
        // divide is all there is to it), then scale to pixels:
        let half_res = self.resolution as f64 * 0.5;
        let mut screen: ArrayVec<[ScreenVert; 8]> = ArrayVec::new();
        for &p in clipped.iter() {
            screen.push((
                (p.x / p.z + 1.) * half_res,
                (p.y / p.z + 1.) * half_res,
                1. / p.z,
            ));
        }

        // Triangle fan over the clipped polygon:
        for i in 1..screen.len() - 1 {
            self.fill_triangle(screen[0], screen[i], screen[i + 1], rgba);
        }
    }

    fn read_pixels(&self) -> &[u8] {
        &self.color
    }
}
