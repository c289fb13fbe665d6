// The patch/vertex store. Vertices live in a shared append-only buffer
// and are referenced by index from the patches, so patches stay cheap to
// copy around and the geometry is owned in exactly one place.

use bitflags::bitflags;

use crate::math::vector::Vec3f;
use crate::spectrum::Color;

bitflags! {
    pub struct PatchFlags: u32 {
        /// Light source. Radiance is pinned to full-intensity white input
        /// (times reflectance) by the solver.
        const EMITTER = 0b01;
        /// Eligible for the specular highlight post-process.
        const SPECULAR = 0b10;
    }
}

/// A planar quadrilateral surface element. The four vertex indices are
/// ordered around the quad; geometry is expected to be planar and
/// non-degenerate (this is a precondition, not checked here).
#[derive(Clone, Copy, Debug)]
pub struct Patch {
    pub vertices: [usize; 4],
    /// Per-channel reflectance factor (non-negative).
    pub material: Color,
    /// Current outgoing radiance. Mutated in place by the solver and the
    /// post-processes; may exceed 1.0 for emitters.
    pub radiance: Color,
    pub flags: PatchFlags,
}

impl Patch {
    pub fn new(vertices: [usize; 4], material: Color, flags: PatchFlags) -> Self {
        Patch {
            vertices,
            material,
            radiance: material,
            flags,
        }
    }

    pub fn is_emitter(&self) -> bool {
        self.flags.contains(PatchFlags::EMITTER)
    }

    pub fn is_specular(&self) -> bool {
        self.flags.contains(PatchFlags::SPECULAR)
    }

    pub fn centre(&self, vertices: &[Vec3f]) -> Vec3f {
        let sum = vertices[self.vertices[0]]
            + vertices[self.vertices[1]]
            + vertices[self.vertices[2]]
            + vertices[self.vertices[3]];
        sum.scale(0.25)
    }

    /// Unnormalized normal whose length equals the patch area. Points in
    /// the direction the patch faces (radiates), per the winding of the
    /// vertex indices.
    pub fn area_normal(&self, vertices: &[Vec3f]) -> Vec3f {
        let v0 = vertices[self.vertices[0]];
        let e1 = vertices[self.vertices[1]] - v0;
        let e2 = vertices[self.vertices[3]] - v0;
        e1.cross(e2)
    }

    pub fn normal(&self, vertices: &[Vec3f]) -> Vec3f {
        self.area_normal(vertices).normalize()
    }

    pub fn area(&self, vertices: &[Vec3f]) -> f64 {
        self.area_normal(vertices).length()
    }
}

/// Owns the whole static scene: the shared vertex buffer and the patch
/// array. Passed by reference through the calculators and the solver.
pub struct Scene {
    pub vertices: Vec<Vec3f>,
    pub patches: Vec<Patch>,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            vertices: Vec::new(),
            patches: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, v: Vec3f) -> usize {
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    pub fn push_quad(&mut self, corners: [Vec3f; 4], material: Color, flags: PatchFlags) {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&corners);
        self.patches
            .push(Patch::new([base, base + 1, base + 2, base + 3], material, flags));
    }

    /// Splits a quad into a rows x cols grid of sub-patches with shared
    /// vertices, winding each sub-quad like the parent so the normals
    /// agree. Corner interpolation is bilinear.
    pub fn push_subdivided_quad(
        &mut self,
        corners: [Vec3f; 4],
        rows: usize,
        cols: usize,
        material: Color,
        flags: PatchFlags,
    ) {
        let base = self.vertices.len();
        for r in 0..=rows {
            let v = r as f64 / rows as f64;
            for c in 0..=cols {
                let u = c as f64 / cols as f64;
                let bottom = corners[0].scale(1. - u) + corners[1].scale(u);
                let top = corners[3].scale(1. - u) + corners[2].scale(u);
                self.vertices.push(bottom.scale(1. - v) + top.scale(v));
            }
        }

        let stride = cols + 1;
        for r in 0..rows {
            for c in 0..cols {
                let i00 = base + r * stride + c;
                self.patches.push(Patch::new(
                    [i00, i00 + 1, i00 + stride + 1, i00 + stride],
                    material,
                    flags,
                ));
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}
