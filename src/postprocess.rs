// Post-processing over the converged radiance: a Phong-style specular
// highlight for flagged patches, then a global brightness rescale. Both
// depend on the viewer's position, which the caller passes in from its
// live camera state at call time.

use log::debug;

use crate::math::vector::Vec3f;
use crate::scene::Scene;
use crate::spectrum::Color;

pub const SPECULAR_POWER: f64 = 32.0;
pub const SPECULAR_FACTOR: f64 = 0.02;

/// Adds specular highlights to every specular, non-emitting patch: one
/// Phong term per emitter, summed as colour-neutral white glare. The
/// result is added straight onto the converged radiance and deliberately
/// not filtered through the material (a highlight is surface glare, not
/// reflected body colour).
pub fn apply_specular(scene: &mut Scene, view_pos: Vec3f) {
    let n = scene.patches.len();
    let mut updated: Vec<Color> = Vec::with_capacity(n);

    // Iterate over targets:
    for (i, patch) in scene.patches.iter().enumerate() {
        let mut radiance = patch.radiance;
        if patch.is_specular() && !patch.is_emitter() {
            let centre = patch.centre(&scene.vertices);
            let normal = patch.normal(&scene.vertices);
            // View vector pointing from the eye at the surface:
            let view = -(view_pos - centre).normalize();

            let mut incoming = Color::black();
            // Iterate over sources:
            for (j, source) in scene.patches.iter().enumerate() {
                if i == j || !source.is_emitter() {
                    continue;
                }
                let light = (centre - source.centre(&scene.vertices)).normalize();
                let reflected = (normal.scale(2. * normal.dot(light)) - light).normalize();
                let specular = reflected.dot(view).max(0.).powf(SPECULAR_POWER);
                incoming += Color::white().scale(specular * SPECULAR_FACTOR);
            }
            debug!(
                "specular highlight on patch {}: {} {} {}",
                i, incoming.r, incoming.g, incoming.b
            );
            radiance += incoming;
        }
        updated.push(radiance);
    }

    for (patch, radiance) in scene.patches.iter_mut().zip(updated) {
        patch.radiance = radiance;
    }
}

/// Target peak channel value for `normalize_brightness`.
pub const BRIGHTNESS_TARGET: f64 = 1.0;

fn faces_view(scene: &Scene, i: usize, view_pos: Vec3f) -> bool {
    let patch = &scene.patches[i];
    let centre = patch.centre(&scene.vertices);
    (view_pos - centre).dot(patch.normal(&scene.vertices)) > 0.
}

/// Rescales non-emitter radiance so the brightest channel reaches the
/// target. The peak is sampled only over patches currently facing the
/// viewer, but the rescale applies to every non-emitter; that partial
/// sampling set is preserved behaviour, not an oversight to fix here.
pub fn normalize_brightness(scene: &mut Scene, view_pos: Vec3f) {
    let mut max = 0.0f64;
    for (i, patch) in scene.patches.iter().enumerate() {
        // Only include non-emitters, facing us:
        if !patch.is_emitter() && faces_view(scene, i, view_pos) {
            max = max.max(patch.radiance.max_channel());
        }
    }

    // An all-dark sample set has nothing to scale against:
    let scale = if max > 0. && max < BRIGHTNESS_TARGET {
        BRIGHTNESS_TARGET / max
    } else {
        1.
    };
    for patch in scene.patches.iter_mut() {
        if !patch.is_emitter() {
            patch.radiance = patch.radiance.scale(scale);
        }
    }
}
