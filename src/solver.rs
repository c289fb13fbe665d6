// The radiosity solver: Jacobi-style relaxation over the transfer
// matrix. Every step computes all new radiance values from the previous
// iteration's snapshot and only then swaps them in, so update order
// within a pass can never leak between patches.

use log::{debug, info};
use simple_error::{bail, SimpleResult};

use crate::scene::Scene;
use crate::spectrum::Color;
use crate::transfer::TransferMatrix;

/// Relative change in total scene light at which iteration stops.
pub const CONVERGENCE_TARGET: f64 = 0.001;

/// Safety net for scenes that never settle (e.g. reflectances >= 1 with
/// enough coupling to gain energy every pass). Well-behaved scenes
/// converge one or two orders of magnitude sooner than this.
pub const MAX_ITERATIONS: usize = 1000;

/// One Jacobi step. Emitters receive a fixed full-intensity white input;
/// everything else sums the previous radiance of all other patches
/// through its matrix row. The summed input is then filtered by the
/// patch's reflectance.
pub fn iterate_lighting(scene: &mut Scene, transfers: &TransferMatrix) {
    let n = scene.patches.len();
    let mut updated = Vec::with_capacity(n);

    // Iterate over targets:
    for (i, patch) in scene.patches.iter().enumerate() {
        let incoming = if patch.is_emitter() {
            // Emission is just like having 1.0 light arrive.
            Color::white()
        } else {
            let row = transfers.row(i);
            let mut incoming = Color::black();
            // Iterate over sources:
            for (j, source) in scene.patches.iter().enumerate() {
                if i == j {
                    continue;
                }
                incoming += source.radiance.scale(row[j]);
            }
            incoming
        };
        updated.push(incoming * patch.material);
    }

    for (patch, radiance) in scene.patches.iter_mut().zip(updated) {
        patch.radiance = radiance;
    }
}

/// Total light in the scene: area-weighted sum of the grey radiance of
/// every patch. Only used to detect convergence.
pub fn total_light(scene: &Scene) -> f64 {
    scene
        .patches
        .iter()
        .map(|p| p.radiance.as_grey() * p.area(&scene.vertices))
        .sum()
}

#[derive(Clone, Copy, Debug)]
pub struct SolveStats {
    pub iterations: usize,
    pub total_light: f64,
}

/// Iterates until the relative change in total light drops to the given
/// target. The previous total is seeded at zero, so at least two steps
/// always run for a lit scene.
pub fn solve_with(
    scene: &mut Scene,
    transfers: &TransferMatrix,
    target: f64,
    max_iterations: usize,
) -> SimpleResult<SolveStats> {
    let mut light = 0.;
    let mut iterations = 0;

    loop {
        iterate_lighting(scene, transfers);
        iterations += 1;

        let new_light = total_light(scene);
        // A totally dark scene stays dark; call that converged instead of
        // dividing by zero:
        let rel_change = if new_light == 0. {
            if light == 0. {
                0.
            } else {
                1.
            }
        } else {
            (light / new_light - 1.).abs()
        };
        light = new_light;
        debug!(
            "iteration {}: total light {}, relative change {}",
            iterations, light, rel_change
        );

        if rel_change <= target {
            break;
        }
        if iterations >= max_iterations {
            bail!(
                "radiosity failed to converge after {} iterations (total light {})",
                iterations,
                light
            );
        }
    }

    info!(
        "converged after {} iterations, total light {}",
        iterations, light
    );
    Ok(SolveStats {
        iterations,
        total_light: light,
    })
}

pub fn solve(scene: &mut Scene, transfers: &TransferMatrix) -> SimpleResult<SolveStats> {
    solve_with(scene, transfers, CONVERGENCE_TARGET, MAX_ITERATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector::Vec3;
    use crate::scene::PatchFlags;

    // Two unit patches facing each other a unit apart:
    fn facing_pair(left_material: Color, right_material: Color, flags: [PatchFlags; 2]) -> Scene {
        let mut scene = Scene::new();
        scene.push_quad(
            [
                Vec3 {
                    x: -0.5,
                    y: -0.5,
                    z: 0.0,
                },
                Vec3 {
                    x: 0.5,
                    y: -0.5,
                    z: 0.0,
                },
                Vec3 {
                    x: 0.5,
                    y: 0.5,
                    z: 0.0,
                },
                Vec3 {
                    x: -0.5,
                    y: 0.5,
                    z: 0.0,
                },
            ],
            left_material,
            flags[0],
        );
        scene.push_quad(
            [
                Vec3 {
                    x: 0.5,
                    y: -0.5,
                    z: 1.0,
                },
                Vec3 {
                    x: -0.5,
                    y: -0.5,
                    z: 1.0,
                },
                Vec3 {
                    x: -0.5,
                    y: 0.5,
                    z: 1.0,
                },
                Vec3 {
                    x: 0.5,
                    y: 0.5,
                    z: 1.0,
                },
            ],
            right_material,
            flags[1],
        );
        scene
    }

    fn coupling(t: f64) -> TransferMatrix {
        TransferMatrix::from_rows(2, vec![0.0, t, t, 0.0])
    }

    #[test]
    fn emitters_reset_to_material_colour() {
        let m0 = Color::new(0.9, 0.3, 0.1);
        let m1 = Color::new(0.2, 0.8, 0.4);
        let mut scene = facing_pair(m0, m1, [PatchFlags::EMITTER, PatchFlags::EMITTER]);
        // Start from junk radiance so the reset is visible:
        scene.patches[0].radiance = Color::from_scalar(7.0);
        scene.patches[1].radiance = Color::black();

        // The matrix must be irrelevant when everything emits:
        iterate_lighting(&mut scene, &coupling(123.0));

        assert_eq!(scene.patches[0].radiance, m0);
        assert_eq!(scene.patches[1].radiance, m1);
    }

    #[test]
    fn jacobi_step_reads_only_the_previous_snapshot() {
        let mut scene = facing_pair(
            Color::white(),
            Color::white(),
            [PatchFlags::empty(), PatchFlags::empty()],
        );
        scene.patches[0].radiance = Color::from_scalar(1.0);
        scene.patches[1].radiance = Color::from_scalar(0.0);

        iterate_lighting(&mut scene, &coupling(0.5));

        // Patch 0 must see patch 1's old zero, not the 0.5 it just got:
        assert_eq!(scene.patches[0].radiance, Color::from_scalar(0.0));
        assert_eq!(scene.patches[1].radiance, Color::from_scalar(0.5));
    }

    #[test]
    fn dark_scene_converges_without_dividing_by_zero() {
        let mut scene = facing_pair(
            Color::white(),
            Color::white(),
            [PatchFlags::empty(), PatchFlags::empty()],
        );
        scene.patches[0].radiance = Color::black();
        scene.patches[1].radiance = Color::black();

        let stats = solve(&mut scene, &coupling(0.5)).unwrap();
        assert!(stats.iterations < MAX_ITERATIONS);
        assert_eq!(stats.total_light, 0.0);
    }

    #[test]
    fn lit_scene_runs_at_least_two_iterations() {
        let mut scene = facing_pair(
            Color::white(),
            Color::from_scalar(0.5),
            [PatchFlags::EMITTER, PatchFlags::empty()],
        );
        let stats = solve(&mut scene, &coupling(0.25)).unwrap();
        assert!(stats.iterations >= 2);
        assert!(stats.total_light > 0.0);
    }

    #[test]
    fn converged_radiance_matches_the_fixed_point() {
        // One emitter, one grey reflector with coupling t: the reflector
        // settles at material * t * emitter:
        let t = 0.25;
        let mut scene = facing_pair(
            Color::white(),
            Color::from_scalar(0.5),
            [PatchFlags::EMITTER, PatchFlags::empty()],
        );
        solve_with(&mut scene, &coupling(t), 1e-9, MAX_ITERATIONS).unwrap();

        let got = scene.patches[1].radiance;
        let expected = 0.5 * t * 1.0;
        assert!((got.r - expected).abs() < 1e-6);
    }

    // An emitter feeding two mutually coupled reflectors, so convergence
    // takes a proper geometric tail rather than a single hop:
    fn enclosure() -> (Scene, TransferMatrix) {
        let mut scene = facing_pair(
            Color::from_scalar(0.8),
            Color::from_scalar(0.8),
            [PatchFlags::EMITTER, PatchFlags::empty()],
        );
        scene.push_quad(
            [
                Vec3 {
                    x: -0.5,
                    y: -0.5,
                    z: 2.0,
                },
                Vec3 {
                    x: 0.5,
                    y: -0.5,
                    z: 2.0,
                },
                Vec3 {
                    x: 0.5,
                    y: 0.5,
                    z: 2.0,
                },
                Vec3 {
                    x: -0.5,
                    y: 0.5,
                    z: 2.0,
                },
            ],
            Color::from_scalar(0.8),
            PatchFlags::empty(),
        );
        let transfers = TransferMatrix::from_rows(
            3,
            vec![
                0.0, 0.0, 0.0, // emitter row, never read
                0.5, 0.0, 0.5, // reflector fed by both others
                0.3, 0.5, 0.0,
            ],
        );
        (scene, transfers)
    }

    #[test]
    fn tighter_threshold_only_adds_iterations() {
        let (mut coarse, transfers) = enclosure();
        let coarse_stats =
            solve_with(&mut coarse, &transfers, CONVERGENCE_TARGET, MAX_ITERATIONS).unwrap();

        let (mut fine, _) = enclosure();
        let fine_stats = solve_with(
            &mut fine,
            &transfers,
            CONVERGENCE_TARGET / 2.,
            MAX_ITERATIONS,
        )
        .unwrap();

        assert!(fine_stats.iterations >= coarse_stats.iterations);
        // The converged result may only move by the tolerance difference:
        for i in 1..3 {
            let diff = (coarse.patches[i].radiance.r - fine.patches[i].radiance.r).abs();
            let scale = fine.patches[i].radiance.r.max(1e-12);
            assert!(diff / scale < 2. * CONVERGENCE_TARGET);
        }
    }

    #[test]
    fn runaway_scene_hits_the_iteration_cap() {
        // Two perfect reflectors bouncing light back and forth with gain
        // above one grow without bound and never settle:
        let mut scene = facing_pair(
            Color::white(),
            Color::white(),
            [PatchFlags::empty(), PatchFlags::empty()],
        );
        scene.patches[0].radiance = Color::white();
        scene.patches[1].radiance = Color::white();
        assert!(solve_with(&mut scene, &coupling(1.5), 1e-12, 50).is_err());
    }
}
