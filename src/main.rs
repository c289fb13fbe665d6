// Radiosity inside a cube: a box room lit by an emissive panel in the
// ceiling, with a tilted specular cube floating inside it. Computes the
// transfer matrix with the software renderer, relaxes the lighting to
// convergence and runs the view-dependent post-processes.

use log::info;
use simple_error::SimpleResult;

use radiosity::math::matrix::Mat4;
use radiosity::math::vector::{Vec3, Vec3f};
use radiosity::postprocess::{apply_specular, normalize_brightness};
use radiosity::raster::SoftwareSurface;
use radiosity::scene::{PatchFlags, Scene};
use radiosity::solver::solve;
use radiosity::spectrum::Color;
use radiosity::transfer::render::RenderTransferCalculator;
use radiosity::transfer::TransferCalculator;

// Break up each room wall into SUBDIVISION^2 subquads for the radiosity
// calculation; the inner cube gets half that, as it is smaller.
const SUBDIVISION: usize = 8;

const RESOLUTION: usize = 64;

// Fixed viewpoint for the view-dependent post-processes:
const EYE_POS: Vec3f = Vec3 {
    x: 0.0,
    y: 0.0,
    z: -3.0,
};

// The six faces of the cube spanning [-1, 1]^3, wound to face inward.
fn cube_faces() -> [[Vec3f; 4]; 6] {
    let v = |x: f64, y: f64, z: f64| Vec3 { x, y, z };
    [
        // Floor and ceiling:
        [v(-1., -1., -1.), v(-1., -1., 1.), v(1., -1., 1.), v(1., -1., -1.)],
        [v(-1., 1., -1.), v(1., 1., -1.), v(1., 1., 1.), v(-1., 1., 1.)],
        // Left and right walls:
        [v(-1., -1., -1.), v(-1., 1., -1.), v(-1., 1., 1.), v(-1., -1., 1.)],
        [v(1., -1., -1.), v(1., -1., 1.), v(1., 1., 1.), v(1., 1., -1.)],
        // Near and far walls:
        [v(-1., -1., -1.), v(1., -1., -1.), v(1., 1., -1.), v(-1., 1., -1.)],
        [v(-1., -1., 1.), v(-1., 1., 1.), v(1., 1., 1.), v(1., -1., 1.)],
    ]
}

fn init_geometry() -> Scene {
    let mut scene = Scene::new();
    let grey = Color::from_scalar(0.8);

    for face in cube_faces().iter() {
        scene.push_subdivided_quad(*face, SUBDIVISION, SUBDIVISION, grey, PatchFlags::empty());
    }

    // The inner cube: the same prototype scaled down, flipped to face
    // outward, tilted and dropped below the room's centre.
    let tilt = Mat4::new_rotate(
        30.,
        Vec3 {
            x: 0.,
            y: 0.,
            z: 1.,
        },
    ) * Mat4::new_rotate(
        60.,
        Vec3 {
            x: 1.,
            y: 0.,
            z: 0.,
        },
    );
    let offset = Vec3 {
        x: 0.,
        y: -0.25,
        z: 0.,
    };
    for face in cube_faces().iter() {
        let mut corners = [Vec3f::zero(); 4];
        for (out, &c) in corners.iter_mut().zip(face.iter().rev()) {
            *out = tilt.transform_point(c.scale(0.4)) + offset;
        }
        scene.push_subdivided_quad(
            corners,
            SUBDIVISION / 2,
            SUBDIVISION / 2,
            grey,
            PatchFlags::SPECULAR,
        );
    }

    scene
}

fn init_lighting(scene: &mut Scene) {
    let centres: Vec<Vec3f> = scene
        .patches
        .iter()
        .map(|p| p.centre(&scene.vertices))
        .collect();
    for (patch, c) in scene.patches.iter_mut().zip(centres) {
        // Put a big light in the top centre of the box.
        if c.x.abs() < 0.5 && c.z.abs() < 0.5 && c.y > 0.9 {
            patch.material = Color::from_scalar(2.0);
            patch.flags |= PatchFlags::EMITTER;
        }
        // Make the left wall red, the right wall blue.
        if c.x < -0.999 {
            patch.material = patch.material * Color::new(1.0, 0.5, 0.5);
        } else if c.x > 0.999 {
            patch.material = patch.material * Color::new(0.5, 0.5, 1.0);
        }
        patch.radiance = patch.material;
    }
}

fn main() -> SimpleResult<()> {
    env_logger::init();

    let mut scene = init_geometry();
    init_lighting(&mut scene);
    info!("scene built: {} patches", scene.patches.len());

    let transfers = {
        let surface = SoftwareSurface::new(RESOLUTION)?;
        RenderTransferCalculator::new(&scene, surface).calc_all_lights()?
    };

    let stats = solve(&mut scene, &transfers)?;
    apply_specular(&mut scene, EYE_POS);
    normalize_brightness(&mut scene, EYE_POS);

    println!(
        "converged in {} iterations, total light {:.4}",
        stats.iterations, stats.total_light
    );
    Ok(())
}
