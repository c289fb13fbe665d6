// Per-pixel weight masks for the cube-map integration. Each rendered
// frame is a unit-distance cube face; a pixel at face coordinates
// (x, y), both in (-1, 1), sees the direction (x, y, 1) and covers the
// differential solid angle darea / (1 + x^2 + y^2)^(3/2), with
// darea = (2 / resolution)^2.
//
// Three masks are needed:
//  - subtend: plain solid angle, scaled by 1.5 / pi so the full sphere
//    integrates to the reference surface area of 6,
//  - forward: cosine-to-the-receiver weighting for the front view,
//    integrating (with the side masks) to 1 over the hemisphere,
//  - side: the same cosine weighting for the four side views, where the
//    receiver plane cuts the frame in half. Only the half nearer the
//    receiver normal (y > 0) can contribute; the far half is left zero
//    and never sampled.

use std::f64::consts::PI;

/// All three masks for one resolution. Computing these is O(resolution^2)
/// so the render calculator builds them once and reuses them across all
/// n evaluation points.
pub struct WeightMasks {
    pub subtend: Vec<f64>,
    pub forward: Vec<f64>,
    pub side: Vec<f64>,
}

impl WeightMasks {
    pub fn new(resolution: usize) -> Self {
        WeightMasks {
            subtend: calc_subtend_weights(resolution),
            forward: calc_forward_light_weights(resolution),
            side: calc_side_light_weights(resolution),
        }
    }
}

// Face coordinate of a pixel centre, in (-1, 1):
fn face_coord(i: usize, resolution: usize) -> f64 {
    (i as f64 + 0.5) / resolution as f64 * 2. - 1.
}

pub fn calc_subtend_weights(resolution: usize) -> Vec<f64> {
    let darea = (2. / resolution as f64).powi(2);
    let mut weights = Vec::with_capacity(resolution * resolution);
    for iy in 0..resolution {
        let y = face_coord(iy, resolution);
        for ix in 0..resolution {
            let x = face_coord(ix, resolution);
            let d2 = 1. + x * x + y * y;
            weights.push(1.5 / PI * darea / (d2 * d2.sqrt()));
        }
    }
    weights
}

pub fn calc_forward_light_weights(resolution: usize) -> Vec<f64> {
    let darea = (2. / resolution as f64).powi(2);
    let mut weights = Vec::with_capacity(resolution * resolution);
    for iy in 0..resolution {
        let y = face_coord(iy, resolution);
        for ix in 0..resolution {
            let x = face_coord(ix, resolution);
            let d2 = 1. + x * x + y * y;
            weights.push(darea / (PI * d2 * d2));
        }
    }
    weights
}

pub fn calc_side_light_weights(resolution: usize) -> Vec<f64> {
    let darea = (2. / resolution as f64).powi(2);
    let mut weights = Vec::with_capacity(resolution * resolution);
    for iy in 0..resolution {
        let y = face_coord(iy, resolution);
        for ix in 0..resolution {
            let x = face_coord(ix, resolution);
            if y <= 0. {
                weights.push(0.);
                continue;
            }
            let d2 = 1. + x * x + y * y;
            weights.push(darea * y / (PI * d2 * d2));
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: usize = 64;

    #[test]
    fn subtend_mask_integrates_to_six() {
        // One face covers a sixth of the sphere:
        let total: f64 = calc_subtend_weights(RES).iter().sum();
        assert!((total * 6. - 6.).abs() < 0.01, "total = {}", total * 6.);
    }

    #[test]
    fn light_masks_integrate_to_one() {
        // Front face plus the four near halves of the side faces tile the
        // hemisphere, and the cosine-weighted hemisphere integral is pi:
        let forward: f64 = calc_forward_light_weights(RES).iter().sum();
        let side: f64 = calc_side_light_weights(RES).iter().sum();
        let total = forward + 4. * side;
        assert!((total - 1.).abs() < 0.01, "total = {}", total);
    }

    #[test]
    fn side_mask_is_zero_on_far_half() {
        let side = calc_side_light_weights(RES);
        for iy in 0..RES / 2 {
            for ix in 0..RES {
                assert_eq!(side[iy * RES + ix], 0.);
            }
        }
        // And nonzero somewhere on the near half:
        assert!(side[(RES / 2) * RES + RES / 2] > 0.);
    }
}
