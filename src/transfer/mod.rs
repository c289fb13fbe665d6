// Transfer coefficients: how much of each patch's outgoing radiance
// arrives at every other patch. Two interchangeable calculators produce
// the matrix; the solver only ever reads it.

pub mod analytic;
pub mod render;
pub mod weighting;

use simple_error::SimpleResult;

use crate::camera::Camera;

/// Dense n x n transfer matrix, row-major. Entry (i, j) is the fraction
/// of patch j's outgoing radiance reaching patch i. The diagonal is never
/// read by the solver, and the matrix need not be symmetric.
#[derive(Clone, Debug)]
pub struct TransferMatrix {
    n: usize,
    data: Vec<f64>,
}

impl TransferMatrix {
    pub fn from_rows(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n * n);
        TransferMatrix { n, data }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

/// The two calculator variants expose the same two operations; only one
/// implementation is active per run, selected explicitly by the caller.
pub trait TransferCalculator {
    /// Per-patch subtended solid angle as seen from the given camera,
    /// normalized so an enclosing scene sums to the reference surface
    /// area of 6. Diagnostic use.
    fn calc_subtended(&mut self, cam: &Camera) -> SimpleResult<Vec<f64>>;

    /// Computes the full transfer matrix: one evaluation camera per
    /// patch, each yielding one row.
    fn calc_all_lights(&mut self) -> SimpleResult<TransferMatrix>;
}

//
// Patch-identifier channel
//

// The render-based calculator draws each patch flat-colored with its
// identifier packed into the color channels, 6 significant bits per
// channel. Identifier 0 is reserved for "no patch visible here".

/// Largest representable patch identifier (18 bits across 3 channels).
pub const MAX_PATCH_ID: u32 = (1 << 18) - 1;

/// Packs an identifier into RGBA bytes. Round-trips exactly with
/// `decode_id` for identifiers up to `MAX_PATCH_ID`; anything larger is
/// outside the contract (the render calculator rejects such scenes).
pub fn encode_id(id: u32) -> [u8; 4] {
    [
        ((id & 0x3f) << 2) as u8,
        (((id >> 6) & 0x3f) << 2) as u8,
        (((id >> 12) & 0x3f) << 2) as u8,
        0xff,
    ]
}

/// Inverse of `encode_id`. Only looks at the color channels.
pub fn decode_id(px: &[u8]) -> u32 {
    ((px[0] as u32) >> 2) | (((px[1] as u32) >> 2) << 6) | (((px[2] as u32) >> 2) << 12)
}
