// Represents color in the radiosity pipeline. Patch radiance is allowed
// to exceed 1.0 (emitters in particular), so nothing here clamps.

use std::ops::{Add, AddAssign, Index, Mul};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    // Just a fancy way of returning 0 for everything:
    pub fn black() -> Self {
        Color {
            r: 0.,
            g: 0.,
            b: 0.,
        }
    }

    pub fn white() -> Self {
        Color {
            r: 1.,
            g: 1.,
            b: 1.,
        }
    }

    pub fn from_scalar(s: f64) -> Self {
        Color { r: s, g: s, b: s }
    }

    // Multiplies all of the components by the scale value:
    pub fn scale(self, s: f64) -> Self {
        Color {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }

    /// Grey-scale value, used for the total-light convergence measure.
    pub fn as_grey(self) -> f64 {
        (self.r + self.g + self.b) / 3.
    }

    pub fn max_channel(self) -> f64 {
        self.r.max(self.g).max(self.b)
    }

    pub fn is_black(self) -> bool {
        self.r == 0. && self.g == 0. && self.b == 0.
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Color {
            r: self.r + o.r,
            g: self.g + o.g,
            b: self.b + o.b,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, o: Self) {
        *self = *self + o;
    }
}

// Channel-wise multiply (material reflectance is a per-channel factor):
impl Mul for Color {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Color {
            r: self.r * o.r,
            g: self.g * o.g,
            b: self.b * o.b,
        }
    }
}

impl Index<usize> for Color {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            _ => panic!("Index out of range for Color"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channelwise_multiply_and_grey() {
        let c = Color::new(1.0, 0.5, 0.25) * Color::new(2.0, 2.0, 2.0);
        assert_eq!(c, Color::new(2.0, 1.0, 0.5));
        assert!((c.as_grey() - 3.5 / 3.0).abs() < 1e-12);
        assert_eq!(c.max_channel(), 2.0);
    }
}
