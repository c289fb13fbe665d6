use num_traits::Float;

use std::ops::{Index, Mul};

use super::vector::{Vec3, Vec4};

// Not copyable, as Matrices are expensive.
#[derive(Clone, Debug)]
pub struct Mat4<T: Float> {
    m: [Vec4<T>; 4],
}

impl<T: Float> Mat4<T> {
    pub fn from_rows(m: [Vec4<T>; 4]) -> Self {
        Mat4 { m }
    }

    pub fn new_identity() -> Self {
        let one = T::one();
        let zero = T::zero();
        Mat4 {
            m: [
                Vec4 {
                    x: one,
                    y: zero,
                    z: zero,
                    w: zero,
                },
                Vec4 {
                    x: zero,
                    y: one,
                    z: zero,
                    w: zero,
                },
                Vec4 {
                    x: zero,
                    y: zero,
                    z: one,
                    w: zero,
                },
                Vec4 {
                    x: zero,
                    y: zero,
                    z: zero,
                    w: one,
                },
            ],
        }
    }

    /// Rotation about an arbitrary (not necessarily normalized) axis by
    /// the given angle in degrees.
    pub fn new_rotate(deg: T, axis: Vec3<T>) -> Self {
        let a = axis.normalize();
        let rad = deg.to_radians();
        let (s, c) = rad.sin_cos();
        let omc = T::one() - c;

        let r0 = Vec4 {
            x: a.x * a.x * omc + c,
            y: a.x * a.y * omc - a.z * s,
            z: a.x * a.z * omc + a.y * s,
            w: T::zero(),
        };
        let r1 = Vec4 {
            x: a.y * a.x * omc + a.z * s,
            y: a.y * a.y * omc + c,
            z: a.y * a.z * omc - a.x * s,
            w: T::zero(),
        };
        let r2 = Vec4 {
            x: a.z * a.x * omc - a.y * s,
            y: a.z * a.y * omc + a.x * s,
            z: a.z * a.z * omc + c,
            w: T::zero(),
        };
        let r3 = Vec4 {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
            w: T::one(),
        };
        Mat4 {
            m: [r0, r1, r2, r3],
        }
    }

    /// World-to-camera view matrix. Camera space has x pointing right,
    /// y pointing up and z pointing forward into the scene.
    pub fn new_lookat(eye: Vec3<T>, look_at: Vec3<T>, up: Vec3<T>) -> Self {
        let f = (look_at - eye).normalize();
        let r = up.cross(f).normalize();
        let u = f.cross(r);

        let r3 = Vec4 {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
            w: T::one(),
        };
        Mat4 {
            m: [
                Vec4::from_vec3(r, -r.dot(eye)),
                Vec4::from_vec3(u, -u.dot(eye)),
                Vec4::from_vec3(f, -f.dot(eye)),
                r3,
            ],
        }
    }

    /// Performs a matrix multiplication with a vector:
    pub fn vec_mul(&self, vec: Vec4<T>) -> Vec4<T> {
        let x = vec.dot(self.m[0]);
        let y = vec.dot(self.m[1]);
        let z = vec.dot(self.m[2]);
        let w = vec.dot(self.m[3]);
        Vec4 { x, y, z, w }
    }

    /// Transforms a point (w = 1), dropping the homogeneous coordinate.
    pub fn transform_point(&self, p: Vec3<T>) -> Vec3<T> {
        self.vec_mul(Vec4::from_vec3(p, T::one())).xyz()
    }
}

impl<T: Float> Index<usize> for Mat4<T> {
    type Output = Vec4<T>;

    // One would have to use [r][c]
    fn index(&self, i: usize) -> &Vec4<T> {
        &self.m[i]
    }
}

impl<T: Float> Mul for Mat4<T> {
    type Output = Mat4<T>;

    fn mul(self, o: Mat4<T>) -> Mat4<T> {
        let col = |c: usize| Vec4 {
            x: o.m[0][c],
            y: o.m[1][c],
            z: o.m[2][c],
            w: o.m[3][c],
        };
        let cols = [col(0), col(1), col(2), col(3)];

        let mut m = [Vec4::zero(); 4];
        for (r, row) in m.iter_mut().enumerate() {
            *row = Vec4 {
                x: self.m[r].dot(cols[0]),
                y: self.m[r].dot(cols[1]),
                z: self.m[r].dot(cols[2]),
                w: self.m[r].dot(cols[3]),
            };
        }
        Mat4 { m }
    }
}
