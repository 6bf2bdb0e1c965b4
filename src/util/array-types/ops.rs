/* ************************************************************************ **
** This file is part of spgr, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of spgr is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::types::{M3, M33, V3};

// Arithmetic is provided for the two scalar types the library actually uses.
// (a trait-generic design was tried and found to pull its weight poorly)
macro_rules! impl_scalar_ops {
    ($X:ty) => {
        impl Add for V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn add(self, other: V3<$X>) -> V3<$X>
            { V3::from_fn(|k| self[k] + other[k]) }
        }

        impl Sub for V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn sub(self, other: V3<$X>) -> V3<$X>
            { V3::from_fn(|k| self[k] - other[k]) }
        }

        impl Neg for V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn neg(self) -> V3<$X>
            { self.map(|x| -x) }
        }

        impl AddAssign for V3<$X> {
            #[inline]
            fn add_assign(&mut self, other: V3<$X>)
            { *self = *self + other; }
        }

        impl SubAssign for V3<$X> {
            #[inline]
            fn sub_assign(&mut self, other: V3<$X>)
            { *self = *self - other; }
        }

        impl Mul<$X> for V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn mul(self, scalar: $X) -> V3<$X>
            { self.map(|x| x * scalar) }
        }

        /// Row vector times matrix.
        impl Mul<&M33<$X>> for V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn mul(self, m: &M33<$X>) -> V3<$X>
            { V3::from_fn(|c| self[0] * m[0][c] + self[1] * m[1][c] + self[2] * m[2][c]) }
        }

        impl Mul<&M33<$X>> for &V3<$X> {
            type Output = V3<$X>;

            #[inline]
            fn mul(self, m: &M33<$X>) -> V3<$X>
            { *self * m }
        }

        impl Mul<&M33<$X>> for &M33<$X> {
            type Output = M33<$X>;

            #[inline]
            fn mul(self, other: &M33<$X>) -> M33<$X>
            { M3::from_fn(|r| self.0[r] * other) }
        }

        impl Neg for M33<$X> {
            type Output = M33<$X>;

            #[inline]
            fn neg(self) -> M33<$X>
            { self.map(|x| -x) }
        }
    };
}

impl_scalar_ops!{f64}
impl_scalar_ops!{i32}

impl Div<f64> for V3<f64> {
    type Output = V3<f64>;

    #[inline]
    fn div(self, scalar: f64) -> V3<f64>
    { self.map(|x| x / scalar) }
}

impl V3<f64> {
    #[inline]
    pub fn sqnorm(&self) -> f64
    { dot(self, self) }

    #[inline]
    pub fn norm(&self) -> f64
    { self.sqnorm().sqrt() }
}

#[inline]
pub fn dot(a: &V3, b: &V3) -> f64
{ a[0] * b[0] + a[1] * b[1] + a[2] * b[2] }

macro_rules! impl_det {
    ($name:ident, $X:ty) => {
        #[inline]
        pub(crate) fn $name(m: &M33<$X>) -> $X {
            let [a, b, c] = m.0;
            a[0] * (b[1] * c[2] - b[2] * c[1])
                - a[1] * (b[0] * c[2] - b[2] * c[0])
                + a[2] * (b[0] * c[1] - b[1] * c[0])
        }
    };
}

impl_det!{det_f64, f64}
impl_det!{det_i32, i32}

/// Determinant, provided as an inherent method on both scalar types.
impl M33<f64> {
    #[inline]
    pub fn det(&self) -> f64 { det_f64(self) }
}

impl M33<i32> {
    #[inline]
    pub fn det(&self) -> i32 { det_i32(self) }
}

#[inline]
pub fn det(m: &M33) -> f64 { det_f64(m) }

/// Inverse of a 3x3 matrix, by cofactor expansion.
///
/// # Panics
/// Panics on a singular input. Callers that cannot guarantee a well-formed
/// matrix should test the determinant first.
pub fn inv(m: &M33) -> M33 {
    let det = det_f64(m);
    assert!(det != 0.0, "matrix not invertible");
    let [a, b, c] = m.0;
    let cof = |p: V3, q: V3| V3([
        p[1] * q[2] - p[2] * q[1],
        p[2] * q[0] - p[0] * q[2],
        p[0] * q[1] - p[1] * q[0],
    ]);
    // rows of the inverse are scaled cross products of input columns;
    // written here as the transposed cofactor matrix
    let t = M3([cof(b, c), cof(c, a), cof(a, b)]).t();
    t.map(|x| x / det)
}
