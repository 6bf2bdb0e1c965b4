use crate::IntPrecisionError;

use spgr_array_types::{M3, M33, V3, inv};

pub(crate) fn translate_mut_n3_3(coords: &mut [V3], t: &V3)
{
    for row in coords {
        *row += *t;
    }
}

/// Reduce a fractional coordinate into `[0.0, 1.0)`.
pub(crate) fn wrap01(x: f64) -> f64
{
    let y = x - x.floor();
    // a very small negative input maps to 1.0 exactly
    if y >= 1.0 { 0.0 } else { y }
}

pub(crate) fn wrap01_v3(v: V3) -> V3
{ v.map(wrap01) }

/// Shortest distance between two fractional positions, minimum-image style.
///
/// Only correct when the lattice is reasonably reduced, which is the only
/// situation in which the search algorithms use it.
pub(crate) fn nearest_distance(lattice: &crate::Lattice, a: &V3, b: &V3) -> f64
{
    let diff = (*a - *b).map(|x| x - x.round());
    (diff * lattice).norm()
}

// f64 -> i32 conversions on a silly little type, so that a tolerance can
// never be mistaken for the value being converted.
pub(crate) struct Tol(pub(crate) f64);
impl Tol {
    pub(crate) fn unfloat(&self, x: f64) -> Result<i32, IntPrecisionError>
    {Ok({
        let r = x.round();
        if (r - x).abs() > self.0 {
            throw!(IntPrecisionError {
                backtrace: failure::Backtrace::new(),
                value: x,
            });
        }
        r as i32
    })}

    pub(crate) fn unfloat_v3(&self, v: &V3) -> Result<V3<i32>, IntPrecisionError>
    { v.try_map(|x| self.unfloat(x)) }

    pub(crate) fn unfloat_m33(&self, m: &M33) -> Result<M33<i32>, IntPrecisionError>
    {Ok({
        M3([
            self.unfloat_v3(&m[0])?,
            self.unfloat_v3(&m[1])?,
            self.unfloat_v3(&m[2])?,
        ])
    })}
}

/// Exact inverse of a unimodular integer matrix.
///
/// # Panics
/// Panics if `abs(det) != 1`.
pub(crate) fn unimodular_inverse(m: &M33<i32>) -> M33<i32>
{
    assert_eq!(m.det().abs(), 1, "matrix is not unimodular: {:?}", m);
    let floats = inv(&m.map(|x| x as f64));
    Tol(1e-6).unfloat_m33(&floats).expect("bug!")
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use spgr_array_types::mat;

    #[test]
    fn unimodular_round_trip() {
        let m = mat::from_array([[1, 2, 0], [0, 1, 0], [1, 0, 1]]);
        let m_inv = unimodular_inverse(&m);
        assert_eq!(&m * &m_inv, mat::eye_i());
        assert_eq!(&m_inv * &m, mat::eye_i());
    }

    #[test]
    fn wrapping() {
        assert_eq!(wrap01(1.25), 0.25);
        assert_eq!(wrap01(-0.25), 0.75);
        assert_eq!(wrap01(-1e-300), 0.0);
    }
}
