use std::ops::{Div, Mul};
use std::sync::Arc;

use crate::SingularLatticeError;

use spgr_array_types::{det, inv, mat, M33, V3};

/// Defines a vector basis for periodic boundary conditions in three dimensions.
///
/// Rows of the matrix are lattice vectors.  The inverse is computed once at
/// construction and shared; a `Lattice` is thereafter an immutable pairing of
/// the two, cheap to clone.
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Arc<M33>,
    inverse: Arc<M33>,
}

// Manual impl that doesn't compare the inverse.
impl PartialEq<Lattice> for Lattice {
    fn eq(&self, other: &Lattice) -> bool {
        // deconstruct to get errors when new fields are added
        let Lattice { ref matrix, inverse: _ } = *self;
        matrix == &other.matrix
    }
}

impl Lattice {
    /// Create a lattice from a matrix where the rows are lattice vectors.
    ///
    /// # Panics
    /// Panics when the matrix is singular.  Input that is not known to be
    /// well-formed should go through [`Lattice::checked`] instead.
    #[inline]
    pub fn new(matrix: &M33) -> Self {
        let inverse = Arc::new(inv(matrix));
        let matrix = Arc::new(*matrix);
        Self { matrix, inverse }
    }

    /// Create a lattice, validating that the matrix is invertible.
    ///
    /// This is the entry point for externally supplied matrices; a singular
    /// lattice is a precondition violation everywhere else in the crate.
    pub fn checked(matrix: &M33) -> Result<Self, SingularLatticeError> {
        let scale = matrix.0.iter().map(|v| v.norm()).fold(1.0, |a, b| a * b);
        if det(matrix).abs() <= 1e-12 * scale.max(1e-300) {
            return Err(SingularLatticeError { backtrace: failure::Backtrace::new() });
        }
        Ok(Self::new(matrix))
    }

    #[inline(always)]
    pub fn from_vectors(vectors: &[V3; 3]) -> Self
    { Self::new(&spgr_array_types::M3(*vectors)) }

    /// Matrix where lattice vectors are rows.
    #[inline]
    pub fn matrix(&self) -> &M33
    { &self.matrix }

    /// Get the (precomputed) inverse of the matrix where lattice vectors are rows.
    #[inline]
    pub fn inverse_matrix(&self) -> &M33
    { &self.inverse }

    #[inline]
    pub fn vectors(&self) -> &[V3; 3]
    { &self.matrix().0 }

    pub fn norms(&self) -> [f64; 3]
    { [self.vectors()[0].norm(), self.vectors()[1].norm(), self.vectors()[2].norm()] }

    pub fn sqnorms(&self) -> [f64; 3]
    { [self.vectors()[0].sqnorm(), self.vectors()[1].sqnorm(), self.vectors()[2].sqnorm()] }

    /// Get the (positive) volume of the lattice cell.
    pub fn volume(&self) -> f64
    { self.matrix().det().abs() }

    /// The metric tensor `L L^T`.
    ///
    /// Two bases describe congruent cells exactly when their metric tensors
    /// are equal; the rotation search is built on this.
    pub fn metric(&self) -> M33
    { self.matrix() * &self.matrix().t() }

    /// Get the reciprocal lattice.
    ///
    /// This is defined as the inverse transpose.  **There is no 2 PI factor.**
    #[inline]
    pub fn reciprocal(&self) -> Self {
        Self {
            matrix: Arc::new(self.inverse.t()),
            inverse: Arc::new(self.matrix.t()),
        }
    }

    /// Take an integer linear combination of the lattice vectors.
    pub fn linear_combination(&self, coeffs: &M33<i32>) -> Lattice
    { &coeffs.map(|x| x as f64) * self }
}

/// Helper constructors
impl Lattice {
    /// The identity lattice.
    #[inline]
    pub fn eye() -> Self { Self::cubic(1.0) }

    #[inline]
    pub fn diagonal(&[x, y, z]: &[f64; 3]) -> Self { Self::orthorhombic(x, y, z) }

    /// A cubic lattice ((a, a, a), (90, 90, 90))
    #[inline]
    pub fn cubic(a: f64) -> Self { Self::orthorhombic(a, a, a) }

    /// An orthorhombic lattice ((a, b, c), (90, 90, 90))
    #[inline]
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self
    { Self::new(&mat::from_array([[a, 0., 0.], [0., b, 0.], [0., 0., c]])) }

    /// A hexagonal lattice ((a, a, c), (90, 90, 120))
    pub fn hexagonal(a: f64, c: f64) -> Self {
        let half_rt3 = 0.75_f64.sqrt();
        Self::new(&mat::from_array([
            [a, 0., 0.],
            [-0.5 * a, half_rt3 * a, 0.],
            [0., 0., c],
        ]))
    }

    /// Generate a random lattice for tests.
    ///
    /// Elements are pulled from a uniform distribution of [-x, x].
    /// Retries until the draw is comfortably nonsingular.
    #[cfg(test)]
    pub fn random_uniform(max: f64) -> Self {
        loop {
            let mut m = mat::eye();
            for row in &mut m.0 {
                *row = V3::from_fn(|_| (rand::random::<f64>() - 0.5) * 2.0 * max);
            }
            if let Ok(lattice) = Lattice::checked(&m) {
                return lattice;
            }
        }
    }
}

/// Defaults to the identity matrix.
impl Default for Lattice {
    #[inline]
    fn default() -> Lattice { Lattice::eye() }
}

impl<'a> From<&'a [[f64; 3]; 3]> for Lattice {
    #[inline(always)]
    fn from(m: &'a [[f64; 3]; 3]) -> Self
    { Lattice::new(&mat::from_array(*m)) }
}

impl<'a, 'b> Mul<&'b M33> for &'a Lattice {
    type Output = Lattice;

    fn mul(self, other: &'b M33) -> Lattice {
        Lattice::new(&(self.matrix() * other))
    }
}

impl<'a, 'b> Mul<&'b Lattice> for &'a M33 {
    type Output = Lattice;

    fn mul(self, other: &'b Lattice) -> Lattice {
        Lattice::new(&(self * other.matrix()))
    }
}

impl<'a, 'b> Mul<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn mul(self, other: &'b Lattice) -> V3 {
        self * other.matrix()
    }
}

impl<'b> Mul<&'b Lattice> for V3 {
    type Output = V3;

    fn mul(self, other: &'b Lattice) -> V3 {
        self * other.matrix()
    }
}

impl<'a, 'b> Div<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn div(self, other: &'b Lattice) -> V3 {
        self * other.inverse_matrix()
    }
}

impl<'b> Div<&'b Lattice> for V3 {
    type Output = V3;

    fn div(self, other: &'b Lattice) -> V3 {
        self * other.inverse_matrix()
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn get_inverse() {
        // matrix whose inverse should be able to be computed exactly
        // by any reasonable matrix inversion algorithm working on f64s
        let matrix = mat::from_array([
            [2.0, 2.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 2.0],
        ]);
        let exact_inverse = mat::from_array([
            [0.5, -0.25, 0.0],
            [0.0,  0.25, 0.0],
            [0.0,   0.0, 0.5],
        ]);

        let lattice = Lattice::new(&matrix);
        assert_eq!(&matrix, lattice.matrix());
        assert_eq!(&exact_inverse, lattice.inverse_matrix());

        assert_eq!(lattice.volume(), 16.0);
        assert_ne!(&Lattice::eye(), &lattice);
    }

    #[test]
    fn singular_is_rejected() {
        let matrix = mat::from_array([
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(Lattice::checked(&matrix).is_err());
        assert!(Lattice::checked(Lattice::cubic(2.0).matrix()).is_ok());
    }

    #[test]
    fn coordinate_conversion_order() {
        // a matrix not equal to its transpose
        let lattice = Lattice::new(&mat::from_array([
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ]));

        // rows are fractional data; `* lattice` makes them cartesian
        assert_eq!(V3([1.0, 0.0, 0.0]) * &lattice, V3([0.0, 1.0, 0.0]));
        assert_eq!(V3([1.0, 0.0, 0.0]) / &lattice, V3([0.0, 0.0, 1.0]));
    }
}
