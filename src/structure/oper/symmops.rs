use crate::util;
use crate::IntPrecisionError;

use spgr_array_types::{mat, M33, V3};

// NOTE: Two operator representations live here.
//
//  * `SymOp` is what the symmetry search produces: an integer rotation with a
//    float translation, correct only to within the search tolerance.
//  * `FracRot`/`FracTrans`/`FracOp` are exact, with translations stored as
//    twelfths.  They exist for refined cells, where operators must compose
//    exactly and be usable as hash keys.

/// One space-group operation on a cell, as found by the symmetry search.
///
/// The rotation is an integer matrix acting on fractional coordinates
/// (`x' = R x`, columns); the translation is fractional, in `[0, 1)`.
///
/// Invariants:
///  - `abs(det(rot)) == 1`
///  - translation components lie in `[0.0, 1.0)`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymOp {
    rot: M33<i32>,
    trans: V3,
}

impl SymOp {
    pub fn eye() -> Self
    { SymOp { rot: mat::eye_i(), trans: V3([0.0; 3]) } }

    pub fn new(rot: &M33<i32>, trans: &V3) -> Self {
        assert_eq!(rot.det().abs(), 1);
        SymOp { rot: *rot, trans: util::wrap01_v3(*trans) }
    }

    pub fn rotation(&self) -> &M33<i32>
    { &self.rot }

    pub fn translation(&self) -> &V3
    { &self.trans }

    pub fn is_pure_translation(&self) -> bool
    { self.rot == mat::eye_i() }

    pub fn is_identity(&self) -> bool
    { self.is_pure_translation() && self.trans == V3([0.0; 3]) }

    /// The rotation transposed into row-vector form, as floats.
    pub(crate) fn float_rot_t(&self) -> M33
    { self.rot.t().map(|x| f64::from(x)) }

    pub fn transform_one(&self, frac: &V3) -> V3
    { frac * &self.float_rot_t() + self.trans }

    pub fn transform_fracs(&self, fracs: &[V3]) -> Vec<V3>
    {
        let rt = self.float_rot_t();
        fracs.iter().map(|v| v * &rt + self.trans).collect()
    }

    /// The inverse operation (exact in the rotation, float in the translation).
    pub fn inverted(&self) -> SymOp {
        let rot_inv = util::unimodular_inverse(&self.rot);
        let trans = -(self.trans * &rot_inv.t().map(f64::from));
        SymOp::new(&rot_inv, &trans)
    }
}

/// The full set of operations found for a cell.
///
/// Always contains the identity; for a cell with no other symmetry the group
/// has size 1, which is a legitimate result rather than a failure.
#[derive(Debug, Clone)]
pub struct SymmetryGroup {
    ops: Vec<SymOp>,
}

impl SymmetryGroup {
    pub(crate) fn from_ops(ops: Vec<SymOp>) -> Self {
        assert!(
            ops.iter().any(|op| op.is_identity()),
            "bug! (operation set without the identity)",
        );
        SymmetryGroup { ops }
    }

    pub fn ops(&self) -> &[SymOp]
    { &self.ops }

    pub fn len(&self) -> usize
    { self.ops.len() }

    pub fn is_empty(&self) -> bool
    { self.ops.is_empty() }

    /// The pure-translation subgroup, as translation vectors (zero included).
    pub fn pure_translations(&self) -> Vec<V3> {
        self.ops.iter()
            .filter(|op| op.is_pure_translation())
            .map(|op| *op.translation())
            .collect()
    }

    /// Multiplicity of the primitive cell inside the searched cell.
    pub fn multiplicity(&self) -> usize
    { self.pure_translations().len() }

    /// Rotation parts of every operation, in order (duplicates included).
    pub fn rotations(&self) -> Vec<M33<i32>>
    { self.ops.iter().map(|op| *op.rotation()).collect() }

    /// The distinct rotations, i.e. the point group part.
    pub fn distinct_rotations(&self) -> Vec<M33<i32>> {
        let mut out: Vec<M33<i32>> = vec![];
        for op in &self.ops {
            if !out.contains(op.rotation()) {
                out.push(*op.rotation());
            }
        }
        out
    }
}

//---------------------------------------------------------------------------

/// A point group operation on a primitive cell.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FracRot {
    /// This is the transpose of what one would
    /// typically think of as the "rotation matrix".
    ///
    /// Invariants:
    ///  - `abs(det(t)) == 1`
    t: M33<i32>,
}

/// The translation part of a spacegroup operation on a primitive cell.
///
/// This always has coordinates that are multiples of `1/12`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FracTrans(
    /// This is the vector times 12.
    ///
    /// Invariants:
    ///  - elements are reduced into the range `0 <= x < 12`.
    V3<i32>,
);

/// A spacegroup operation on a primitive cell, exact in both parts.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FracOp {
    rot: FracRot,
    trans: FracTrans,
}

impl Default for FracRot {
    fn default() -> Self
    { Self::eye() }
}

impl Default for FracTrans {
    fn default() -> Self
    { Self::eye() }
}

impl Default for FracOp {
    fn default() -> Self
    { Self::eye() }
}

impl FracRot {
    pub fn eye() -> Self
    { FracRot { t: mat::eye_i() } }

    /// Construct from a matrix.
    ///
    /// The input should be a matrix `R` such that `X R^T ~ X`,
    /// where the rows of `X` are fractional positions.
    pub fn new(mat: &M33<i32>) -> FracRot {
        assert_eq!(mat.det().abs(), 1);
        FracRot { t: mat.t() }
    }

    /// The conventional (column-acting) rotation matrix.
    pub fn matrix(&self) -> M33<i32>
    { self.t.t() }

    // transposed float matrix
    pub(crate) fn float_t(&self) -> M33
    { self.t.map(|x| f64::from(x)) }

    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.  The flipped order is more aligned
    /// with this library's generally row-centric design.
    pub fn then(&self, other: &FracRot) -> FracRot
    {
        // (since these are transposes, this is the natural order of application)
        FracRot { t: &self.t * &other.t }
    }

    /// Conventional group operator.
    pub fn of(&self, other: &FracRot) -> FracRot
    { other.then(self) }

    pub fn transform_fracs(&self, fracs: &[V3]) -> Vec<V3>
    { fracs.iter().map(|v| v * &self.float_t()).collect() }
}

impl<'a> From<&'a [[i32; 3]; 3]> for FracRot {
    fn from(m: &'a [[i32; 3]; 3]) -> Self
    { FracRot::new(&mat::from_array(*m)) }
}

impl FracTrans {
    pub fn eye() -> Self
    { FracTrans(V3([0, 0, 0])) }

    /// Snap a float translation onto the twelfths grid.
    ///
    /// `tol` is an absolute tolerance on the fractional coordinates.
    pub fn from_floats(xs: &V3, tol: f64) -> Result<FracTrans, IntPrecisionError>
    {
        xs.try_map(|x| util::Tol(tol * 12.0).unfloat(x * 12.0))
            .map(|v| FracTrans(v.map(|x| x.rem_euclid(12))))
    }

    pub fn float(&self) -> V3
    { self.0.map(|x| f64::from(x) / 12f64) }
}

impl FracOp {
    pub fn eye() -> Self
    { FracOp { rot: FracRot::eye(), trans: FracTrans::eye() } }

    pub fn new(rot: &FracRot, trans: &FracTrans) -> Self
    { FracOp { rot: rot.clone(), trans: trans.clone() } }

    pub fn to_rot(&self) -> FracRot
    { self.rot.clone() }

    pub fn to_trans(&self) -> FracTrans
    { self.trans.clone() }

    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.
    pub fn then(&self, other: &FracOp) -> FracOp
    {
        // row convention: x (A_t B_t) + (ta B_t + tb)
        let t = &self.rot.t * &other.rot.t;
        let trans = self.trans.0 * &other.rot.t + other.trans.0;
        let trans = trans.map(|x| x.rem_euclid(12));
        FracOp { rot: FracRot { t }, trans: FracTrans(trans) }
    }

    /// Conventional group operator.
    pub fn of(&self, other: &FracOp) -> FracOp
    { other.then(self) }

    pub fn transform_fracs(&self, fracs: &[V3]) -> Vec<V3>
    {
        let mut out = self.rot.transform_fracs(fracs);
        util::translate_mut_n3_3(&mut out, &self.trans.float());
        out
    }

    /// View as an inexact operation.
    pub fn to_sym_op(&self) -> SymOp
    { SymOp::new(&self.rot.matrix(), &self.trans.float()) }

    /// Snap an inexact operation onto the twelfths grid.
    pub fn from_sym_op(op: &SymOp, tol: f64) -> Result<FracOp, IntPrecisionError>
    {Ok({
        FracOp {
            rot: FracRot::new(op.rotation()),
            trans: FracTrans::from_floats(op.translation(), tol)?,
        }
    })}
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use spgr_array_types::Envee;

    #[test]
    fn rot_transform()
    {
        let r = [
            [0, -1, 0],
            [1,  0, 0],
            [0,  0, 1],
        ];
        assert_eq!(
            FracRot::from(&r).transform_fracs([[1.0, 5.0, 7.0]].envee_ref()),
            vec![[-5.0, 1.0, 7.0]].envee(),
        );
    }

    #[test]
    fn two_transform()
    {
        // two operations that don't commute
        let xy = FracRot::from(&[
            [0, 1, 0],
            [1, 0, 0],
            [0, 0, 1],
        ]);
        let zx = FracRot::from(&[
            [0, 0, 1],
            [0, 1, 0],
            [1, 0, 0],
        ]);
        let xyzx = FracRot::from(&[
            [0, 0, 1],
            [1, 0, 0],
            [0, 1, 0],
        ]);
        // a primitive structure that is sensitive to any permutations of the axes
        let prim = vec![[1., 2., 3.]].envee();
        assert_eq!(xy.then(&zx), xyzx);
        assert_eq!(zx.of(&xy), xyzx);
        assert_eq!(
            zx.transform_fracs(&xy.transform_fracs(&prim)),
            xyzx.transform_fracs(&prim),
        );

        let t = FracTrans::eye();
        let xy = FracOp::new(&xy, &t);
        let zx = FracOp::new(&zx, &t);
        let xyzx = FracOp::new(&xyzx, &t);
        assert_eq!(xy.then(&zx), xyzx);
        assert_eq!(zx.of(&xy), xyzx);
        assert_eq!(
            zx.transform_fracs(&xy.transform_fracs(&prim)),
            xyzx.transform_fracs(&prim),
        );
    }

    #[test]
    fn symmop_mul()
    {
        let op = FracOp::new(
            &FracRot::from(&[
                [ 0,  1, 0],
                [-1,  1, 0],
                [ 0,  0, 1],
            ]),
            &FracTrans::from_floats(&V3([1./3., 2./3., 0.0]), 1e-4).unwrap(),
        );
        let square = FracOp::new(
            &FracRot::from(&[
                [-1, 1, 0],
                [-1, 0, 0],
                [ 0, 0, 1],
            ]),
            &FracTrans::from_floats(&V3([0., 0., 0.]), 1e-4).unwrap(),
        );

        assert_eq!(op.then(&op), square);
    }

    #[test]
    fn sym_op_inverse() {
        let op = SymOp::new(
            &spgr_array_types::mat::from_array([[0, -1, 0], [1, 0, 0], [0, 0, 1]]),
            &V3([0.5, 0.25, 0.0]),
        );
        let inv = op.inverted();
        let x = V3([0.1, 0.2, 0.3]);
        // inversion holds modulo lattice translations (the inverse's
        // translation gets wrapped back into [0, 1))
        let round_trip = inv.transform_one(&op.transform_one(&x));
        for k in 0..3 {
            let d = round_trip[k] - x[k];
            assert!((d - d.round()).abs() < 1e-12);
        }
    }
}
