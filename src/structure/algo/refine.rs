//! Cell refinement: the idealized ("Bravais") conventional cell.
//!
//! Downstream consumers that need *exact* symmetry (rather than
//! tolerance-approximate symmetry) work with the refined cell: its lattice
//! satisfies the crystal system's metric exactly, its positions are orbit
//! centroids, and its operator set composes exactly on the twelfths grid.

use crate::{Cell, Coords, FracOp, SymOp, SymmetryGroup};
use crate::algo::{find_perm, group, primitive, symmetry};
use crate::spacegroup::{self, db::SpacegroupOracle};
use crate::util;

use spgr_array_types::V3;

/// A refined cell and its fully symmetrized operation set (expressed in
/// the refined cell's own basis).
#[derive(Debug, Clone)]
pub struct Refined {
    pub cell: Cell,
    pub group: SymmetryGroup,
}

impl Refined {
    /// True when refinement failed; the refined cell then has no atoms.
    pub fn is_failure(&self) -> bool
    { self.cell.num_atoms() == 0 }
}

/// Produce the idealized conventional cell for a structure.
///
/// An input with no resolvable space group yields a zero-atom cell, the
/// documented failure signal; this is a degraded outcome, never a panic.
pub fn refine_cell(cell: &Cell, tol: f64, oracle: &dyn SpacegroupOracle) -> Refined {
    let failure = || Refined {
        cell: Cell::empty(cell.lattice().clone()),
        group: SymmetryGroup::from_ops(vec![SymOp::eye()]),
    };

    let pure = symmetry::pure_translations(cell, tol);
    let prim = match primitive::primitive_cell(cell, &pure, tol) {
        Ok(prim) => prim,
        Err(e) => {
            warn!("refinement failed during primitive reduction: {}", e);
            return failure();
        }
    };

    let cls = match spacegroup::classify_full(&prim.cell, cell.lattice(), tol, oracle) {
        Some(cls) => cls,
        None => {
            warn!("refinement failed: structure is unclassifiable");
            return failure();
        }
    };

    // orbit-centroid positions in the primitive basis
    let averaged = match average_positions(&prim.cell, cls.prim_group.ops(), tol) {
        Ok(avg) => avg,
        Err(e) => {
            // should not happen for operators that were just found under
            // the same tolerance, but a position-match failure only costs
            // the averaging step
            warn!("skipping symmetry averaging: {}", e);
            prim.cell.reduced_fracs()
        }
    };

    // carry the averaged atoms into the (shifted) conventional frame and
    // expand over the centering translations
    let to_conv = prim.cell.lattice().matrix() * cls.setting.lattice.inverse_matrix();
    let mut fracs = vec![];
    let mut types = vec![];
    for (frac, &ty) in izip!(&averaged, prim.cell.types()) {
        for &centering in &cls.setting.centering_translations {
            let conv = *frac * &to_conv - cls.origin_shift + centering;
            fracs.push(util::wrap01_v3(conv));
            types.push(ty);
        }
    }
    let refined_cell = Cell::new(cls.ideal_lattice.clone(), Coords::Fracs(fracs), types);

    // exact operator set: snap onto the twelfths grid and close the group
    let mut frac_ops: Vec<FracOp> = vec![];
    for op in &cls.conv_ops {
        match FracOp::from_sym_op(op, 0.01_f64.max(tol)) {
            Ok(frac_op) => {
                if !frac_ops.contains(&frac_op) {
                    frac_ops.push(frac_op);
                }
            }
            Err(_) => warn!(
                "dropping operator with translation off the twelfths grid: {:?}",
                op.translation(),
            ),
        }
    }
    if frac_ops.is_empty() {
        frac_ops.push(FracOp::eye());
    }
    let closed = group::generate_finite_group(&frac_ops, |a, b| a.then(b));
    let ops = closed.iter().map(FracOp::to_sym_op).collect();

    Refined {
        cell: refined_cell,
        group: SymmetryGroup::from_ops(ops),
    }
}

// For each atom, the centroid of its orbit images pulled back through all
// operations.  Image selection is permutation-based, pullback alignment is
// by nearest lattice image.
fn average_positions(
    prim: &Cell,
    ops: &[SymOp],
    tol: f64,
) -> Result<Vec<V3>, find_perm::PositionMatchError>
{Ok({
    let fracs = prim.reduced_fracs();
    let perms = find_perm::of_spacegroup_for_primitive(prim, ops, tol)?;

    let mut sums = vec![V3([0.0; 3]); fracs.len()];
    for (op, perm) in izip!(ops, &perms) {
        let inverse = op.inverted();
        for (i, &image) in perm.indices().iter().enumerate() {
            let pulled = inverse.transform_one(&fracs[image]);
            // pulled ~~ fracs[i] up to a whole lattice vector
            let aligned = pulled + (fracs[i] - pulled).map(f64::round);
            sums[i] += aligned;
        }
    }
    let scale = 1.0 / ops.len() as f64;
    sums.into_iter().map(|v| v * scale).collect()
})}
