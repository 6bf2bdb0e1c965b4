//! The symmetry operation search.
//!
//! Candidate rotations come from the lattice point group; candidate
//! translations come from anchoring one atom against every atom of the same
//! species.  A candidate pair is accepted when it maps *every* atom onto an
//! atom of the same species at a lattice-equivalent position within the
//! tolerance.

use crate::{Cell, SymOp, SymmetryGroup};
use crate::algo::{find_perm, reduction, rotations};
use crate::util;

use spgr_array_types::{mat, M33, V3};

/// Find the full symmetry group of a cell under tolerance `tol`.
///
/// The result always contains the identity; a group of size 1 means the
/// structure has no symmetry beyond trivial translation, which is a
/// legitimate outcome rather than an error.
///
/// When several translations satisfy the same rotation at the tolerance
/// boundary, all of them are kept as distinct operations; only exactly
/// equal `(R, t)` pairs are deduplicated.
pub fn find_symmetry(cell: &Cell, tol: f64) -> SymmetryGroup {
    let rots = rotations::lattice_point_group(&reduction::reduce(cell.lattice()), tol);
    let ops = operations_for_rotations(cell, &rots, tol);
    SymmetryGroup::from_ops(ops)
}

/// Find only the pure translations of a cell (identity rotation).
///
/// The size of the result is the multiplicity of the primitive cell inside
/// `cell`; the zero translation is always present.
pub fn pure_translations(cell: &Cell, tol: f64) -> Vec<V3> {
    let eye = [mat::eye_i()];
    operations_for_rotations(cell, &eye, tol)
        .into_iter()
        .map(|op| *op.translation())
        .collect()
}

// `rots` are integer operators acting on row-based fractional data
// (`f' = f S`, with S = W^T for the conventional column form W).
fn operations_for_rotations(cell: &Cell, rots: &[M33<i32>], tol: f64) -> Vec<SymOp> {
    let lattice = cell.lattice();
    let types = cell.types();
    let fracs = cell.reduced_fracs();

    if fracs.is_empty() {
        return vec![SymOp::eye()];
    }

    // Anchor on the scarcest species; every valid operation must map the
    // anchor atom onto some atom of that species, which fixes the
    // translation candidates.
    let anchor = {
        let count_of = |ty: i32| types.iter().filter(|&&t| t == ty).count();
        (0..types.len())
            .min_by_key(|&i| count_of(types[i]))
            .expect("no atoms")
    };

    let mut ops: Vec<SymOp> = vec![];
    for s in rots {
        let s_float = s.map(f64::from);
        let rotated: Vec<V3> = fracs.iter().map(|v| v * &s_float).collect();

        for j in 0..types.len() {
            if types[j] != types[anchor] {
                continue;
            }
            let trans = util::wrap01_v3(fracs[j] - rotated[anchor]);

            let to_fracs: Vec<V3> = rotated.iter().map(|&v| v + trans).collect();
            match find_perm::brute_force_with_sort_trick(lattice, types, &fracs, &to_fracs, tol) {
                Ok(_) => {
                    let op = SymOp::new(&s.t(), &trans);
                    if !ops.contains(&op) {
                        ops.push(op);
                    }
                }
                Err(e) => trace!("rejected candidate operation: {}", e),
            }
        }
    }

    assert!(
        ops.iter().any(SymOp::is_identity),
        "bug! (the identity should always survive the search)",
    );

    // identity first, then pure translations; the order is part of no
    // contract but makes logs and tests easier to read
    ops.sort_by_key(|op| !op.is_identity());
    debug!("found {} operations ({} pure translations)",
        ops.len(),
        ops.iter().filter(|op| op.is_pure_translation()).count(),
    );
    ops
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::{Cell, Coords, Lattice};
    use super::*;

    fn cell(lattice: Lattice, fracs: Vec<[f64; 3]>, types: Vec<i32>) -> Cell {
        use spgr_array_types::Envee;
        Cell::new(lattice, Coords::Fracs(fracs.envee()), types)
    }

    #[test]
    fn single_atom_cubic_cell() {
        let cell = cell(Lattice::cubic(4.0), vec![[0.0, 0.0, 0.0]], vec![1]);
        let group = find_symmetry(&cell, 1e-5);
        assert_eq!(group.len(), 48);
        assert_eq!(group.multiplicity(), 1);
        find_perm::dumb_symmetry_test(&cell, group.ops(), 1e-5).unwrap();
    }

    #[test]
    fn no_symmetry_means_identity_only() {
        let cell = cell(
            Lattice::new(&mat::from_array([
                [3.1, 0.0, 0.0],
                [0.4, 4.7, 0.0],
                [-0.9, 1.3, 5.3],
            ])),
            vec![[0.0, 0.0, 0.0], [0.137, 0.271, 0.413]],
            vec![1, 2],
        );
        let group = find_symmetry(&cell, 1e-5);
        // the lattice itself is triclinic, and the off-site atom breaks
        // even the inversion
        assert_eq!(group.len(), 1);
        assert!(group.ops()[0].is_identity());
    }

    #[test]
    fn body_centered_translations() {
        let cell = cell(
            Lattice::cubic(4.0),
            vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
            vec![1, 1],
        );
        let pure = pure_translations(&cell, 1e-5);
        assert_eq!(pure.len(), 2);
        let group = find_symmetry(&cell, 1e-5);
        assert_eq!(group.len(), 96);
        assert_eq!(group.multiplicity(), 2);
    }

    #[test]
    fn species_must_match() {
        // same sites as the body-centered cell, but distinct species
        // (a CsCl-like arrangement); the centering translation is gone
        let cell = cell(
            Lattice::cubic(4.0),
            vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
            vec![1, 2],
        );
        let group = find_symmetry(&cell, 1e-5);
        assert_eq!(group.multiplicity(), 1);
        assert_eq!(group.len(), 48);
    }

    #[test]
    fn every_op_maps_the_cell() {
        let cell = cell(
            Lattice::cubic(4.0),
            // rock-salt arrangement
            vec![
                [0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0],
                [0.5, 0.5, 0.5], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5],
            ],
            vec![11, 11, 11, 11, 17, 17, 17, 17],
        );
        let group = find_symmetry(&cell, 1e-5);
        assert_eq!(group.multiplicity(), 4);
        assert_eq!(group.len(), 4 * 48);
        find_perm::dumb_symmetry_test(&cell, group.ops(), 1e-5).unwrap();
    }
}
