//! Matching of transformed positions back onto the original atom list.
//!
//! Every accepted symmetry operation induces a permutation of the atoms;
//! this module finds those permutations under a tolerance.

use crate::{Cell, Lattice, SymOp};
use crate::oper::perm::{Perm, Permute};
use super::group::GroupTree;

use spgr_array_types::V3;

use failure::Backtrace;

#[derive(Debug, Fail)]
pub enum PositionMatchError {
    #[fail(display = "positions are too dissimilar")]
    NoMatch(Backtrace),
    #[fail(display = "multiple positions mapped to the same index")]
    DuplicateMatch(Backtrace),
}

/// Validate that a cell is symmetric under the given operators.
///
/// Slow, and not even always correct. (the voronoi cell of the lattice
/// must be fully contained within one cell image in each direction)
///
/// Works on any cell, primitive or not; every operator gets its own brute
/// force search.
///
/// # Panics
/// Panics when an operator fails to map the structure onto itself.
pub fn dumb_symmetry_test(
    cell: &Cell,
    ops: &[SymOp],
    tol: f64,
) -> Result<(), PositionMatchError>
{Ok({
    let lattice = cell.lattice();
    let from_fracs = cell.reduced_fracs();

    for op in ops {
        let to_fracs = op.transform_fracs(&from_fracs);
        let perm = brute_force_with_sort_trick(lattice, cell.types(), &from_fracs, &to_fracs, tol)?;
        dumb_validate_equivalent(
            lattice,
            &to_fracs,
            &from_fracs.to_vec().permuted_by(&perm),
            tol,
        )
    }
})}

// Slow, and not even always correct
fn dumb_nearest_distance(
    lattice: &Lattice,
    frac_a: &V3,
    frac_b: &V3,
) -> f64
{
    let diff = (*frac_a - *frac_b).map(|x| x - x.round());

    let mut diffs = vec![];
    for &a in &[-1., 0., 1.] {
        for &b in &[-1., 0., 1.] {
            for &c in &[-1., 0., 1.] {
                diffs.push(diff + V3([a, b, c]));
            }
        }
    }

    diffs.into_iter()
        .map(|v| (v * lattice).norm())
        .fold(std::f64::INFINITY, f64::min)
}

// Slow, and not even always correct
fn dumb_validate_equivalent(
    lattice: &Lattice,
    frac_a: &[V3],
    frac_b: &[V3],
    tol: f64,
) {
    assert_eq!(frac_a.len(), frac_b.len());
    for (a, b) in izip!(frac_a, frac_b) {
        let d = dumb_nearest_distance(lattice, a, b);
        assert!(d < tol * (1.0 + 1e-7));
    }
}

/// Compute permutations for all operators of a primitive cell.
///
/// Each returned perm satisfies `fracs.permuted_by(&perm) ~~ op.transform_fracs(&fracs)`
/// (approximately, modulo lattice translations).
///
/// Only the group generators get the expensive brute-force search; every
/// other operator's permutation is composed from earlier results.  On a
/// primitive cell the rotation part determines the operator, which is what
/// lets the group structure be discovered from hashable keys.
pub fn of_spacegroup_for_primitive(
    prim: &Cell,
    ops: &[SymOp],
    tol: f64,
) -> Result<Vec<Perm>, PositionMatchError>
{Ok({
    let lattice = prim.lattice();
    let types = prim.types();
    let from_fracs = prim.reduced_fracs();

    // Find relations between the group operators and
    // identify a small number of base cases ("generators").
    let tree = GroupTree::from_all_members(
        ops.iter().map(|op| *op.rotation()).collect(),
        // "a followed by b"; rotations compose contravariantly in
        // column convention
        |a, b| b * a,
    );

    tree.try_compute_homomorphism(
        // Generators: do the (expensive) brute force search.
        |op_index, _rot| Ok::<_, PositionMatchError>({
            let to_fracs = ops[op_index].transform_fracs(&from_fracs);
            let perm = brute_force_with_sort_trick(lattice, types, &from_fracs, &to_fracs, tol)?;
            dumb_validate_equivalent(
                lattice,
                &to_fracs,
                &from_fracs.to_vec().permuted_by(&perm),
                tol,
            );
            perm
        }),
        // Other operators: compose the results from two earlier ones.
        |a, b| Ok({
            // The order is flipped; the permutations come from
            // the opposite group.
            //
            // i.e.  given X[P_a[k]] ~~ T_a(X[k])
            //         and X[P_b[k]] ~~ T_b(X[k]),
            //  one can show  X[(P_b ∘ P_a)[k]] ~~ T_b(T_a(X[k]))
            b.clone().permuted_by(a)
        }),
    )?
})}

pub(crate) fn brute_force_with_sort_trick(
    lattice: &Lattice,
    types: &[i32],
    from_fracs: &[V3],
    to_fracs: &[V3],
    tol: f64,
) -> Result<Perm, PositionMatchError>
{Ok({
    use ordered_float::NotNan;

    // Sort both sides by some measure which is likely to produce a small
    // maximum value of (sorted_rotated_index - sorted_original_index).
    // This reduces an O(n^2) search down to ~O(n).
    // (for O(n log n) work overall, including the sort)
    //
    // We choose to sort first by atom type, then by distance to the nearest
    // bravais lattice point.
    let sort_by_lattice_distance = |fracs: &[V3]| {
        let mut fracs = fracs.to_vec();
        for v in &mut fracs {
            *v -= v.map(f64::round);
        }

        let data_to_sort: Vec<_> = fracs.iter()
            .map(|&v| (v * lattice).norm())
            .zip(types)
            .map(|(dist, &ty)| (
                ty, // first by atom type
                NotNan::new(dist).expect("positions contain NaN"),
            ))
            .collect();
        let perm = Perm::argsort(&data_to_sort);
        (perm.clone(), fracs.permuted_by(&perm))
    };

    let (perm_from, sorted_from) = sort_by_lattice_distance(from_fracs);
    let (perm_to, sorted_to) = sort_by_lattice_distance(to_fracs);

    let perm_between = brute_force_near_identity(
        lattice,
        &sorted_from,
        &sorted_to,
        tol,
    )?;

    // Compose all of the permutations for the full permutation.
    //
    // Note that permutations are associative; that is,
    //     x.permute(p).permute(q) == x.permute(p.permute(q))
    perm_from
        .permuted_by(&perm_between)
        .permuted_by(&perm_to.inverted())
})}

// Optimized for permutations near the identity.
// NOTE: Lattice must be reduced so that the voronoi cell fits
//       within the eight unit cells around the origin
fn brute_force_near_identity(
    lattice: &Lattice,
    from_fracs: &[V3],
    to_fracs: &[V3],
    tol: f64,
) -> Result<Perm, PositionMatchError>
{Ok({
    assert_eq!(from_fracs.len(), to_fracs.len());
    let n = from_fracs.len();

    const UNSET: usize = std::usize::MAX;
    assert!(n < UNSET);

    let mut perm = vec![UNSET; n];

    // optimization: Rather than filling the out vector in order,
    // we find where each index belongs (e.g. we place the 0, then
    // we place the 1, etc.).
    // Then we can track the first unassigned index.
    //
    // This works best if the permutation is close to the identity.
    // (more specifically, if the max value of 'out[i] - i' is small)
    let mut search_start = 0;

    'from: for from in 0..n {

        // Skip through things filled out of order.
        while perm[search_start] != UNSET {
            search_start += 1;
        }

        for to in search_start..n {
            if perm[to] != UNSET {
                continue;
            }

            let distance2 = {
                let diff = (from_fracs[from] - to_fracs[to]).map(|x| x - x.round());
                (diff * lattice).sqnorm()
            };
            if distance2 < tol * tol {
                perm[to] = from;
                continue 'from;
            }
        }
        throw!(PositionMatchError::NoMatch(Backtrace::new()));
    }

    if perm.iter().any(|&x| x == UNSET) {
        throw!(PositionMatchError::DuplicateMatch(Backtrace::new()));
    }

    Perm::from_vec(perm).expect("bug! (invalid perm without match error!?)")
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::Lattice;
    use super::*;

    fn random_problem(n: usize) -> (Vec<V3>, Perm, Vec<V3>)
    {
        let original: Vec<V3> =
            (0..n).map(|_| V3::from_fn(|_| rand::random::<f64>())).collect();
        let perm = Perm::random(n);
        let permuted = original.clone().permuted_by(&perm);
        (original, perm, permuted)
    }

    #[test]
    fn brute_force_works() {
        let (original, perm, permuted) = random_problem(20);
        let lattice = Lattice::random_uniform(1.0);

        let output = super::brute_force_near_identity(
            &lattice, &original, &permuted, 1e-5,
        ).unwrap();

        assert_eq!(output, perm);
    }

    #[test]
    fn sort_trick_works() {
        let (original, perm, permuted) = random_problem(20);
        let lattice = Lattice::random_uniform(1.0);

        let output = super::brute_force_with_sort_trick(
            &lattice, &[0; 20], &original, &permuted, 1e-5,
        ).unwrap();

        assert_eq!(output, perm);
    }

    #[test]
    fn no_match_is_reported() {
        let lattice = Lattice::cubic(1.0);
        let from = vec![V3([0.0, 0.0, 0.0]), V3([0.25, 0.0, 0.0])];
        let to = vec![V3([0.0, 0.0, 0.0]), V3([0.5, 0.0, 0.0])];
        assert!(super::brute_force_near_identity(&lattice, &from, &to, 1e-5).is_err());
    }
}
