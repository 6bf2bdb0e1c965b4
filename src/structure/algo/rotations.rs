//! Enumeration of the point group of a lattice (ignoring the atoms).
//!
//! Every rotation that maps a lattice onto itself corresponds to a
//! unimodular integer matrix which preserves the metric tensor:
//!
//! ```text
//! (S L) (S L)^T == L L^T        (S = fractional operator, rows)
//! ```
//!
//! The diagonal of this equality says each row of `S L` has the length of
//! the corresponding row of `L`; for a reduced basis only a small ball of
//! lattice points can satisfy that, which makes the search space tiny.
//! A 3D lattice point group has at most 48 elements, and the candidates
//! are pruned accordingly.

use crate::Coords;
use super::reduction::LatticeReduction;

use spgr_array_types::{dot, M3, M33, V3};

/// Find all integer rotations `S` (acting on row-based fractional data of
/// the *original* lattice: `f' = f S`) that map the lattice to itself with
/// its metric preserved to within `tol` (relative, on lengths).
pub(crate) fn lattice_point_group(
    reduction: &LatticeReduction,
    tol: f64,
) -> Vec<M33<i32>>
{
    let ops = reduced_lattice_point_group(reduction, tol);

    // map each operator back to the original basis;
    // with T unimodular this stays exactly integer
    let t_mat = reduction.transform();
    let t_inv = reduction.inverse_transform();

    let ops: Vec<_> = ops.into_iter()
        .map(|s| &(t_inv * &s) * t_mat)
        .collect();

    if ops.len() > 48 {
        // spurious operations; almost certainly a wildly loose tolerance
        warn!("tolerance admits {} lattice rotations (the limit is 48)", ops.len());
    }
    ops
}

fn reduced_lattice_point_group(
    reduction: &LatticeReduction,
    tol: f64,
) -> Vec<M33<i32>>
{
    let lattice = reduction.reduced();

    // For each basis vector, the lattice points that could be its image.
    let lengths = lattice.norms();
    let choices: Vec<Vec<V3<i32>>> = lengths.iter()
        .map(|&len| lattice_points_of_length(reduction, len, tol))
        .collect();

    let carts = |points: &[V3<i32>]| -> Vec<V3> {
        Coords::Fracs(points.iter().map(|v| v.map(f64::from)).collect())
            .into_carts(lattice)
    };
    let (carts_0, carts_1, carts_2) = (carts(&choices[0]), carts(&choices[1]), carts(&choices[2]));

    // off diagonal elements of L L^T
    let metric_off_diags = |m: &[V3; 3]| [
        dot(&m[1], &m[2]),
        dot(&m[2], &m[0]),
        dot(&m[0], &m[1]),
    ];
    let target = metric_off_diags(lattice.vectors());
    let off_diag_tols = [
        tol * lengths[1] * lengths[2],
        tol * lengths[2] * lengths[0],
        tol * lengths[0] * lengths[1],
    ];

    let mut out = vec![];
    for (&frac_0, &cart_0) in izip!(&choices[0], &carts_0) {
        for (&frac_1, &cart_1) in izip!(&choices[1], &carts_1) {
            for (&frac_2, &cart_2) in izip!(&choices[2], &carts_2) {
                // most of these matrices aren't unimodular; drop them
                let candidate = M3([frac_0, frac_1, frac_2]);
                if candidate.det().abs() != 1 {
                    continue;
                }

                // the rows already have the right lengths; checking the
                // off-diagonal metric entries completes (S L)(S L)^T == L L^T
                let off_diags = metric_off_diags(&[cart_0, cart_1, cart_2]);
                if (0..3).all(|k| (off_diags[k] - target[k]).abs() <= off_diag_tols[k]) {
                    out.push(candidate);
                }
            }
        }
    }
    out
}

fn lattice_points_of_length(
    reduction: &LatticeReduction,
    target_length: f64,
    tol: f64,
) -> Vec<V3<i32>>
{
    Coords::Fracs(LATTICE_POINTS_FLOAT.clone())
        .into_carts(reduction.reduced())
        .into_iter()
        .map(|v| v.norm())
        .enumerate()
        .filter(|&(_, r)| (r - target_length).abs() < tol * target_length)
        .map(|(i, _)| LATTICE_POINTS_INT[i])
        .collect()
}

lazy_static! {
    // Fractional lattice coordinates large enough that, for a reduced cell,
    // the ball contains every vector equal in length to a cell vector.
    // (Le Page (1982) argues |coeff| <= 2 suffices for reduced bases)
    static ref LATTICE_POINTS_INT: Vec<V3<i32>> = {
        const MAX: i32 = 2;
        let mut points = Vec::with_capacity((2 * MAX as usize + 1).pow(3));
        for i in -MAX..=MAX {
            for j in -MAX..=MAX {
                for k in -MAX..=MAX {
                    points.push(V3([i, j, k]));
                }
            }
        }
        points
    };

    static ref LATTICE_POINTS_FLOAT: Vec<V3> =
        LATTICE_POINTS_INT.iter().map(|&v| v.map(f64::from)).collect();
}

/// Sanity check used by callers: verify an operator found in the original
/// basis still preserves the metric there.
#[cfg(test)]
pub(crate) fn preserves_metric(s: &M33<i32>, lattice: &crate::Lattice, tol: f64) -> bool {
    let transformed = lattice.linear_combination(s);
    let (a, b) = (transformed.metric(), lattice.metric());
    izip!(a.0.iter(), b.0.iter())
        .all(|(ra, rb)| izip!(ra, rb).all(|(x, y)| (x - y).abs() <= tol * y.abs().max(1.0)))
}
