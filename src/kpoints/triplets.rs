//! Momentum-conserving triplet reduction.
//!
//! Triples `(q1, q2, q3)` of grid points with `q1 + q2 + q3 = 0` modulo the
//! mesh periodicity, reduced under a rotation group acting simultaneously
//! on all three legs.  This is the enumeration backing multi-phonon
//! scattering sums, where weights count how many raw processes one
//! representative triplet stands for.

use crate::mesh::{ir_mesh, IrSet, Mesh};

use spgr_array_types::{M33, V3};

use failure::Backtrace;

/// A reduced triplet list with orbit weights.
#[derive(Debug, Clone)]
pub struct Triplets {
    pub mesh: Mesh,
    /// Representative triplets, as grid-point indices.
    pub triplets: Vec<[usize; 3]>,
    /// Orbit size per representative; sums to (grid size)^2 for a full
    /// reduction.
    pub weights: Vec<usize>,
}

/// Triplet reduction with the first leg pinned to one grid point.
///
/// `weights[q2]` is nonzero exactly at the representatives of `q2`'s orbit
/// under the little group of the fixed point, and `third[q2]` is the index
/// of the conservation partner `q3` for every `q2`.
#[derive(Debug, Clone)]
pub struct TripletsAtQ {
    pub mesh: Mesh,
    pub fixed: usize,
    pub weights: Vec<usize>,
    pub third: Vec<usize>,
    pub num_ir: usize,
}

#[derive(Debug, Fail)]
pub enum ExtractError {
    #[fail(display = "no rotation relates the fixed point to its representative")]
    NoPathToRepresentative(Backtrace),
    #[fail(display = "weights are not divisible by the orbit size")]
    BadWeights(Backtrace),
}

/// The grid point that closes a momentum-conserving triple.
///
/// # Panics
/// Panics on a mesh with shifted axes: the conservation partner of two
/// half-shifted coordinates never lies on the same grid, so triplet
/// enumeration is only defined for unshifted meshes.
pub fn third_index(mesh: &Mesh, i1: usize, i2: usize) -> usize {
    assert_eq!(
        mesh.shift(), [false; 3],
        "triplet reduction requires an unshifted mesh",
    );
    let d1 = mesh.double_address(i1);
    let d2 = mesh.double_address(i2);
    // on the double grid: d3 = -(d1 + d2), even whenever d1, d2 are
    let address = V3::from_fn(|k| {
        let d3 = -(d1[k] + d2[k]);
        debug_assert_eq!(d3.rem_euclid(2), 0);
        d3 / 2
    });
    mesh.index_of(&address)
}

/// Reduce the full set of momentum-conserving triplets on a mesh.
///
/// `q1` runs over the irreducible points of the unrestricted reduction,
/// `q2` over the points irreducible under `q1`'s little group, and `q3` is
/// fixed by conservation.  Weights multiply, so they sum to N^2.
pub fn ir_triplets(mesh: &Mesh, rotations: &[M33<i32>], time_reversal: bool) -> Triplets {
    let ir = ir_mesh(mesh, rotations, time_reversal);
    let ir_weights = ir.weights();

    let mut triplets = vec![];
    let mut weights = vec![];
    for &q1 in &ir.representatives() {
        let at_q = ir_triplets_at_q(mesh, q1, rotations, time_reversal);
        for q2 in 0..mesh.num_points() {
            if at_q.weights[q2] == 0 {
                continue;
            }
            triplets.push([q1, q2, at_q.third[q2]]);
            weights.push(ir_weights[q1] * at_q.weights[q2]);
        }
    }

    debug!(
        "triplet reduction: {} of {} triplets survive",
        triplets.len(),
        mesh.num_points() * mesh.num_points(),
    );
    Triplets { mesh: *mesh, triplets, weights }
}

/// Reduce triplets whose first leg is pinned to `fixed`.
///
/// Only the little group of the fixed point acts; it leaves `q1` in place
/// and permutes the `(q2, q3)` pairs.
pub fn ir_triplets_at_q(
    mesh: &Mesh,
    fixed: usize,
    rotations: &[M33<i32>],
    time_reversal: bool,
) -> TripletsAtQ {
    let rots = mesh.compatible_rotations(rotations, time_reversal);
    let little: Vec<M33<i32>> = rots.into_iter()
        .filter(|rot| mesh.rotate_index(rot, fixed) == fixed)
        .collect();

    let reduced = reduce_under(mesh, &little);
    let weights = reduced.weights();
    let num_ir = reduced.num_ir();
    let third = (0..mesh.num_points())
        .map(|q2| third_index(mesh, fixed, q2))
        .collect();

    TripletsAtQ { mesh: *mesh, fixed, weights, third, num_ir }
}

// like mesh::ir_mesh but for an already-filtered rotation set
fn reduce_under(mesh: &Mesh, rotations: &[M33<i32>]) -> IrSet {
    let n = mesh.num_points();
    let map = (0..n)
        .map(|i| {
            rotations.iter()
                .map(|rot| mesh.rotate_index(rot, i))
                .min()
                .unwrap_or(i)
                .min(i)
        })
        .collect();
    IrSet { map }
}

/// Re-derive the triplet list of a symmetry-related fixed point from an
/// already-computed full triplet list, by relabeling through the rotation
/// that connects the two points; no fresh orbit search happens here.
pub fn extract_triplets_at_q(
    full: &Triplets,
    fixed: usize,
    rotations: &[M33<i32>],
    time_reversal: bool,
) -> Result<Triplets, ExtractError>
{Ok({
    let mesh = &full.mesh;
    let rots = mesh.compatible_rotations(rotations, time_reversal);
    let ir = ir_mesh(mesh, rotations, time_reversal);
    let rep = ir.map[fixed];
    let rep_weight = ir.weights()[rep];

    // a rotation carrying the representative onto the fixed point
    let carry = rots.iter()
        .find(|rot| mesh.rotate_index(rot, rep) == fixed)
        .ok_or_else(|| ExtractError::NoPathToRepresentative(Backtrace::new()))?;

    let mut triplets = vec![];
    let mut weights = vec![];
    for (triplet, &weight) in izip!(&full.triplets, &full.weights) {
        if triplet[0] != rep {
            continue;
        }
        if weight % rep_weight != 0 {
            throw!(ExtractError::BadWeights(Backtrace::new()));
        }
        triplets.push([
            fixed,
            mesh.rotate_index(carry, triplet[1]),
            mesh.rotate_index(carry, triplet[2]),
        ]);
        weights.push(weight / rep_weight);
    }
    Triplets { mesh: *mesh, triplets, weights }
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::mesh::cubic_rotations;
    use super::*;
    use spgr_array_types::mat;

    fn conservation_holds(mesh: &Mesh, triplet: &[usize; 3]) -> bool {
        let total = V3::from_fn(|k| {
            (0..3).map(|leg| mesh.double_address(triplet[leg])[k]).sum::<i32>()
        });
        (0..3).all(|k| total[k].rem_euclid(2 * mesh.dims()[k]) == 0)
    }

    #[test]
    fn identity_triplets_enumerate_everything() {
        let mesh = Mesh::new([2, 2, 2], [false; 3]).unwrap();
        let trip = ir_triplets(&mesh, &[mat::eye_i()], false);
        assert_eq!(trip.triplets.len(), 64);
        assert!(trip.weights.iter().all(|&w| w == 1));
        for t in &trip.triplets {
            assert!(conservation_holds(&mesh, t));
        }
    }

    #[test]
    fn cubic_triplets_conserve_and_count() {
        let mesh = Mesh::new([2, 2, 2], [false; 3]).unwrap();
        let trip = ir_triplets(&mesh, &cubic_rotations(), false);

        assert!(trip.triplets.len() < 64);
        assert_eq!(trip.weights.iter().sum::<usize>(), 64);
        for t in &trip.triplets {
            assert!(conservation_holds(&mesh, t));
        }
    }

    #[test]
    fn at_q_weights_cover_the_mesh() {
        let mesh = Mesh::new([4, 4, 4], [false; 3]).unwrap();
        let q = mesh.index_of(&spgr_array_types::V3([1, 0, 0]));
        let at_q = ir_triplets_at_q(&mesh, q, &cubic_rotations(), false);

        assert_eq!(at_q.weights.iter().sum::<usize>(), 64);
        assert_eq!(
            at_q.weights.iter().filter(|&&w| w > 0).count(),
            at_q.num_ir,
        );
        // conservation for every enumerated pair
        for q2 in 0..64 {
            assert!(conservation_holds(&mesh, &[q, q2, at_q.third[q2]]));
        }
    }

    #[test]
    fn gamma_little_group_is_everything() {
        let mesh = Mesh::new([3, 3, 3], [false; 3]).unwrap();
        let at_gamma = ir_triplets_at_q(&mesh, 0, &cubic_rotations(), false);
        let unrestricted = ir_mesh(&mesh, &cubic_rotations(), false);
        assert_eq!(at_gamma.num_ir, unrestricted.num_ir());
    }

    #[test]
    fn extraction_matches_direct_computation() {
        let mesh = Mesh::new([4, 4, 4], [false; 3]).unwrap();
        let rots = cubic_rotations();
        let full = ir_triplets(&mesh, &rots, false);

        // (0, 1, 0) is in the orbit of the representative (1, 0, 0)
        let fixed = mesh.index_of(&spgr_array_types::V3([0, 1, 0]));
        let extracted = extract_triplets_at_q(&full, fixed, &rots, false).unwrap();
        let direct = ir_triplets_at_q(&mesh, fixed, &rots, false);

        // same number of representatives, same total weight, and every
        // extracted triplet conserves momentum with the right first leg
        assert_eq!(extracted.triplets.len(), direct.num_ir);
        assert_eq!(
            extracted.weights.iter().sum::<usize>(),
            direct.weights.iter().sum::<usize>(),
        );
        for t in &extracted.triplets {
            assert_eq!(t[0], fixed);
            assert!(conservation_holds(&mesh, t));
        }
    }
}
