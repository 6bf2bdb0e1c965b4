//! Primitive cell extraction from the pure-translation subgroup.

use crate::{Cell, Coords, Lattice};
use crate::algo::reduction;
use crate::util;

use spgr_array_types::V3;

use failure::Backtrace;

#[derive(Debug, Fail)]
pub enum PrimitiveError {
    /// The translation set did not evenly partition the atoms.  This is a
    /// tolerance outcome (inconsistent input), not a bug.
    #[fail(display = "pure translations do not evenly partition the atoms")]
    InconsistentOrbits(Backtrace),
    /// The constructed basis does not generate the translation sublattice.
    #[fail(display = "failed to span the translation sublattice")]
    BasisSearchFailed(Backtrace),
}

/// A primitive cell together with the atom mapping that produced it.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub cell: Cell,
    /// For each atom of the input cell, the index of its representative
    /// in the primitive cell.
    pub to_primitive: Vec<usize>,
}

/// Reduce a cell using its pure translations (as returned by
/// [`crate::pure_translations`]; the zero vector included).
///
/// The new cell's volume is the input's divided by the translation count,
/// and the input is never mutated.  With a trivial translation subgroup the
/// input cell is returned unchanged alongside an identity mapping.
pub fn primitive_cell(cell: &Cell, pure_trans: &[V3], tol: f64) -> Result<Primitive, PrimitiveError>
{Ok({
    let multiplicity = pure_trans.len();
    if multiplicity <= 1 {
        return Ok(Primitive {
            cell: cell.clone(),
            to_primitive: (0..cell.num_atoms()).collect(),
        });
    }

    let lattice = primitive_lattice(cell.lattice(), pure_trans, tol)?;

    // sanity: the volume must shrink by exactly the multiplicity
    let ratio = cell.lattice().volume() / lattice.volume();
    if (ratio - multiplicity as f64).abs() > 0.25 {
        throw!(PrimitiveError::BasisSearchFailed(Backtrace::new()));
    }

    // partition the atoms into orbits under the pure translations
    let carts = cell.to_carts();
    let fracs: Vec<V3> = carts.iter().map(|&c| util::wrap01_v3(c / &lattice)).collect();
    let types = cell.types();

    let mut rep_atoms: Vec<usize> = vec![];
    let mut to_primitive = Vec::with_capacity(fracs.len());
    for i in 0..fracs.len() {
        let found = rep_atoms.iter().position(|&r| {
            types[r] == types[i]
                && util::nearest_distance(&lattice, &fracs[r], &fracs[i]) < tol
        });
        match found {
            Some(slot) => to_primitive.push(slot),
            None => {
                rep_atoms.push(i);
                to_primitive.push(rep_atoms.len() - 1);
            }
        }
    }

    if rep_atoms.len() * multiplicity != cell.num_atoms() {
        throw!(PrimitiveError::InconsistentOrbits(Backtrace::new()));
    }

    let new_types = rep_atoms.iter().map(|&i| types[i]).collect();
    let new_fracs = rep_atoms.iter().map(|&i| fracs[i]).collect();
    Primitive {
        cell: Cell::new(lattice, Coords::Fracs(new_fracs), new_types),
        to_primitive,
    }
})}

// Build a basis of the sublattice generated by the cell vectors plus the
// pure translations, by iterative replacement: while some generator has a
// fractional coordinate in the current basis, swap it in.  Each swap
// shrinks the cell volume, so this terminates; the result is then
// Minkowski-style reduced for a well-conditioned basis.
fn primitive_lattice(
    original: &Lattice,
    pure_trans: &[V3],
    tol: f64,
) -> Result<Lattice, PrimitiveError>
{
    // generators, as cartesian vectors: the pure translations and the
    // original cell vectors (the latter must also end up with integer
    // coordinates, so they are checked on the same footing)
    let generators: Vec<V3> = {
        pure_trans.iter().map(|&t| t * original)
            .chain(original.vectors().iter().cloned())
            .collect()
    };

    let mut lattice = original.clone();
    // each pass either returns or strictly shrinks the volume; the volume
    // is bounded below by (original volume / translation count), so this
    // cannot run forever on meaningful input
    for _ in 0..1000 {
        let mut replaced = false;
        for &g in &generators {
            let coeffs = g / &lattice;
            let fractional = coeffs.map(|x| x - x.floor());
            let axis = (0..3).find(|&k| {
                fractional[k].min(1.0 - fractional[k]) > tol
            });

            if let Some(axis) = axis {
                let mut vectors = *lattice.vectors();
                vectors[axis] = fractional * &lattice;
                lattice = Lattice::from_vectors(&vectors);
                replaced = true;
                break;
            }
        }
        if !replaced {
            let reduced = reduction::reduce(&lattice).reduced().clone();
            return Ok(reduced);
        }
    }
    Err(PrimitiveError::BasisSearchFailed(Backtrace::new()))
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::algo::symmetry;
    use super::*;
    use spgr_array_types::Envee;

    fn cell(lattice: Lattice, fracs: Vec<[f64; 3]>, types: Vec<i32>) -> Cell {
        Cell::new(lattice, Coords::Fracs(fracs.envee()), types)
    }

    #[test]
    fn already_primitive() {
        let cell = cell(Lattice::cubic(4.0), vec![[0.0, 0.0, 0.0]], vec![1]);
        let pure = symmetry::pure_translations(&cell, 1e-5);
        let prim = primitive_cell(&cell, &pure, 1e-5).unwrap();
        assert_eq!(prim.cell.num_atoms(), 1);
        assert_eq!(prim.to_primitive, vec![0]);
        assert_eq!(prim.cell, cell);
    }

    #[test]
    fn body_centered_halves() {
        let cell = cell(
            Lattice::cubic(4.0),
            vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
            vec![1, 1],
        );
        let pure = symmetry::pure_translations(&cell, 1e-5);
        assert_eq!(pure.len(), 2);

        let prim = primitive_cell(&cell, &pure, 1e-5).unwrap();
        assert_eq!(prim.cell.num_atoms(), 1);
        assert_eq!(prim.to_primitive, vec![0, 0]);
        assert!((prim.cell.lattice().volume() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn face_centered_quarters() {
        let cell = cell(
            Lattice::cubic(4.0),
            vec![
                [0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0],
            ],
            vec![7, 7, 7, 7],
        );
        let pure = symmetry::pure_translations(&cell, 1e-5);
        assert_eq!(pure.len(), 4);

        let prim = primitive_cell(&cell, &pure, 1e-5).unwrap();
        assert_eq!(prim.cell.num_atoms(), 1);
        assert!((prim.cell.lattice().volume() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn supercell_with_basis() {
        // a 2x1x1 supercell of a two-species cell
        let cell = cell(
            Lattice::orthorhombic(8.0, 4.0, 4.0),
            vec![
                [0.0, 0.0, 0.0], [0.5, 0.0, 0.0],
                [0.125, 0.5, 0.5], [0.625, 0.5, 0.5],
            ],
            vec![1, 1, 2, 2],
        );
        let pure = symmetry::pure_translations(&cell, 1e-5);
        assert_eq!(pure.len(), 2);

        let prim = primitive_cell(&cell, &pure, 1e-5).unwrap();
        assert_eq!(prim.cell.num_atoms(), 2);
        assert_eq!(prim.cell.types(), &[1, 2]);
        assert!((prim.cell.lattice().volume() - 64.0).abs() < 1e-9);
        // both copies of each atom map to the same representative
        assert_eq!(prim.to_primitive[0], prim.to_primitive[1]);
        assert_eq!(prim.to_primitive[2], prim.to_primitive[3]);
    }
}
