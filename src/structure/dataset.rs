//! The rich, self-contained result aggregate.

use crate::{Cell, SpacegroupInfo, SymOp};
use crate::algo::{primitive, symmetry, wyckoff};
use crate::spacegroup::{self, db::SpacegroupOracle};

/// Everything the analysis learned about one structure.
///
/// A `Dataset` owns all of its data; no field refers back into any
/// intermediate cell or symmetry group, so intermediates are free to go
/// away the moment the dataset exists.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Classification result; `spacegroup.number == 0` when the structure
    /// could not be classified (the remaining fields still describe what
    /// could be derived without a space-group type).
    pub spacegroup: SpacegroupInfo,
    /// Wyckoff letter index per *original* atom (-1 where unresolved).
    pub wyckoffs: Vec<i32>,
    /// Lowest-indexed equivalent atom per original atom, in original
    /// indexing.
    pub equivalent_atoms: Vec<usize>,
    /// The full operation list, expressed in the original cell's basis.
    pub operations: Vec<SymOp>,
    pub num_atoms: usize,
}

/// Run the whole pipeline on one structure.
///
/// Mirrors the flow of the public "get dataset" entry point: pure
/// translations feed the primitive reducer, the primitive cell feeds the
/// classifier, and the primitive-indexed Wyckoff data is lifted back onto
/// the original atoms through the reducer's mapping.
pub fn dataset(cell: &Cell, tol: f64, oracle: &dyn SpacegroupOracle) -> Dataset {
    let n = cell.num_atoms();
    let group = symmetry::find_symmetry(cell, tol);
    let pure = group.pure_translations();

    let prim = match primitive::primitive_cell(cell, &pure, tol) {
        Ok(prim) => prim,
        Err(e) => {
            warn!("dataset degraded; primitive reduction failed: {}", e);
            return Dataset {
                spacegroup: SpacegroupInfo::unclassified(),
                wyckoffs: vec![-1; n],
                equivalent_atoms: (0..n).collect(),
                operations: group.ops().to_vec(),
                num_atoms: n,
            };
        }
    };

    let (info, assignment) = match spacegroup::classify_full(&prim.cell, cell.lattice(), tol, oracle) {
        Some(cls) => {
            let assignment = wyckoff::assign(
                &prim.cell,
                &cls.prim_group,
                cls.info.number,
                cls.setting.centering.multiplicity(),
                oracle,
                tol,
            );
            (cls.info, assignment)
        }
        None => (
            SpacegroupInfo::unclassified(),
            wyckoff::WyckoffAssignment::unresolved(prim.cell.num_atoms()),
        ),
    };

    // lift primitive-indexed results back onto the original atoms
    let wyckoffs: Vec<i32> = prim.to_primitive.iter()
        .map(|&p| assignment.letters[p])
        .collect();

    // for each primitive orbit representative, the lowest original index
    // that maps onto it
    let original_of_prim: Vec<usize> = (0..prim.cell.num_atoms())
        .map(|p| {
            let target = assignment.equivalent[p];
            prim.to_primitive.iter()
                .position(|&q| q == target)
                .expect("bug! (primitive atom with no original image)")
        })
        .collect();
    let equivalent_atoms: Vec<usize> = prim.to_primitive.iter()
        .map(|&p| original_of_prim[p])
        .collect();

    Dataset {
        spacegroup: info,
        wyckoffs,
        equivalent_atoms,
        operations: group.ops().to_vec(),
        num_atoms: n,
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::{Cell, Coords, Lattice};
    use crate::spacegroup::db;
    use super::*;
    use spgr_array_types::Envee;

    fn cell(lattice: Lattice, fracs: Vec<[f64; 3]>, types: Vec<i32>) -> Cell {
        Cell::new(lattice, Coords::Fracs(fracs.envee()), types)
    }

    #[test]
    fn simple_cubic_dataset() {
        let cell = cell(Lattice::cubic(4.0), vec![[0.0; 3]], vec![1]);
        let data = dataset(&cell, 1e-5, db::reference());
        assert_eq!(data.spacegroup.number, 221);
        assert_eq!(data.num_atoms, 1);
        assert_eq!(data.operations.len(), 48);
        assert_eq!(data.wyckoffs, vec![0]);
        assert_eq!(data.equivalent_atoms, vec![0]);
    }

    #[test]
    fn body_centered_lifting() {
        let cell = cell(
            Lattice::cubic(4.0),
            vec![[0.0; 3], [0.5; 3]],
            vec![1, 1],
        );
        let data = dataset(&cell, 1e-5, db::reference());
        assert_eq!(data.spacegroup.number, 229);
        // both atoms share one orbit whose representative is atom 0
        assert_eq!(data.equivalent_atoms, vec![0, 0]);
        assert_eq!(data.wyckoffs, vec![0, 0]);
        // 48 rotations times 2 centering translations
        assert_eq!(data.operations.len(), 96);
    }

    #[test]
    fn degraded_dataset_still_has_orbits() {
        struct EmptyOracle;
        impl crate::SpacegroupOracle for EmptyOracle {
            fn lookup(&self, _: &crate::CandidateOps<'_>) -> Option<crate::OracleMatch>
            { None }
            fn wyckoff_rows(&self, _: i32) -> &[crate::WyckoffRow]
            { &[] }
        }

        let cell = cell(
            Lattice::cubic(4.0),
            vec![[0.0; 3], [0.5; 3]],
            vec![1, 1],
        );
        let data = dataset(&cell, 1e-5, &EmptyOracle);
        assert_eq!(data.spacegroup.number, 0);
        assert!(!data.spacegroup.is_classified());
        // wyckoffs unresolved, but translation orbits still known
        assert_eq!(data.wyckoffs, vec![-1, -1]);
        assert_eq!(data.equivalent_atoms, vec![0, 0]);
        assert_eq!(data.operations.len(), 96);
    }
}
