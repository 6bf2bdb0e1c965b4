//! Wyckoff letters and equivalent-atom orbits for a primitive cell.

use crate::{Cell, SymmetryGroup};
use crate::algo::find_perm;
use crate::spacegroup::db::SpacegroupOracle;

/// Per-primitive-atom orbit data.
///
/// `letters[i]` is a Wyckoff letter index (0 = 'a') or -1 when the orbit
/// could not be matched against the reference table.  `equivalent[i]` is
/// the lowest-indexed member of atom `i`'s orbit.
#[derive(Debug, Clone)]
pub struct WyckoffAssignment {
    pub letters: Vec<i32>,
    pub equivalent: Vec<usize>,
    /// Order of each atom's site-symmetry subgroup.
    pub site_orders: Vec<usize>,
}

impl WyckoffAssignment {
    /// The all-unresolved assignment, used when classification failed.
    pub fn unresolved(num_atoms: usize) -> WyckoffAssignment {
        WyckoffAssignment {
            letters: vec![-1; num_atoms],
            equivalent: (0..num_atoms).collect(),
            site_orders: vec![0; num_atoms],
        }
    }
}

/// Assign Wyckoff letters to the atoms of a primitive cell.
///
/// The orbit partition comes from the operator permutations; the letter
/// comes from matching (conventional multiplicity, site-symmetry order)
/// against the oracle's rows for the identified space group.  Distinct
/// orbits prefer distinct rows, mirroring how the reference tables list
/// one row per independent site.
pub fn assign(
    prim: &Cell,
    prim_group: &SymmetryGroup,
    number: i32,
    centering_multiplicity: usize,
    oracle: &dyn SpacegroupOracle,
    tol: f64,
) -> WyckoffAssignment
{
    let n = prim.num_atoms();
    let perms = match find_perm::of_spacegroup_for_primitive(prim, prim_group.ops(), tol) {
        Ok(perms) => perms,
        Err(e) => {
            warn!("wyckoff assignment abandoned; operators stopped matching: {}", e);
            return WyckoffAssignment::unresolved(n);
        }
    };

    // orbit representatives: the lowest-indexed image of each atom
    let mut equivalent: Vec<usize> = (0..n).collect();
    for perm in &perms {
        for i in 0..n {
            equivalent[i] = equivalent[i].min(perm.indices()[i]);
        }
    }

    // the site-symmetry subgroup is the set of operations fixing the atom
    let site_orders: Vec<usize> = (0..n)
        .map(|i| perms.iter().filter(|p| p.indices()[i] == i).count())
        .collect();

    let rows = oracle.wyckoff_rows(number);
    let mut letters = vec![-1; n];
    let mut used_rows = vec![false; rows.len()];
    for rep in 0..n {
        if equivalent[rep] != rep {
            continue;
        }
        let orbit_size = (0..n).filter(|&j| equivalent[j] == rep).count();
        let multiplicity = orbit_size * centering_multiplicity;

        let matches = |row: &crate::WyckoffRow| {
            row.multiplicity == multiplicity && row.site_order == site_orders[rep]
        };
        // prefer a row no earlier orbit has claimed
        let row_index = rows.iter().enumerate()
            .position(|(k, row)| !used_rows[k] && matches(row))
            .or_else(|| rows.iter().position(matches));

        if let Some(k) = row_index {
            used_rows[k] = true;
            for j in 0..n {
                if equivalent[j] == rep {
                    letters[j] = rows[k].letter;
                }
            }
        }
    }

    WyckoffAssignment { letters, equivalent, site_orders }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::{Cell, Coords, Lattice, find_symmetry};
    use crate::spacegroup::db;
    use super::*;
    use spgr_array_types::Envee;

    fn assign_for(cell: &Cell, number: i32, centering_multiplicity: usize) -> WyckoffAssignment {
        let group = find_symmetry(cell, 1e-5);
        assign(cell, &group, number, centering_multiplicity, db::reference(), 1e-5)
    }

    #[test]
    fn single_site_gets_letter_a() {
        let cell = Cell::new(
            Lattice::cubic(4.0),
            Coords::Fracs(vec![[0.0; 3]].envee()),
            vec![1],
        );
        let assignment = assign_for(&cell, 221, 1);
        assert_eq!(assignment.letters, vec![0]);
        assert_eq!(assignment.equivalent, vec![0]);
        assert_eq!(assignment.site_orders, vec![48]);
    }

    #[test]
    fn distinct_orbits_get_distinct_letters() {
        // CsCl: two species, both at full-symmetry sites
        let cell = Cell::new(
            Lattice::cubic(4.0),
            Coords::Fracs(vec![[0.0; 3], [0.5; 3]].envee()),
            vec![1, 2],
        );
        let assignment = assign_for(&cell, 221, 1);
        assert_eq!(assignment.equivalent, vec![0, 1]);
        // 1a and 1b
        assert_eq!(assignment.letters, vec![0, 1]);
    }

    #[test]
    fn unknown_group_leaves_letters_unresolved() {
        let cell = Cell::new(
            Lattice::cubic(4.0),
            Coords::Fracs(vec![[0.0; 3]].envee()),
            vec![1],
        );
        // number 999 has no rows in the reference table
        let assignment = assign_for(&cell, 999, 1);
        assert_eq!(assignment.letters, vec![-1]);
        // orbits are still resolved
        assert_eq!(assignment.equivalent, vec![0]);
    }
}
