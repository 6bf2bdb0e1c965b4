use crate::{Coords, Lattice};
use crate::oper::perm::{Perm, Permute};
use crate::util;

use spgr_array_types::V3;

/// A periodic atomic structure: lattice, positions, and species tags.
///
/// Species tags are arbitrary integers; equal tag means same species for all
/// matching purposes.  A `Cell` is never mutated by the algorithms in this
/// crate; they return fresh cells instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) lattice: Lattice,
    pub(crate) coords: Coords,
    pub(crate) types: Vec<i32>,
}

impl Cell {
    /// # Panics
    /// Panics if the position count does not match the tag count.
    /// (a singular lattice is ruled out by `Lattice` construction)
    pub fn new(lattice: Lattice, coords: Coords, types: Vec<i32>) -> Self {
        assert_eq!(
            coords.len(), types.len(),
            "every position needs a species tag",
        );
        Cell { lattice, coords, types }
    }

    /// A cell with no atoms; the failure signal of cell refinement.
    pub fn empty(lattice: Lattice) -> Self
    { Cell { lattice, coords: Coords::Fracs(vec![]), types: vec![] } }

    pub fn num_atoms(&self) -> usize { self.coords.len() }
    pub fn lattice(&self) -> &Lattice { &self.lattice }
    pub fn types(&self) -> &[i32] { &self.types }

    pub fn to_carts(&self) -> Vec<V3> { self.coords.to_carts(&self.lattice) }
    pub fn to_fracs(&self) -> Vec<V3> { self.coords.to_fracs(&self.lattice) }

    /// Fractional positions reduced into `[0.0, 1.0)`.
    pub fn reduced_fracs(&self) -> Vec<V3>
    { self.to_fracs().into_iter().map(util::wrap01_v3).collect() }
}

impl Permute for Cell {
    fn permuted_by(self, perm: &Perm) -> Self {
        let Cell { lattice, coords, types } = self;
        let coords = coords.permuted_by(perm);
        let types = types.permuted_by(perm);
        Cell { lattice, coords, types }
    }
}
