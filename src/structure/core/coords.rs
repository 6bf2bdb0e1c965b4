use crate::Lattice;
use crate::oper::perm::{Perm, Permute};

use spgr_array_types::V3;

/// Wrapper type for coordinates used as input to some APIs.
///
/// This allows a function to support either cartesian coordinates,
/// or fractional coordinates with respect to some lattice.
#[derive(Debug, Clone, PartialEq)]
pub enum Coords {
    Carts(Vec<V3>),
    Fracs(Vec<V3>),
}

impl Coords {
    pub fn len(&self) -> usize
    { match *self {
        Coords::Carts(ref c) => c.len(),
        Coords::Fracs(ref c) => c.len(),
    }}

    pub fn is_empty(&self) -> bool
    { self.len() == 0 }
}

// conversions
impl Coords {
    pub fn into_carts(self, lattice: &Lattice) -> Vec<V3>
    { match self {
        Coords::Carts(c) => c,
        Coords::Fracs(c) => c.into_iter().map(|v| v * lattice).collect(),
    }}

    pub fn into_fracs(self, lattice: &Lattice) -> Vec<V3>
    { match self {
        Coords::Carts(c) => c.into_iter().map(|v| v / lattice).collect(),
        Coords::Fracs(c) => c,
    }}

    pub fn to_carts(&self, lattice: &Lattice) -> Vec<V3>
    { match *self {
        Coords::Carts(ref c) => c.clone(),
        Coords::Fracs(ref c) => c.iter().map(|v| v * lattice).collect(),
    }}

    pub fn to_fracs(&self, lattice: &Lattice) -> Vec<V3>
    { match *self {
        Coords::Carts(ref c) => c.iter().map(|v| v / lattice).collect(),
        Coords::Fracs(ref c) => c.clone(),
    }}
}

impl Permute for Coords {
    fn permuted_by(self, perm: &Perm) -> Coords
    { match self {
        Coords::Carts(c) => Coords::Carts(c.permuted_by(perm)),
        Coords::Fracs(c) => Coords::Fracs(c.permuted_by(perm)),
    }}
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    // make sure the library correctly chooses whether to use the
    // regular matrix or the inverse matrix
    #[test]
    fn div_vs_mul() {
        let x = |mag| vec![V3([mag, 0.0, 0.0])];
        let lattice = Lattice::cubic(2.0);

        assert_eq!(x(1.0), Coords::Fracs(x(1.0)).to_fracs(&lattice));
        assert_eq!(x(2.0), Coords::Fracs(x(1.0)).to_carts(&lattice));
        assert_eq!(x(0.5), Coords::Carts(x(1.0)).to_fracs(&lattice));
        assert_eq!(x(1.0), Coords::Carts(x(1.0)).into_carts(&lattice));
    }
}
