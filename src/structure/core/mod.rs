pub(crate) mod cell;
pub(crate) mod coords;
pub(crate) mod lattice;
