//! Symmetry analysis of periodic atomic structures.
//!
//! Given a lattice, fractional positions, and species tags, this crate finds
//! the space-group operations of the structure under a caller-supplied
//! tolerance, reduces the structure to a primitive cell, classifies the space
//! group against a reference table, idealizes the cell, and assigns Wyckoff
//! orbits.  Reciprocal-space mesh reduction lives in the sibling
//! `spgr-kpoints` crate, which consumes only the rotation parts found here.

#[macro_use] extern crate log;
#[macro_use] extern crate itertools;
#[macro_use] extern crate failure;
#[macro_use] extern crate lazy_static;
#[cfg(test)] #[macro_use] extern crate spgr_assert_close;
#[cfg(test)] extern crate rand;

macro_rules! throw {
    ($e:expr) => {
        return Err(std::convert::Into::into($e));
    }
}

#[derive(Debug, Fail)]
#[fail(display = "not nearly an integer: {}", value)]
pub struct IntPrecisionError {
    backtrace: failure::Backtrace,
    value: f64,
}

#[derive(Debug, Fail)]
#[fail(display = "lattice matrix is singular")]
pub struct SingularLatticeError {
    backtrace: failure::Backtrace,
}

mod core;
mod algo;
mod oper;
mod util;
mod spacegroup;
mod dataset;

//---------------------------
// public reexports; API

pub use crate::core::lattice::Lattice;
pub use crate::core::coords::Coords;
pub use crate::core::cell::Cell;

pub use crate::oper::perm::{InvalidPermutationError, Perm, Permute};
pub use crate::oper::symmops::{FracOp, FracRot, FracTrans, SymOp, SymmetryGroup};

pub use crate::algo::find_perm;
pub use crate::algo::primitive::{primitive_cell, Primitive, PrimitiveError};
pub use crate::algo::refine::{refine_cell, Refined};
pub use crate::algo::reduction::{self, LatticeReduction};
pub use crate::algo::symmetry::{find_symmetry, pure_translations};
pub use crate::algo::wyckoff::{self, WyckoffAssignment};

pub use crate::spacegroup::{classify, classify_with_primitive, Centering, SpacegroupInfo};
pub use crate::spacegroup::db::{self, CandidateOps, OracleMatch, SpacegroupOracle, WyckoffRow};
pub use crate::spacegroup::pointgroup;

pub use crate::dataset::{dataset, Dataset};

pub use crate::algo::find_perm::dumb_symmetry_test;
