//! Symmetry reduction of uniform reciprocal-space meshes.
//!
//! This crate is an independent consumer of bare rotation sets: it knows
//! nothing about atoms or translations, and can run in isolation given any
//! group of integer rotations acting on reciprocal fractional coordinates.
//! (for rotations found in real space, pass the transposes)

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[macro_use] extern crate itertools;

macro_rules! throw {
    ($e:expr) => {
        return Err(std::convert::Into::into($e));
    }
}

mod mesh;
mod triplets;

pub use crate::mesh::{
    ir_kpoints, ir_mesh, ir_mesh_stabilized, IrSet, Mesh, MeshError,
};
pub use crate::triplets::{
    extract_triplets_at_q, ir_triplets, ir_triplets_at_q,
    ExtractError, Triplets, TripletsAtQ,
};
