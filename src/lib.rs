//! Public entry points for crystal symmetry analysis.
//!
//! This crate is a thin marshalling layer: it copies caller-supplied raw
//! arrays into the engine's types, forwards to `spgr-structure` and
//! `spgr-kpoints`, and copies results back out.  All of the actual
//! algorithms live in those member crates, which are also re-exported here
//! for callers that prefer richer APIs (injected oracles, owned cells).
//!
//! Entry points with fixed-capacity output slices follow a two-phase
//! contract: query an upper bound first ([`get_max_multiplicity`] bounds
//! the operation count by 48 times the translation-subgroup size), then
//! call with adequate capacity.  On a capacity failure nothing is written.

#[macro_use] extern crate failure;

use spgr_array_types::{mat, Envee, M33, Unvee, V3};
use spgr_kpoints as kpoints;
use spgr_structure as structure;

pub use spgr_structure::{
    classify, classify_with_primitive, dataset, db, dumb_symmetry_test,
    find_symmetry, pointgroup, primitive_cell, pure_translations,
    refine_cell as refine_cell_with_oracle,
    Cell, Centering, Coords, Dataset, Lattice, Primitive, Refined,
    SingularLatticeError, SpacegroupInfo, SpacegroupOracle, SymOp,
    SymmetryGroup,
};
pub use spgr_kpoints::{ExtractError, IrSet, Mesh, MeshError, Triplets, TripletsAtQ};

/// Errors of the marshalling layer.
#[derive(Debug, Fail)]
pub enum SpgError {
    #[fail(display = "{}", _0)]
    SingularLattice(#[cause] structure::SingularLatticeError),
    /// A fixed-capacity output was too small; nothing was written.
    #[fail(display = "output capacity {} is less than the required {}", capacity, required)]
    CapacityExceeded { required: usize, capacity: usize },
    #[fail(display = "{}", _0)]
    BadMesh(#[cause] kpoints::MeshError),
    #[fail(display = "{}", _0)]
    Extract(#[cause] kpoints::ExtractError),
}

impl From<structure::SingularLatticeError> for SpgError {
    fn from(e: structure::SingularLatticeError) -> SpgError
    { SpgError::SingularLattice(e) }
}

impl From<kpoints::MeshError> for SpgError {
    fn from(e: kpoints::MeshError) -> SpgError
    { SpgError::BadMesh(e) }
}

impl From<kpoints::ExtractError> for SpgError {
    fn from(e: kpoints::ExtractError) -> SpgError
    { SpgError::Extract(e) }
}

/// Copy raw input into an owned [`Cell`].
///
/// # Panics
/// Panics if `positions` and `types` disagree in length.
pub fn build_cell(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
) -> Result<Cell, SingularLatticeError>
{
    let lattice = Lattice::checked(&mat::from_array(*lattice))?;
    let coords = Coords::Fracs(positions.to_vec().envee());
    Ok(Cell::new(lattice, coords, types.to_vec()))
}

/// The rich aggregate result: classification, Wyckoff letters, equivalent
/// atoms, and the full operation list, all in one owned value.
pub fn get_dataset(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<Dataset, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    Ok(dataset(&cell, symprec, db::reference()))
}

/// Find the symmetry operations and write them into caller-owned slices.
///
/// Returns the operation count.  If either output slice is too small the
/// call fails with [`SpgError::CapacityExceeded`] and writes nothing.
pub fn get_symmetry(
    rotations: &mut [[[i32; 3]; 3]],
    translations: &mut [[f64; 3]],
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<usize, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let group = find_symmetry(&cell, symprec);

    let capacity = rotations.len().min(translations.len());
    if group.len() > capacity {
        return Err(SpgError::CapacityExceeded { required: group.len(), capacity });
    }
    for (i, op) in group.ops().iter().enumerate() {
        rotations[i] = op.rotation().unvee();
        translations[i] = op.translation().unvee();
    }
    Ok(group.len())
}

/// The number of symmetry operations of the input cell.
pub fn get_multiplicity(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<usize, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    Ok(find_symmetry(&cell, symprec).len())
}

/// Upper bound on the operation count: 48 (the largest point group)
/// times the pure-translation count.  Use before [`get_symmetry`] to size
/// the output slices.
pub fn get_max_multiplicity(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<usize, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    Ok(pure_translations(&cell, symprec).len() * 48)
}

/// Reduce to a primitive cell.  `Ok(None)` means the input already was
/// primitive (no reduction happened).
pub fn find_primitive(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<Option<Cell>, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let pure = pure_translations(&cell, symprec);
    if pure.len() <= 1 {
        return Ok(None);
    }
    match primitive_cell(&cell, &pure, symprec) {
        Ok(prim) => Ok(Some(prim.cell)),
        // inconsistency under this tolerance; mirrors the "nothing found"
        // outcome rather than an error
        Err(_) => Ok(None),
    }
}

/// Space-group number and international short symbol, or `None` when the
/// structure cannot be classified.
pub fn get_international(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<Option<(i32, String)>, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let info = classify(&cell, symprec, db::reference());
    Ok(match info.is_classified() {
        true => Some((info.number, info.international)),
        false => None,
    })
}

/// Space-group number and Schoenflies symbol, or `None` when the
/// structure cannot be classified.
pub fn get_schoenflies(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<Option<(i32, String)>, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let info = classify(&cell, symprec, db::reference());
    Ok(match info.is_classified() {
        true => Some((info.number, info.schoenflies)),
        false => None,
    })
}

/// The idealized conventional cell and its exact operator set.  Check
/// [`Refined::is_failure`]: an unclassifiable input refines to an empty
/// cell.
pub fn refine_cell(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<Refined, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    Ok(refine_cell_with_oracle(&cell, symprec, db::reference()))
}

/// A Buerger-reduced (shortest-vector) version of the given lattice.
pub fn get_smallest_lattice(
    lattice: &[[f64; 3]; 3],
) -> Result<[[f64; 3]; 3], SpgError>
{
    let lattice = Lattice::checked(&mat::from_array(*lattice))?;
    Ok(structure::reduction::reduce(&lattice).reduced().matrix().unvee())
}

// rotations acting on reciprocal fractional coordinates are the
// transposes of the real-space fractional rotations
fn reciprocal_rotations(group: &SymmetryGroup) -> Vec<M33<i32>> {
    group.distinct_rotations().iter().map(|r| r.t()).collect()
}

fn raw_rotations(rotations: &[[[i32; 3]; 3]]) -> Vec<M33<i32>> {
    rotations.iter().map(|&r| mat::from_array(r).t()).collect()
}

/// Reduce a uniform reciprocal mesh under the symmetry of a structure.
///
/// `map` and `grid_address` must hold one entry per grid point; the
/// return value is the irreducible point count.
pub fn get_ir_reciprocal_mesh(
    map: &mut [usize],
    grid_address: &mut [[i32; 3]],
    mesh_dims: [i32; 3],
    is_shift: [bool; 3],
    time_reversal: bool,
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    symprec: f64,
) -> Result<usize, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let group = find_symmetry(&cell, symprec);
    let mesh = Mesh::new(mesh_dims, is_shift)?;

    let n = mesh.num_points();
    let capacity = map.len().min(grid_address.len());
    if n > capacity {
        return Err(SpgError::CapacityExceeded { required: n, capacity });
    }

    let ir = kpoints::ir_mesh(&mesh, &reciprocal_rotations(&group), time_reversal);
    for i in 0..n {
        map[i] = ir.map[i];
        grid_address[i] = mesh.address(i).unvee();
    }
    Ok(ir.num_ir())
}

/// Mesh reduction under an externally supplied rotation set, restricted to
/// the little group of the given q-points.
///
/// `rotations` are real-space fractional rotations, as found by
/// [`get_symmetry`]; the transposition onto reciprocal space happens here.
pub fn get_stabilized_reciprocal_mesh(
    map: &mut [usize],
    mesh_dims: [i32; 3],
    is_shift: [bool; 3],
    time_reversal: bool,
    rotations: &[[[i32; 3]; 3]],
    qpoints: &[[f64; 3]],
    symprec: f64,
) -> Result<usize, SpgError>
{
    let mesh = Mesh::new(mesh_dims, is_shift)?;
    let n = mesh.num_points();
    if n > map.len() {
        return Err(SpgError::CapacityExceeded { required: n, capacity: map.len() });
    }

    let qpoints: Vec<V3> = qpoints.to_vec().envee();
    let ir = kpoints::ir_mesh_stabilized(
        &mesh, &raw_rotations(rotations), time_reversal, &qpoints, symprec,
    );
    map[..n].copy_from_slice(&ir.map);
    Ok(ir.num_ir())
}

/// Reduce an explicit k-point list under the symmetry of a structure.
pub fn get_ir_kpoints(
    map: &mut [usize],
    kpoints_list: &[[f64; 3]],
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    types: &[i32],
    time_reversal: bool,
    symprec: f64,
) -> Result<usize, SpgError>
{
    let cell = build_cell(lattice, positions, types)?;
    let group = find_symmetry(&cell, symprec);

    if kpoints_list.len() > map.len() {
        return Err(SpgError::CapacityExceeded {
            required: kpoints_list.len(),
            capacity: map.len(),
        });
    }

    let kpoints_list: Vec<V3> = kpoints_list.to_vec().envee();
    let ir = kpoints::ir_kpoints(
        &kpoints_list, &reciprocal_rotations(&group), time_reversal, symprec,
    );
    map[..ir.map.len()].copy_from_slice(&ir.map);
    Ok(ir.num_ir())
}

/// Irreducible momentum-conserving triplets over a whole mesh.
pub fn get_triplets_reciprocal_mesh(
    mesh_dims: [i32; 3],
    time_reversal: bool,
    rotations: &[[[i32; 3]; 3]],
) -> Result<Triplets, SpgError>
{
    let mesh = Mesh::new(mesh_dims, [false; 3])?;
    Ok(kpoints::ir_triplets(&mesh, &raw_rotations(rotations), time_reversal))
}

/// Irreducible triplets with the first leg fixed to one grid point.
pub fn get_triplets_reciprocal_mesh_at_q(
    fixed_grid_point: usize,
    mesh_dims: [i32; 3],
    time_reversal: bool,
    rotations: &[[[i32; 3]; 3]],
) -> Result<TripletsAtQ, SpgError>
{
    let mesh = Mesh::new(mesh_dims, [false; 3])?;
    Ok(kpoints::ir_triplets_at_q(
        &mesh, fixed_grid_point, &raw_rotations(rotations), time_reversal,
    ))
}

/// Relabel a precomputed triplet list onto a symmetry-related fixed grid
/// point, without redoing the search.
pub fn extract_triplets_reciprocal_mesh_at_q(
    full: &Triplets,
    fixed_grid_point: usize,
    time_reversal: bool,
    rotations: &[[[i32; 3]; 3]],
) -> Result<Triplets, SpgError>
{
    Ok(kpoints::extract_triplets_at_q(
        full, fixed_grid_point, &raw_rotations(rotations), time_reversal,
    )?)
}
