//! Space-group classification.
//!
//! The pipeline: find the primitive cell's operations, fingerprint the
//! point group, recover a conventional setting by metric search, shift the
//! origin onto the twelfths grid, and hand the prepared operation set to
//! the reference oracle for identification.

pub mod db;
pub mod pointgroup;
pub(crate) mod standardize;

pub use self::standardize::Centering;

use crate::{Cell, Lattice, SymmetryGroup};
use crate::algo::{primitive, symmetry};
use self::db::{CandidateOps, SpacegroupOracle};
use self::pointgroup::RotationHistogram;
use self::standardize::ConventionalSetting;

use spgr_array_types::{mat, M33, V3};

/// Result of space-group classification.
///
/// `number == 0` means classification failed; every other field is
/// meaningless in that case and callers must check [`Self::is_classified`]
/// first.  Failure is an expected outcome for structures with no detectable
/// consistent symmetry, not an error.
#[derive(Debug, Clone)]
pub struct SpacegroupInfo {
    /// 1..=230, or 0 when unclassified.
    pub number: i32,
    /// International (Hermann-Mauguin) short symbol.
    pub international: String,
    pub hall_symbol: String,
    pub schoenflies: String,
    /// Transform from the *input* basis to the standard one, computed as
    /// (input lattice)^-1 (standard bravais lattice).
    pub transformation_matrix: M33,
    /// Origin shift in conventional fractional coordinates.
    pub origin_shift: V3,
    /// The idealized conventional cell's lattice.
    pub bravais_lattice: Lattice,
}

impl SpacegroupInfo {
    pub fn unclassified() -> SpacegroupInfo {
        SpacegroupInfo {
            number: 0,
            international: String::new(),
            hall_symbol: String::new(),
            schoenflies: String::new(),
            transformation_matrix: mat::eye(),
            origin_shift: V3([0.0; 3]),
            bravais_lattice: Lattice::eye(),
        }
    }

    pub fn is_classified(&self) -> bool
    { self.number > 0 }
}

// Everything the classifier learned, for internal consumers (refinement,
// Wyckoff assignment) that need more than the public summary.
pub(crate) struct Classification {
    pub info: SpacegroupInfo,
    pub prim_group: SymmetryGroup,
    pub setting: ConventionalSetting,
    /// Operations in the conventional basis: origin-shifted and expanded
    /// by the centering translations.
    pub conv_ops: Vec<crate::SymOp>,
    pub ideal_lattice: Lattice,
    pub origin_shift: V3,
}

/// Classify from scratch ("quick" mode): derives the primitive cell
/// internally and reports relative to the input lattice.
pub fn classify(cell: &Cell, tol: f64, oracle: &dyn SpacegroupOracle) -> SpacegroupInfo {
    let pure = symmetry::pure_translations(cell, tol);
    let prim = match primitive::primitive_cell(cell, &pure, tol) {
        Ok(prim) => prim,
        Err(e) => {
            warn!("primitive reduction failed; structure unclassifiable: {}", e);
            return SpacegroupInfo::unclassified();
        }
    };
    classify_full(&prim.cell, cell.lattice(), tol, oracle)
        .map(|cls| cls.info)
        .unwrap_or_else(SpacegroupInfo::unclassified)
}

/// Classify a cell the caller has already reduced to primitive, avoiding
/// the redundant reduction.
pub fn classify_with_primitive(prim: &Cell, tol: f64, oracle: &dyn SpacegroupOracle) -> SpacegroupInfo {
    classify_full(prim, prim.lattice(), tol, oracle)
        .map(|cls| cls.info)
        .unwrap_or_else(SpacegroupInfo::unclassified)
}

pub(crate) fn classify_full(
    prim: &Cell,
    original_lattice: &Lattice,
    tol: f64,
    oracle: &dyn SpacegroupOracle,
) -> Option<Classification>
{
    let prim_group = symmetry::find_symmetry(prim, tol);

    let histogram = match RotationHistogram::new(&prim_group.distinct_rotations()) {
        Some(h) => h,
        None => {
            warn!("non-crystallographic rotation in the operation set");
            return None;
        }
    };
    let system = pointgroup::crystal_system(&histogram);
    debug!("point group order {}, system {:?}", histogram.order(), system);

    let setting = match standardize::conventional_setting(prim.lattice(), system, tol) {
        Some(s) => s,
        None => {
            warn!("no conventional basis satisfies the {:?} metric", system);
            return None;
        }
    };

    // primitive-basis operators, re-expressed on the conventional cell
    let conv_base = match standardize::ops_in_basis(
        prim_group.ops(), prim.lattice(), &setting.lattice, 1e-3,
    ) {
        Ok(ops) => ops,
        Err(_) => {
            warn!("operators do not stay integral in the conventional basis");
            return None;
        }
    };
    let expanded = standardize::expand_by_translations(&conv_base, &setting.centering_translations);
    let shift = standardize::origin_shift(&expanded, &setting.centering_translations, tol);
    let conv_ops = standardize::shift_ops(&expanded, &shift);

    let matched = oracle.lookup(&CandidateOps {
        ops: &conv_ops,
        centering: setting.centering,
        system,
        centering_translations: &setting.centering_translations,
        tol,
    });
    let matched = match matched {
        Some(m) => m,
        None => {
            debug!("operation set matches no reference setting");
            return None;
        }
    };

    let ideal_lattice = standardize::idealize(&setting);
    let info = SpacegroupInfo {
        number: matched.number,
        international: matched.international.to_string(),
        hall_symbol: matched.hall.to_string(),
        schoenflies: matched.schoenflies.to_string(),
        transformation_matrix: original_lattice.inverse_matrix() * ideal_lattice.matrix(),
        origin_shift: shift,
        bravais_lattice: ideal_lattice.clone(),
    };
    Some(Classification {
        info,
        prim_group,
        setting,
        conv_ops,
        ideal_lattice,
        origin_shift: shift,
    })
}
