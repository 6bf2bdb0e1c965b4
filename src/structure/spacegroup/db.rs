//! The space-group reference oracle.
//!
//! The engine never hard-codes knowledge of the 230 space-group types;
//! classification consults an injected, read-only oracle, which makes the
//! algorithms testable against synthetic tables and keeps the (versioned)
//! reference data replaceable.
//!
//! The built-in [`reference`] table is a reduced one: it carries the
//! settings that cover the common structure types (simple metals, rock
//! salt, diamond, hcp, ...) and enough of each holohedry to classify
//! highly symmetric cells.  Candidate sets that fall outside it simply
//! classify as "unknown" (number 0), which callers must already handle.

use crate::SymOp;
use crate::spacegroup::pointgroup::{crystal_system, CrystalSystem, RotationHistogram};
use crate::spacegroup::standardize::Centering;

use spgr_array_types::{M33, V3};

/// A candidate operation set, prepared in the conventional basis and
/// origin-shifted, as consumed by the oracle.
#[derive(Debug)]
pub struct CandidateOps<'a> {
    /// Operations in the conventional basis (centering expansion included).
    pub ops: &'a [SymOp],
    pub centering: Centering,
    pub system: CrystalSystem,
    /// Centering translations of the conventional cell, zero included.
    pub centering_translations: &'a [V3],
    /// Position-matching tolerance, for judging translations.
    pub tol: f64,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleMatch {
    /// 1..=230
    pub number: i32,
    pub international: &'static str,
    pub hall: &'static str,
    pub schoenflies: &'static str,
}

/// One Wyckoff position of a reference setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WyckoffRow {
    /// 0 = 'a', 1 = 'b', ...
    pub letter: i32,
    /// Multiplicity in the conventional cell.
    pub multiplicity: usize,
    /// Order of the site-symmetry group.
    pub site_order: usize,
}

/// The read-only space-group lookup collaborator.
///
/// Must be safe for concurrent lookup; implementations carry no mutable
/// state.
pub trait SpacegroupOracle: Sync {
    /// Match a candidate operation set against the reference settings.
    fn lookup(&self, candidate: &CandidateOps<'_>) -> Option<OracleMatch>;

    /// Wyckoff rows of a space-group type known to this oracle
    /// (empty when unknown).
    fn wyckoff_rows(&self, number: i32) -> &[WyckoffRow];
}

//---------------------------------------------------------------------------

struct Entry {
    number: i32,
    international: &'static str,
    hall: &'static str,
    schoenflies: &'static str,
    system: CrystalSystem,
    centering: Centering,
    /// Histogram of the distinct rotation parts, in `RotationKind::index`
    /// order: E, -1, 2, 3, 4, 6, m, -3, -4, -6.
    histogram: [usize; 10],
    /// Whether every operation's translation reduces to a centering
    /// translation in the standard origin.
    symmorphic: bool,
}

use self::CrystalSystem::*;
use self::Centering::*;

static ENTRIES: &[Entry] = &[
    Entry { number:   1, international: "P1",       hall: "P 1",            schoenflies: "C1^1",   system: Triclinic,    centering: P, histogram: [1, 0, 0, 0, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number:   2, international: "P-1",      hall: "-P 1",           schoenflies: "Ci^1",   system: Triclinic,    centering: P, histogram: [1, 1, 0, 0, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number:   3, international: "P2",       hall: "P 2y",           schoenflies: "C2^1",   system: Monoclinic,   centering: P, histogram: [1, 0, 1, 0, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number:   4, international: "P2_1",     hall: "P 2yb",          schoenflies: "C2^2",   system: Monoclinic,   centering: P, histogram: [1, 0, 1, 0, 0, 0, 0, 0, 0, 0], symmorphic: false },
    Entry { number:   6, international: "Pm",       hall: "P -2y",          schoenflies: "Cs^1",   system: Monoclinic,   centering: P, histogram: [1, 0, 0, 0, 0, 0, 1, 0, 0, 0], symmorphic: true },
    Entry { number:  10, international: "P2/m",     hall: "-P 2y",          schoenflies: "C2h^1",  system: Monoclinic,   centering: P, histogram: [1, 1, 1, 0, 0, 0, 1, 0, 0, 0], symmorphic: true },
    Entry { number:  12, international: "C2/m",     hall: "-C 2y",          schoenflies: "C2h^3",  system: Monoclinic,   centering: C, histogram: [1, 1, 1, 0, 0, 0, 1, 0, 0, 0], symmorphic: true },
    Entry { number:  14, international: "P2_1/c",   hall: "-P 2ybc",        schoenflies: "C2h^5",  system: Monoclinic,   centering: P, histogram: [1, 1, 1, 0, 0, 0, 1, 0, 0, 0], symmorphic: false },
    Entry { number:  16, international: "P222",     hall: "P 2 2",          schoenflies: "D2^1",   system: Orthorhombic, centering: P, histogram: [1, 0, 3, 0, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number:  25, international: "Pmm2",     hall: "P 2 -2",         schoenflies: "C2v^1",  system: Orthorhombic, centering: P, histogram: [1, 0, 1, 0, 0, 0, 2, 0, 0, 0], symmorphic: true },
    Entry { number:  47, international: "Pmmm",     hall: "-P 2 2",         schoenflies: "D2h^1",  system: Orthorhombic, centering: P, histogram: [1, 1, 3, 0, 0, 0, 3, 0, 0, 0], symmorphic: true },
    Entry { number:  65, international: "Cmmm",     hall: "-C 2 2",         schoenflies: "D2h^19", system: Orthorhombic, centering: C, histogram: [1, 1, 3, 0, 0, 0, 3, 0, 0, 0], symmorphic: true },
    Entry { number:  69, international: "Fmmm",     hall: "-F 2 2",         schoenflies: "D2h^23", system: Orthorhombic, centering: F, histogram: [1, 1, 3, 0, 0, 0, 3, 0, 0, 0], symmorphic: true },
    Entry { number:  71, international: "Immm",     hall: "-I 2 2",         schoenflies: "D2h^25", system: Orthorhombic, centering: I, histogram: [1, 1, 3, 0, 0, 0, 3, 0, 0, 0], symmorphic: true },
    Entry { number:  75, international: "P4",       hall: "P 4",            schoenflies: "C4^1",   system: Tetragonal,   centering: P, histogram: [1, 0, 1, 0, 2, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number:  99, international: "P4mm",     hall: "P 4 -2",         schoenflies: "C4v^1",  system: Tetragonal,   centering: P, histogram: [1, 0, 1, 0, 2, 0, 4, 0, 0, 0], symmorphic: true },
    Entry { number: 123, international: "P4/mmm",   hall: "-P 4 2",         schoenflies: "D4h^1",  system: Tetragonal,   centering: P, histogram: [1, 1, 5, 0, 2, 0, 5, 0, 2, 0], symmorphic: true },
    Entry { number: 139, international: "I4/mmm",   hall: "-I 4 2",         schoenflies: "D4h^17", system: Tetragonal,   centering: I, histogram: [1, 1, 5, 0, 2, 0, 5, 0, 2, 0], symmorphic: true },
    Entry { number: 143, international: "P3",       hall: "P 3",            schoenflies: "C3^1",   system: Trigonal,     centering: P, histogram: [1, 0, 0, 2, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number: 164, international: "P-3m1",    hall: "-P 3 2\"",       schoenflies: "D3d^3",  system: Trigonal,     centering: P, histogram: [1, 1, 3, 2, 0, 0, 3, 2, 0, 0], symmorphic: true },
    Entry { number: 166, international: "R-3m",     hall: "-R 3 2\"",       schoenflies: "D3d^5",  system: Trigonal,     centering: R, histogram: [1, 1, 3, 2, 0, 0, 3, 2, 0, 0], symmorphic: true },
    Entry { number: 191, international: "P6/mmm",   hall: "-P 6 2",         schoenflies: "D6h^1",  system: Hexagonal,    centering: P, histogram: [1, 1, 7, 2, 0, 2, 7, 2, 0, 2], symmorphic: true },
    Entry { number: 194, international: "P6_3/mmc", hall: "-P 6c 2c",       schoenflies: "D6h^4",  system: Hexagonal,    centering: P, histogram: [1, 1, 7, 2, 0, 2, 7, 2, 0, 2], symmorphic: false },
    Entry { number: 195, international: "P23",      hall: "P 2 2 3",        schoenflies: "T^1",    system: Cubic,        centering: P, histogram: [1, 0, 3, 8, 0, 0, 0, 0, 0, 0], symmorphic: true },
    Entry { number: 198, international: "P2_13",    hall: "P 2ac 2ab 3",    schoenflies: "T^4",    system: Cubic,        centering: P, histogram: [1, 0, 3, 8, 0, 0, 0, 0, 0, 0], symmorphic: false },
    Entry { number: 200, international: "Pm-3",     hall: "-P 2 2 3",       schoenflies: "Th^1",   system: Cubic,        centering: P, histogram: [1, 1, 3, 8, 0, 0, 3, 8, 0, 0], symmorphic: true },
    Entry { number: 215, international: "P-43m",    hall: "P -4 2 3",       schoenflies: "Td^1",   system: Cubic,        centering: P, histogram: [1, 0, 3, 8, 0, 0, 6, 0, 6, 0], symmorphic: true },
    Entry { number: 221, international: "Pm-3m",    hall: "-P 4 2 3",       schoenflies: "Oh^1",   system: Cubic,        centering: P, histogram: [1, 1, 9, 8, 6, 0, 9, 8, 6, 0], symmorphic: true },
    Entry { number: 225, international: "Fm-3m",    hall: "-F 4 2 3",       schoenflies: "Oh^5",   system: Cubic,        centering: F, histogram: [1, 1, 9, 8, 6, 0, 9, 8, 6, 0], symmorphic: true },
    Entry { number: 227, international: "Fd-3m",    hall: "F 4d 2 3 -1d",   schoenflies: "Oh^7",   system: Cubic,        centering: F, histogram: [1, 1, 9, 8, 6, 0, 9, 8, 6, 0], symmorphic: false },
    Entry { number: 229, international: "Im-3m",    hall: "-I 4 2 3",       schoenflies: "Oh^9",   system: Cubic,        centering: I, histogram: [1, 1, 9, 8, 6, 0, 9, 8, 6, 0], symmorphic: true },
];

/// The built-in reduced reference table.
pub struct ReferenceOracle {
    _private: (),
}

static REFERENCE: ReferenceOracle = ReferenceOracle { _private: () };

/// Shared instance of the built-in table.
pub fn reference() -> &'static ReferenceOracle
{ &REFERENCE }

impl ReferenceOracle {
    fn distinct_rotations(ops: &[SymOp]) -> Vec<M33<i32>> {
        let mut out: Vec<M33<i32>> = vec![];
        for op in ops {
            if !out.contains(op.rotation()) {
                out.push(*op.rotation());
            }
        }
        out
    }

    fn is_symmorphic(candidate: &CandidateOps<'_>) -> bool {
        let tol = candidate.tol.max(1e-8) * 10.0;
        candidate.ops.iter().all(|op| {
            candidate.centering_translations.iter().any(|&c| {
                let d = (*op.translation() - c).map(|x| x - x.round());
                d.0.iter().all(|&x| x.abs() <= tol)
            })
        })
    }
}

impl SpacegroupOracle for ReferenceOracle {
    fn lookup(&self, candidate: &CandidateOps<'_>) -> Option<OracleMatch> {
        let rotations = Self::distinct_rotations(candidate.ops);
        let histogram = RotationHistogram::new(&rotations)?;

        // the system implied by the operators must agree with the system
        // the caller standardized against
        if crystal_system(&histogram) != candidate.system {
            return None;
        }

        let symmorphic = Self::is_symmorphic(candidate);
        ENTRIES.iter()
            .find(|entry| {
                entry.system == candidate.system
                    && entry.centering == candidate.centering
                    && entry.histogram == histogram.0
                    && entry.symmorphic == symmorphic
            })
            .map(|entry| OracleMatch {
                number: entry.number,
                international: entry.international,
                hall: entry.hall,
                schoenflies: entry.schoenflies,
            })
    }

    fn wyckoff_rows(&self, number: i32) -> &[WyckoffRow] {
        // letter 0 is 'a'; rows are ordered as in the reference tables
        match number {
            1 => &[WyckoffRow { letter: 0, multiplicity: 1, site_order: 1 }],
            2 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 2 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 2 },
                WyckoffRow { letter: 2, multiplicity: 1, site_order: 2 },
                WyckoffRow { letter: 3, multiplicity: 1, site_order: 2 },
                WyckoffRow { letter: 8, multiplicity: 2, site_order: 1 },
            ],
            10 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 4 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 4 },
                WyckoffRow { letter: 14, multiplicity: 4, site_order: 1 },
            ],
            47 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 8 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 8 },
                WyckoffRow { letter: 25, multiplicity: 8, site_order: 1 },
            ],
            71 => &[
                WyckoffRow { letter: 0, multiplicity: 2, site_order: 8 },
                WyckoffRow { letter: 1, multiplicity: 2, site_order: 8 },
                WyckoffRow { letter: 14, multiplicity: 16, site_order: 1 },
            ],
            123 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 16 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 16 },
                WyckoffRow { letter: 2, multiplicity: 2, site_order: 8 },
                WyckoffRow { letter: 20, multiplicity: 16, site_order: 1 },
            ],
            139 => &[
                WyckoffRow { letter: 0, multiplicity: 2, site_order: 16 },
                WyckoffRow { letter: 1, multiplicity: 2, site_order: 16 },
                WyckoffRow { letter: 14, multiplicity: 32, site_order: 1 },
            ],
            164 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 12 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 12 },
                WyckoffRow { letter: 2, multiplicity: 2, site_order: 6 },
            ],
            166 => &[
                WyckoffRow { letter: 0, multiplicity: 3, site_order: 12 },
                WyckoffRow { letter: 1, multiplicity: 3, site_order: 12 },
                WyckoffRow { letter: 2, multiplicity: 6, site_order: 6 },
            ],
            191 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 24 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 24 },
                WyckoffRow { letter: 2, multiplicity: 2, site_order: 12 },
            ],
            194 => &[
                WyckoffRow { letter: 0, multiplicity: 2, site_order: 12 },
                WyckoffRow { letter: 1, multiplicity: 2, site_order: 12 },
                WyckoffRow { letter: 2, multiplicity: 2, site_order: 12 },
                WyckoffRow { letter: 3, multiplicity: 2, site_order: 12 },
            ],
            221 => &[
                WyckoffRow { letter: 0, multiplicity: 1, site_order: 48 },
                WyckoffRow { letter: 1, multiplicity: 1, site_order: 48 },
                WyckoffRow { letter: 2, multiplicity: 3, site_order: 16 },
                WyckoffRow { letter: 3, multiplicity: 3, site_order: 16 },
            ],
            225 => &[
                WyckoffRow { letter: 0, multiplicity: 4, site_order: 48 },
                WyckoffRow { letter: 1, multiplicity: 4, site_order: 48 },
                WyckoffRow { letter: 2, multiplicity: 8, site_order: 24 },
            ],
            227 => &[
                WyckoffRow { letter: 0, multiplicity: 8, site_order: 24 },
                WyckoffRow { letter: 1, multiplicity: 8, site_order: 24 },
                WyckoffRow { letter: 2, multiplicity: 16, site_order: 12 },
            ],
            229 => &[
                WyckoffRow { letter: 0, multiplicity: 2, site_order: 48 },
                WyckoffRow { letter: 1, multiplicity: 6, site_order: 16 },
                WyckoffRow { letter: 2, multiplicity: 8, site_order: 12 },
            ],
            _ => &[],
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent() {
        for entry in ENTRIES {
            // histogram totals are valid point group orders
            let order: usize = entry.histogram.iter().sum();
            assert!([1, 2, 3, 4, 6, 8, 12, 16, 24, 48].contains(&order),
                "space group {} has a bad histogram", entry.number);
            // each histogram implies the system it is filed under
            let hist = RotationHistogram(entry.histogram);
            assert_eq!(crystal_system(&hist), entry.system,
                "space group {} is filed under the wrong system", entry.number);
        }

        // numbers are strictly increasing (first-match is by number)
        for pair in ENTRIES.windows(2) {
            assert!(pair[0].number < pair[1].number);
        }
    }

    #[test]
    fn wyckoff_rows_exist_for_table_members() {
        let oracle = reference();
        for &number in &[1, 2, 221, 225, 227, 229, 194] {
            assert!(!oracle.wyckoff_rows(number).is_empty());
        }
        assert!(oracle.wyckoff_rows(999).is_empty());
    }
}
