//! Classification of rotation parts and point groups.

use spgr_array_types::M33;

/// The crystallographic type of a single rotation, read off from its
/// determinant and trace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RotationKind {
    Identity,
    Inversion,
    /// Proper rotation by 180 degrees.
    TwoFold,
    ThreeFold,
    FourFold,
    SixFold,
    Mirror,
    /// Rotoinversion -3.
    RotoInv3,
    /// Rotoinversion -4.
    RotoInv4,
    /// Rotoinversion -6.
    RotoInv6,
}

pub(crate) const NUM_KINDS: usize = 10;

impl RotationKind {
    pub(crate) fn index(&self) -> usize {
        use self::RotationKind::*;
        match *self {
            Identity => 0, Inversion => 1,
            TwoFold => 2, ThreeFold => 3, FourFold => 4, SixFold => 5,
            Mirror => 6, RotoInv3 => 7, RotoInv4 => 8, RotoInv6 => 9,
        }
    }
}

/// Identify a rotation from (det, trace).  `None` for matrices that are not
/// crystallographic rotations (which cannot occur for operators that truly
/// preserve some lattice metric).
pub fn rotation_kind(rot: &M33<i32>) -> Option<RotationKind> {
    let trace = rot[0][0] + rot[1][1] + rot[2][2];
    use self::RotationKind::*;
    match (rot.det(), trace) {
        (1, 3) => Some(Identity),
        (1, 2) => Some(SixFold),
        (1, 1) => Some(FourFold),
        (1, 0) => Some(ThreeFold),
        (1, -1) => Some(TwoFold),
        (-1, -3) => Some(Inversion),
        (-1, -2) => Some(RotoInv6),
        (-1, -1) => Some(RotoInv4),
        (-1, 0) => Some(RotoInv3),
        (-1, 1) => Some(Mirror),
        _ => None,
    }
}

/// How many rotations of each kind a point group contains.
///
/// This is the fingerprint used to match candidate operation sets against
/// the reference settings: the 32 crystallographic point groups all have
/// distinct histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotationHistogram(pub [usize; NUM_KINDS]);

impl RotationHistogram {
    /// `None` when some matrix is not a crystallographic rotation.
    pub fn new(rotations: &[M33<i32>]) -> Option<RotationHistogram> {
        let mut counts = [0; NUM_KINDS];
        for rot in rotations {
            counts[rotation_kind(rot)?.index()] += 1;
        }
        Some(RotationHistogram(counts))
    }

    pub fn count(&self, kind: RotationKind) -> usize
    { self.0[kind.index()] }

    pub fn order(&self) -> usize
    { self.0.iter().sum() }
}

/// The seven crystal systems.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Cubic,
}

/// Determine the crystal system from the point group.
///
/// Improper operations are folded onto proper ones through the inversion
/// (`R -> -R` for `det == -1`), after which the familiar axis counting
/// applies.
pub fn crystal_system(histogram: &RotationHistogram) -> CrystalSystem {
    use self::RotationKind::*;
    let proper = |a: RotationKind, b: RotationKind| {
        histogram.count(a) + histogram.count(b)
    };
    let n2 = proper(TwoFold, Mirror);
    let n3 = proper(ThreeFold, RotoInv3);
    let n4 = proper(FourFold, RotoInv4);
    let n6 = proper(SixFold, RotoInv6);

    match () {
        _ if n3 >= 8 => CrystalSystem::Cubic,
        _ if n6 >= 2 => CrystalSystem::Hexagonal,
        _ if n3 >= 2 => CrystalSystem::Trigonal,
        _ if n4 >= 2 => CrystalSystem::Tetragonal,
        _ if n2 >= 3 => CrystalSystem::Orthorhombic,
        _ if n2 >= 1 => CrystalSystem::Monoclinic,
        _ => CrystalSystem::Triclinic,
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::Lattice;
    use crate::algo::{reduction, rotations};
    use super::*;
    use spgr_array_types::mat;

    fn histogram_of(lattice: &Lattice) -> RotationHistogram {
        let ops = rotations::lattice_point_group(&reduction::reduce(lattice), 1e-5);
        RotationHistogram::new(&ops).unwrap()
    }

    #[test]
    fn kinds_from_det_and_trace() {
        assert_eq!(rotation_kind(&mat::eye_i()), Some(RotationKind::Identity));
        assert_eq!(rotation_kind(&(-mat::eye_i())), Some(RotationKind::Inversion));
        let rot4z = mat::from_array([[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        assert_eq!(rotation_kind(&rot4z), Some(RotationKind::FourFold));
        let mirror_z = mat::from_array([[1, 0, 0], [0, 1, 0], [0, 0, -1]]);
        assert_eq!(rotation_kind(&mirror_z), Some(RotationKind::Mirror));
    }

    #[test]
    fn cubic_histogram() {
        use self::RotationKind::*;
        let hist = histogram_of(&Lattice::cubic(2.0));
        assert_eq!(hist.order(), 48);
        assert_eq!(hist.count(Identity), 1);
        assert_eq!(hist.count(Inversion), 1);
        assert_eq!(hist.count(ThreeFold), 8);
        assert_eq!(hist.count(FourFold), 6);
        assert_eq!(hist.count(TwoFold), 9);
        assert_eq!(hist.count(Mirror), 9);
        assert_eq!(crystal_system(&hist), CrystalSystem::Cubic);
    }

    #[test]
    fn lattice_systems() {
        assert_eq!(
            crystal_system(&histogram_of(&Lattice::orthorhombic(3., 4., 5.))),
            CrystalSystem::Orthorhombic,
        );
        assert_eq!(
            crystal_system(&histogram_of(&Lattice::hexagonal(3., 5.))),
            CrystalSystem::Hexagonal,
        );
        assert_eq!(
            crystal_system(&histogram_of(&Lattice::orthorhombic(3., 3., 5.))),
            CrystalSystem::Tetragonal,
        );
    }
}
