//! Search for a conventional (standard) setting of a primitive lattice.
//!
//! Rather than carrying per-system transformation tables, the conventional
//! basis is recovered the same way the rotation search works: by scanning
//! small integer combinations of the primitive vectors for a triple that
//! satisfies the metric constraints of the crystal system.  The volume
//! ratio of the winning triple is the centering multiplicity.

use crate::{Lattice, SymOp};
use crate::spacegroup::pointgroup::CrystalSystem;
use crate::util;
use crate::IntPrecisionError;

use spgr_array_types::{dot, M3, M33, V3};

/// Lattice centering of a conventional setting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Centering {
    P,
    /// One centered face (conventionally C).
    C,
    /// Body centered.
    I,
    /// All faces centered.
    F,
    /// Rhombohedral, in the hexagonal setting.
    R,
}

impl Centering {
    pub fn multiplicity(&self) -> usize {
        match *self {
            Centering::P => 1,
            Centering::C | Centering::I => 2,
            Centering::R => 3,
            Centering::F => 4,
        }
    }
}

/// A conventional cell for a primitive lattice, before idealization.
#[derive(Debug, Clone)]
pub(crate) struct ConventionalSetting {
    /// Conventional lattice, as exact integer combinations of the
    /// primitive vectors.
    pub lattice: Lattice,
    /// Rows are the conventional vectors in primitive fractional
    /// coordinates; `det == multiplicity`.
    pub transform: M33<i32>,
    pub centering: Centering,
    /// Centering translations in conventional fractional coordinates,
    /// zero included.
    pub centering_translations: Vec<V3>,
    pub system: CrystalSystem,
}

struct Constraint {
    fuzz: f64,
}

impl Constraint {
    fn eq(&self, a: f64, b: f64) -> bool { (a - b).abs() <= self.fuzz * a.abs().max(b.abs()).max(1e-300) }
    fn zero(&self, x: f64, scale: f64) -> bool { x.abs() <= self.fuzz * scale }
}

/// Find a conventional basis among small integer combinations of the
/// primitive vectors.  `None` when no combination satisfies the system's
/// metric constraints, which marks the structure unclassifiable.
pub(crate) fn conventional_setting(
    prim: &Lattice,
    system: CrystalSystem,
    tol: f64,
) -> Option<ConventionalSetting>
{
    // triclinic places no constraints at all; the reduced basis is as
    // standard as it gets
    if system == CrystalSystem::Triclinic {
        let reduction = crate::algo::reduction::reduce(prim);
        return Some(ConventionalSetting {
            lattice: reduction.reduced().clone(),
            transform: *reduction.transform(),
            centering: Centering::P,
            centering_translations: vec![V3([0.0; 3])],
            system,
        });
    }

    let con = Constraint { fuzz: tol.max(1e-10) * 10.0 };

    // candidate conventional vectors: integer combinations with small
    // coefficients (|c| <= 2 is enough to undo any crystallographic
    // centering of a reduced basis)
    let mut candidates: Vec<(V3<i32>, V3)> = vec![];
    for i in -2..=2i32 {
        for j in -2..=2i32 {
            for k in -2..=2i32 {
                if (i, j, k) == (0, 0, 0) { continue; }
                let coeffs = V3([i, j, k]);
                let cart = coeffs.map(f64::from) * prim;
                candidates.push((coeffs, cart));
            }
        }
    }

    let allowed_multiplicity: &[i32] = match system {
        CrystalSystem::Triclinic => &[1],
        CrystalSystem::Monoclinic => &[1, 2],
        CrystalSystem::Orthorhombic => &[1, 2, 4],
        CrystalSystem::Tetragonal => &[1, 2],
        CrystalSystem::Trigonal => &[1, 3],
        CrystalSystem::Hexagonal => &[1],
        CrystalSystem::Cubic => &[1, 2, 4],
    };

    let satisfies = |a: &V3, b: &V3, c: &V3| -> bool {
        let (la, lb, lc) = (a.norm(), b.norm(), c.norm());
        let scale = la * lb;
        let ab = dot(a, b);
        let bc = dot(b, c);
        let ca = dot(c, a);
        match system {
            CrystalSystem::Cubic => {
                con.eq(la, lb) && con.eq(lb, lc)
                    && con.zero(ab, la * lb) && con.zero(bc, lb * lc) && con.zero(ca, lc * la)
            }
            CrystalSystem::Tetragonal => {
                con.eq(la, lb)
                    && con.zero(ab, la * lb) && con.zero(bc, lb * lc) && con.zero(ca, lc * la)
            }
            CrystalSystem::Orthorhombic => {
                con.zero(ab, la * lb) && con.zero(bc, lb * lc) && con.zero(ca, lc * la)
            }
            CrystalSystem::Hexagonal | CrystalSystem::Trigonal => {
                con.eq(la, lb)
                    && con.eq(ab, -0.5 * la * lb)
                    && con.zero(bc, lb * lc) && con.zero(ca, lc * la)
            }
            CrystalSystem::Monoclinic => {
                // unique axis b; beta is free
                con.zero(ab, scale) && con.zero(bc, lb * lc)
            }
            CrystalSystem::Triclinic => true,
        }
    };

    // constraints that involve only the first two vectors, for pruning
    // before the innermost loop
    let pair_ok = |a: &V3, b: &V3| -> bool {
        let (la, lb) = (a.norm(), b.norm());
        let ab = dot(a, b);
        match system {
            CrystalSystem::Cubic | CrystalSystem::Tetragonal =>
                con.eq(la, lb) && con.zero(ab, la * lb),
            CrystalSystem::Orthorhombic | CrystalSystem::Monoclinic =>
                con.zero(ab, la * lb),
            CrystalSystem::Hexagonal | CrystalSystem::Trigonal =>
                con.eq(la, lb) && con.eq(ab, -0.5 * la * lb),
            CrystalSystem::Triclinic => true,
        }
    };

    let prim_volume = prim.volume();
    let mut best: Option<(i32, f64, M33<i32>)> = None;
    for (ca, va) in &candidates {
        for (cb, vb) in &candidates {
            if !pair_ok(va, vb) {
                continue;
            }
            for (cc, vc) in &candidates {
                let transform = M3([*ca, *cb, *cc]);
                let det = transform.det();
                if det <= 0 || !allowed_multiplicity.contains(&det) {
                    continue;
                }
                if !satisfies(va, vb, vc) {
                    continue;
                }
                let sqsum = va.sqnorm() + vb.sqnorm() + vc.sqnorm();
                let better = match best {
                    None => true,
                    Some((best_det, best_sqsum, _)) => {
                        det < best_det
                            || (det == best_det && sqsum < best_sqsum - 1e-9 * prim_volume.cbrt().powi(2))
                    }
                };
                if better {
                    best = Some((det, sqsum, transform));
                }
            }
        }
    }

    let (det, _, transform) = best?;
    let lattice = prim.linear_combination(&transform);
    let (centering, centering_translations) = detect_centering(&transform, det, system)?;
    Some(ConventionalSetting {
        lattice,
        transform,
        centering,
        centering_translations,
        system,
    })
}

// The positions of the primitive lattice points inside the conventional
// cell decide the centering type.
fn detect_centering(
    transform: &M33<i32>,
    det: i32,
    system: CrystalSystem,
) -> Option<(Centering, Vec<V3>)>
{
    let mut translations = vec![V3([0.0; 3])];
    if det == 1 {
        return Some((Centering::P, translations));
    }

    // primitive vectors in conventional fractional coordinates
    let inverse = spgr_array_types::inv(&transform.map(|x| x as f64));
    let mut interior: Vec<V3> = vec![];
    for i in 0..=2 {
        for j in 0..=2 {
            for k in 0..=2 {
                let point = V3([i as f64, j as f64, k as f64]) * &inverse;
                let wrapped = util::wrap01_v3(point.map(|x| (x * 12.0).round() / 12.0));
                if wrapped != V3([0.0; 3]) && !interior.contains(&wrapped) {
                    interior.push(wrapped);
                }
            }
        }
    }
    interior.sort_by(|a, b| a.partial_cmp(b).expect("NaN in centering translation"));
    interior.truncate(det as usize - 1);

    let centering = match (det, interior.len()) {
        (2, 1) => {
            let v = interior[0];
            let halves = v.0.iter().filter(|&&x| (x - 0.5).abs() < 1e-6).count();
            let zeros = v.0.iter().filter(|&&x| x.abs() < 1e-6).count();
            match (halves, zeros) {
                (3, 0) => Centering::I,
                (2, 1) => Centering::C,
                _ => return None,
            }
        }
        (3, 2) => match system {
            CrystalSystem::Trigonal => Centering::R,
            _ => return None,
        },
        (4, 3) => {
            // all three interior points must be face centers
            let face_like = interior.iter().all(|v| {
                v.0.iter().all(|&x| x.abs() < 1e-6 || (x - 0.5).abs() < 1e-6)
            });
            match face_like {
                true => Centering::F,
                false => return None,
            }
        }
        _ => return None,
    };
    translations.extend(interior);
    Some((centering, translations))
}

/// Re-express operators in a different basis of the same structure.
///
/// Rotations must stay integral in the target basis; if one does not, the
/// bases are not related by a symmetry-preserving transform and the whole
/// conversion fails.
pub(crate) fn ops_in_basis(
    ops: &[SymOp],
    from: &Lattice,
    to: &Lattice,
    snap: f64,
) -> Result<Vec<SymOp>, IntPrecisionError>
{Ok({
    // rows fractional in `from` convert to `to` through P
    let p = from.matrix() * to.inverse_matrix();
    let p_inv = to.matrix() * from.inverse_matrix();

    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        let s_from = op.float_rot_t();
        let s_to = &(&p_inv * &s_from) * &p;
        let rot_t = util::Tol(snap).unfloat_m33(&s_to)?;
        let trans = *op.translation() * &p;
        out.push(SymOp::new(&rot_t.t(), &trans));
    }
    out
})}

/// Expand an operator list by a set of pure translations.
pub(crate) fn expand_by_translations(ops: &[SymOp], translations: &[V3]) -> Vec<SymOp> {
    let mut out = vec![];
    for op in ops {
        for &t in translations {
            let candidate = SymOp::new(op.rotation(), &(*op.translation() + t));
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Find the origin shift that makes as many operators as possible
/// symmorphic (translation equal to a centering translation).
///
/// The shift is searched on the twelfths grid, which contains every
/// special-position origin of the 230 reference settings.
pub(crate) fn origin_shift(ops: &[SymOp], centering_translations: &[V3], tol: f64) -> V3 {
    let mut best = (0, V3([0.0; 3]));
    for i in 0..12 {
        for j in 0..12 {
            for k in 0..12 {
                let shift = V3([i as f64, j as f64, k as f64]) / 12.0;
                let score = ops.iter()
                    .filter(|op| {
                        let t = shifted_translation(op, &shift);
                        centering_translations.iter().any(|&c| {
                            let d = (t - c).map(|x| x - x.round());
                            d.0.iter().all(|&x| x.abs() <= tol.max(1e-8) * 10.0)
                        })
                    })
                    .count();
                if score > best.0 {
                    best = (score, shift);
                }
            }
        }
    }
    best.1
}

pub(crate) fn shifted_translation(op: &SymOp, shift: &V3) -> V3 {
    let s = op.float_rot_t();
    util::wrap01_v3(*op.translation() + *shift * &s - *shift)
}

/// Apply an origin shift to a whole operator list.
pub(crate) fn shift_ops(ops: &[SymOp], shift: &V3) -> Vec<SymOp> {
    ops.iter()
        .map(|op| SymOp::new(op.rotation(), &shifted_translation(op, shift)))
        .collect()
}

/// Build the idealized ("Bravais") lattice for a conventional setting:
/// exact angles, averaged lengths, standard orientation.
pub(crate) fn idealize(setting: &ConventionalSetting) -> Lattice {
    let [a, b, c] = setting.lattice.norms();
    match setting.system {
        CrystalSystem::Cubic => Lattice::cubic((a + b + c) / 3.0),
        CrystalSystem::Tetragonal => {
            let ab = (a + b) / 2.0;
            Lattice::orthorhombic(ab, ab, c)
        }
        CrystalSystem::Orthorhombic => Lattice::orthorhombic(a, b, c),
        CrystalSystem::Hexagonal | CrystalSystem::Trigonal =>
            Lattice::hexagonal((a + b) / 2.0, c),
        CrystalSystem::Monoclinic => {
            let vecs = setting.lattice.vectors();
            let cos_beta = dot(&vecs[2], &vecs[0]) / (c * a);
            let sin_beta = (1.0 - cos_beta * cos_beta).sqrt();
            Lattice::new(&M3([
                V3([a, 0.0, 0.0]),
                V3([0.0, b, 0.0]),
                V3([c * cos_beta, 0.0, c * sin_beta]),
            ]))
        }
        CrystalSystem::Triclinic => {
            // nothing to idealize; keep the cell, rotated to a lower
            // triangular ("standard orientation") form is not worth the
            // trouble for a cell with no constraints
            setting.lattice.clone()
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::algo::reduction;
    use super::*;
    use spgr_array_types::mat;

    #[test]
    fn cubic_primitive_is_p() {
        let setting = conventional_setting(
            &Lattice::cubic(4.0), CrystalSystem::Cubic, 1e-5,
        ).unwrap();
        assert_eq!(setting.centering, Centering::P);
        assert_eq!(setting.transform.det(), 1);
        assert!((setting.lattice.volume() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn bcc_primitive_is_i() {
        // a (reduced) primitive basis of the body-centered cubic lattice
        let prim = reduction::reduce(&Lattice::new(&mat::from_array([
            [2.0, 2.0, 2.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 4.0],
        ]))).reduced().clone();

        let setting = conventional_setting(&prim, CrystalSystem::Cubic, 1e-5).unwrap();
        assert_eq!(setting.centering, Centering::I);
        assert_eq!(setting.centering.multiplicity(), 2);
        assert!((setting.lattice.volume() - 64.0).abs() < 1e-9);
        assert_eq!(setting.centering_translations.len(), 2);
        assert_eq!(setting.centering_translations[1], V3([0.5, 0.5, 0.5]));
    }

    #[test]
    fn fcc_primitive_is_f() {
        let prim = reduction::reduce(&Lattice::new(&mat::from_array([
            [0.0, 2.0, 2.0],
            [2.0, 0.0, 2.0],
            [2.0, 2.0, 0.0],
        ]))).reduced().clone();

        let setting = conventional_setting(&prim, CrystalSystem::Cubic, 1e-5).unwrap();
        assert_eq!(setting.centering, Centering::F);
        assert!((setting.lattice.volume() - 64.0).abs() < 1e-9);
        assert_eq!(setting.centering_translations.len(), 4);
    }

    #[test]
    fn origin_shift_recovers_displaced_origin() {
        // inversion about x = 1/4 instead of the origin
        let op = SymOp::new(
            &(-mat::eye_i()),
            &V3([0.5, 0.0, 0.0]),
        );
        let shift = origin_shift(
            &[SymOp::eye(), op.clone()],
            &[V3([0.0; 3])],
            1e-5,
        );
        let t = shifted_translation(&op, &shift);
        assert!(t.0.iter().all(|&x| x.abs() < 1e-9 || (x - 1.0).abs() < 1e-9));
    }
}
