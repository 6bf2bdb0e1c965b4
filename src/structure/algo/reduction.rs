//! Lattice basis reduction.
//!
//! Citations:
//!
//! * B. Gruber, "The Relationship between Reduced Cells
//!   in a General Bravais lattice." Acta Crystallographica
//!   Section A 29 (1973): 433-440.
//!
//! * Grosse-Kunstleve, Ralf W., Nicholas K. Sauter,
//!   and Paul D. Adams. "Numerically stable algorithms
//!   for the computation of reduced unit cells."
//!   Acta Crystallographica Section A: Foundations of
//!   Crystallography 60.1 (2004): 1-6.

use crate::Lattice;
use crate::util;

use spgr_array_types::{dot, mat, M33, V3};

use std::cmp::Ordering;

#[derive(Debug, Copy, Clone)]
struct Fuzz {
    tol: f64,
}

impl Fuzz {
    pub fn from_volume(vol: f64) -> Fuzz
    { Fuzz { tol: 1e-5 * vol.abs().cbrt() } }

    pub fn lt(&self, x: f64, y: f64) -> bool
    { x < y - self.tol }
    pub fn gt(&self, x: f64, y: f64) -> bool
    { self.lt(y, x) }

    pub fn eq(&self, x: f64, y: f64) -> bool
    { !self.lt(x, y) && !self.gt(x, y) }

    pub fn cmp(&self, x: f64, y: f64) -> Ordering
    {
        if self.lt(x, y) { Ordering::Less }
        else if self.gt(x, y) { Ordering::Greater }
        else { Ordering::Equal }
    }
}

/// A pairing of a lattice with its reduced form, along with the integer
/// coefficient matrices that convert between the two.
///
/// Invariant: `reduced = transform * original` (as row-based matrices),
/// with `transform` unimodular.
#[derive(Debug, Clone)]
pub struct LatticeReduction {
    original: Lattice,
    transform: M33<i32>,
    inverse: M33<i32>,
    reduced: Lattice,
}

impl LatticeReduction {
    #[inline] pub fn original(&self) -> &Lattice { &self.original }
    #[inline] pub fn reduced(&self) -> &Lattice { &self.reduced }
    #[inline] pub fn transform(&self) -> &M33<i32> { &self.transform }
    #[inline] pub fn inverse_transform(&self) -> &M33<i32> { &self.inverse }
}

// Mutable search state.  `lattice`, `abc` (squared lengths) and `xyz`
// (doubled off-diagonal metric entries, Gruber's ξ η ζ) are recomputed
// whenever the unimodular matrix changes.
#[derive(Debug, Clone)]
struct State {
    original: Lattice,
    fuzz: Fuzz,
    unimodular: M33<i32>,
    lattice: M33,
    abc: [f64; 3],
    xyz: [f64; 3],
}

impl State {
    fn new(lattice: &Lattice) -> Self {
        let mut state = State {
            original: lattice.clone(),
            fuzz: Fuzz::from_volume(lattice.volume()),
            unimodular: mat::eye_i(),
            lattice: *lattice.matrix(),
            abc: [0.0; 3],
            xyz: [0.0; 3],
        };
        state.update();
        state
    }

    fn update(&mut self) {
        self.lattice = &self.unimodular.map(|x| x as f64) * self.original.matrix();
        let m = &self.lattice;
        for k in 0..3 {
            self.abc[k] = dot(&m[k], &m[k]);
            self.xyz[k] = 2.0 * dot(&m[(k + 1) % 3], &m[(k + 2) % 3]);
        }
    }

    fn change_basis(&mut self, f: impl FnOnce(&mut M33<i32>)) {
        f(&mut self.unimodular);
        self.update();
    }

    // steps N1, N2
    fn row_swap(&mut self, j: usize, k: usize) {
        self.change_basis(|u| {
            let ghost = *u;
            u[j] = ghost[k];
            u[k] = ghost[j];
        });
    }

    // steps B2-B5
    fn row_axpy(&mut self, to: usize, mul: i32, from: usize) {
        assert_ne!(from, to, "adding a row to itself is not a unimodular operation");
        self.change_basis(|u| u[to] = u[to] + u[from] * mul);
    }

    fn finish(self) -> LatticeReduction {
        let inverse = util::unimodular_inverse(&self.unimodular);
        LatticeReduction {
            reduced: Lattice::new(&self.lattice),
            original: self.original,
            transform: self.unimodular,
            inverse,
        }
    }
}

// Algorithm N of B. Gruber (1973),
// with interpretations from R. W. Grosse-Kunstleve (2004)
fn normalize_characteristic(state: &mut State) {
    let fuzz = state.fuzz;

    // Steps N1-N2: sort rows, shortest first.
    loop {
        let mut maybe_swap = |state: &mut State, j: usize, k: usize| {
            let abc = state.abc;
            let xyz = state.xyz;

            // (higher precedence on the AND, as in the Algol 60 footnote
            //  on page 433)
            let do_it = false
                || fuzz.gt(abc[j], abc[k])
                || fuzz.eq(abc[j], abc[k]) && fuzz.gt(xyz[j].abs(), xyz[k].abs());

            if do_it {
                state.row_swap(j, k);
            }
            do_it
        };

        // Step N1
        maybe_swap(state, 0, 1);

        // Step N2
        if maybe_swap(state, 1, 2) { continue; }
        else { break; }
    }

    // Step N3: make the offdiagonals share a sign.
    // This follows the 'cctbx/uctbx' rendition associated
    // with Grosse-Kunstleve (2004).
    let xyz = state.xyz;
    match fuzz.cmp(xyz[0] * xyz[1] * xyz[2], 0.0) {
        Ordering::Equal => {},

        Ordering::Less => {
            state.change_basis(|u| {
                for k in 0..3 {
                    if fuzz.lt(xyz[k], 0.0) {
                        u[k] = u[k] * -1;
                    }
                }
            });
        },

        Ordering::Greater => {
            state.change_basis(|u| {
                let mut flips = 0;
                let mut flip_me = None;
                for k in 0..3 {
                    match fuzz.cmp(xyz[k], 0.0) {
                        Ordering::Greater => {
                            u[k] = u[k] * -1;
                            flips += 1;
                        },
                        Ordering::Equal => {
                            flip_me = Some(k);
                        },
                        Ordering::Less => {},
                    }
                }

                if flips % 2 == 0 {
                    let flip_me = flip_me.expect("bug! (flip_me without zeros?)");
                    u[flip_me] = u[flip_me] * -1;
                }
            });
        },
    }
}

/// Reduce a lattice basis with Algorithm B of B. Gruber (1973).
///
/// The output basis generates the same lattice and is "Buerger-reduced":
/// no basis vector can be shortened by adding an integer multiple of
/// another.  The reduction also records the unimodular transform and its
/// exact integer inverse.
pub fn reduce(lattice: &Lattice) -> LatticeReduction {
    let mut state = State::new(lattice);
    let fuzz = state.fuzz;

    'restart:
    loop {
        // B1
        normalize_characteristic(&mut state);

        let [a, b, _c] = state.abc;
        let [x, y, z] = state.xyz;

        // B2
        let do_it = fuzz.gt(x.abs(), b)
            || fuzz.eq(x,  b) && fuzz.gt(z, 2.0 * y)
            || fuzz.eq(x, -b) && fuzz.lt(z, 0.0);

        if do_it {
            let mul = -((x + b) / (2.0 * b)).floor();
            assert_ne!(mul, 0.0);
            state.row_axpy(2, mul as i32, 1);
            continue 'restart;
        }

        // B3
        let do_it = fuzz.gt(y.abs(), a)
            || fuzz.eq(y,  a) && fuzz.gt(z, 2.0 * x)
            || fuzz.eq(y, -a) && fuzz.lt(z, 0.0);

        if do_it {
            let mul = -((y + a) / (2.0 * a)).floor();
            assert_ne!(mul, 0.0);
            state.row_axpy(2, mul as i32, 0);
            continue 'restart;
        }

        // B4
        let do_it = fuzz.gt(z.abs(), a)
            || fuzz.eq(z,  a) && fuzz.gt(y, 2.0 * x)
            || fuzz.eq(z, -a) && fuzz.lt(y, 0.0);

        if do_it {
            let mul = -((z + a) / (2.0 * a)).floor();
            assert_ne!(mul, 0.0);
            state.row_axpy(1, mul as i32, 0);
            continue 'restart;
        }

        // B5
        let xyzab = x + y + z + a + b;
        let aayyz = 2.0 * (a + y) + z;
        let do_it = fuzz.lt(xyzab, 0.0)
            || fuzz.eq(xyzab, 0.0) && fuzz.gt(aayyz, 0.0);

        if do_it {
            let mul = -(xyzab / (aayyz + z)).floor();
            assert_ne!(mul, 0.0);
            state.row_axpy(1, mul as i32, 0);
            continue 'restart;
        }

        break;
    }

    // Keep the determinant positive; the dimension is odd, so negating
    // the whole matrix works.
    match state.unimodular.det() {
        1 => {},
        -1 => {
            state.change_basis(|u| {
                for k in 0..3 {
                    u[k] = u[k] * -1;
                }
            });
        },
        d => panic!("bad unimodular determinant: {}", d),
    }

    state.finish()
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use spgr_array_types::Unvee;

    fn check_invariants(reduction: &LatticeReduction) {
        // transform really is unimodular, and really relates the two bases
        assert_eq!(reduction.transform().det(), 1);
        let recomputed = reduction.original().linear_combination(reduction.transform());
        assert_close!(
            abs=1e-9,
            recomputed.matrix().unvee(),
            reduction.reduced().matrix().unvee(),
        );

        // no vector can be shortened by adding a multiple of another
        // (up to the reduction's own fuzz, which works on squared lengths)
        let slack = 1e-3 * reduction.reduced().volume().cbrt().max(1.0);
        let vectors = reduction.reduced().vectors();
        for j in 0..3 {
            for k in 0..3 {
                if j == k { continue; }
                for mul in &[-2.0, -1.0, 1.0, 2.0] {
                    let shortened = vectors[j] + vectors[k] * *mul;
                    assert!(shortened.sqnorm() + slack >= vectors[j].sqnorm());
                }
            }
        }
    }

    #[test]
    fn already_reduced() {
        let reduction = reduce(&Lattice::cubic(2.0));
        check_invariants(&reduction);
        assert_eq!(reduction.reduced().volume(), 8.0);
    }

    #[test]
    fn skewed_cell() {
        let lattice = Lattice::new(&mat::from_array([
            [1.0, 0.0, 0.0],
            [4.0, 1.0, 0.0],
            [-3.0, 2.0, 1.0],
        ]));
        let reduction = reduce(&lattice);
        check_invariants(&reduction);
        // volume is preserved
        assert!((reduction.reduced().volume() - 1.0).abs() < 1e-9);
        // the reduced cell is far less elongated
        assert!(reduction.reduced().norms().iter().all(|&x| x < 2.0));
    }

    #[test]
    fn random_cells() {
        for _ in 0..40 {
            let lattice = Lattice::random_uniform(5.0);
            check_invariants(&reduce(&lattice));
        }
    }
}
