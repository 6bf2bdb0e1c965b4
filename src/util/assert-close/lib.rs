/* ************************************************************************ **
** This file is part of spgr, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of spgr is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

#[macro_use]
extern crate failure;

/// Relative tolerance used when none is given.
pub const DEFAULT_REL_TOL: f64 = 1e-9;

#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Tolerances
    { Tolerances { abs: 0.0, rel: DEFAULT_REL_TOL } }
}

#[derive(Debug, Fail)]
#[fail(display = "values differ at {}: {} vs {}", path, left, right)]
pub struct CheckCloseError {
    pub path: String,
    pub left: f64,
    pub right: f64,
}

/// Elementwise approximate comparison.
pub trait CheckClose {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>;
}

#[doc(hidden)]
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(abs >= 0.0);
    assert!(rel >= 0.0);
    // infinities of equal sign compare equal; NaN fails every branch
    if a == b { return true; }
    if a.is_infinite() || b.is_infinite() { return false; }
    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

impl CheckClose for f64 {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError {
                path: "value".into(),
                left: *self,
                right: *other,
            }),
        }
    }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        assert_eq!(self.len(), other.len(), "length mismatch in close comparison");
        for (i, (a, b)) in self.iter().zip(other).enumerate() {
            a.check_close(b, tol).map_err(|e| CheckCloseError {
                path: format!("[{}]{}", i, e.path),
                ..e
            })?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose> CheckClose for [T; 3] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

#[macro_export]
macro_rules! assert_close {
    (abs=$abs:expr, rel=$rel:expr, $a:expr, $b:expr $(,)*) => {
        $crate::_assert_close_impl(&$a, &$b, $crate::Tolerances { abs: $abs, rel: $rel })
    };
    (abs=$abs:expr, $a:expr, $b:expr $(,)*) => {
        $crate::_assert_close_impl(&$a, &$b, $crate::Tolerances { abs: $abs, rel: 0.0 })
    };
    (rel=$rel:expr, $a:expr, $b:expr $(,)*) => {
        $crate::_assert_close_impl(&$a, &$b, $crate::Tolerances { abs: 0.0, rel: $rel })
    };
    ($a:expr, $b:expr $(,)*) => {
        $crate::_assert_close_impl(&$a, &$b, $crate::Tolerances::default())
    };
}

#[doc(hidden)]
pub fn _assert_close_impl<T: CheckClose + std::fmt::Debug + ?Sized>(a: &T, b: &T, tol: Tolerances) {
    if let Err(e) = a.check_close(b, tol) {
        panic!(
            "assert_close failed (abs={}, rel={})\n left: {:?}\nright: {:?}\n{}",
            tol.abs, tol.rel, a, b, e,
        );
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    #[test]
    fn close_scalars() {
        assert_close!(1.0, 1.0 + 1e-12);
        assert_close!(abs=1e-3, 0.0, 1e-4);
    }

    #[test]
    #[should_panic]
    fn distant_scalars() {
        assert_close!(1.0, 1.1);
    }

    #[test]
    fn slices() {
        assert_close!(abs=1e-9, vec![1.0, 2.0], vec![1.0, 2.0 + 1e-12]);
    }
}
