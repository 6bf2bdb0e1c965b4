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

//! Small fixed-size linear algebra for lattice math.
//!
//! The design is deliberately row-centric: a `V3` is a row vector, a `M33`
//! is a matrix whose rows you index first, and coordinate data is transformed
//! by right-multiplication (`v * &m`).

mod types;
mod ops;
mod conv;

pub use crate::types::{V3, M3, M33};
pub use crate::conv::{Envee, EnveeRef, Unvee};

pub use crate::ops::{dot, det, inv};

/// Free-function constructors for matrices.
pub mod mat {
    use crate::types::{V3, M3, M33};

    #[inline]
    pub fn from_array<X: Copy>(arr: [[X; 3]; 3]) -> M33<X>
    { M3([V3(arr[0]), V3(arr[1]), V3(arr[2])]) }

    /// The 3x3 identity over `f64`.
    #[inline]
    pub fn eye() -> M33
    { from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]) }

    /// The 3x3 identity over `i32`.
    #[inline]
    pub fn eye_i() -> M33<i32>
    { from_array([[1, 0, 0], [0, 1, 0], [0, 0, 1]]) }
}
